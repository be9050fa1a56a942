//! In-Memory Config Repository
//!
//! Implements ConfigRepository over a replaceable in-process list.
//! Useful for embedding applications that load configs from elsewhere,
//! and for tests.

use crate::domain::entities::BackendConfig;
use crate::domain::errors::RouterError;
use crate::domain::ports::{order_active, ConfigRepository};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory backend config repository.
pub struct InMemoryConfigRepository {
    configs: Arc<RwLock<Vec<BackendConfig>>>,
    version: Arc<AtomicU64>,
}

impl InMemoryConfigRepository {
    pub fn new(configs: Vec<BackendConfig>) -> Self {
        Self {
            configs: Arc::new(RwLock::new(configs)),
            version: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Swap in a new config set.
    pub async fn replace(&self, configs: Vec<BackendConfig>) {
        let count = configs.len();
        {
            let mut guard = self.configs.write().await;
            *guard = configs;
        }
        let new_version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("config reload ok, version={} configs={}", new_version, count);
    }

    /// Number of times the config set has been loaded.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryConfigRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ConfigRepository for InMemoryConfigRepository {
    async fn get_active_configs(&self) -> Result<Vec<BackendConfig>, RouterError> {
        let active = order_active(self.configs.read().await.clone());
        if active.is_empty() {
            return Err(RouterError::ConfigUnavailable(
                "no active backend configs".to_string(),
            ));
        }
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ProviderKind, Tier};

    fn config(id: &str, priority: i64) -> BackendConfig {
        BackendConfig::new(id, ProviderKind::Mistral, "mistral-small", Tier::Normal, priority)
    }

    #[tokio::test]
    async fn test_returns_active_sorted() {
        let repo = InMemoryConfigRepository::new(vec![
            config("a", 1),
            config("b", 3).inactive(),
            config("c", 2),
        ]);

        let active = repo.get_active_configs().await.unwrap();
        let ids: Vec<_> = active.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_empty_is_unavailable() {
        let repo = InMemoryConfigRepository::default();
        assert!(matches!(
            repo.get_active_configs().await,
            Err(RouterError::ConfigUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_only_inactive_is_unavailable() {
        let repo = InMemoryConfigRepository::new(vec![config("a", 1).inactive()]);
        assert!(repo.get_active_configs().await.is_err());
    }

    #[tokio::test]
    async fn test_replace_bumps_version() {
        let repo = InMemoryConfigRepository::default();
        assert_eq!(repo.version(), 1);

        repo.replace(vec![config("new", 1)]).await;

        assert_eq!(repo.version(), 2);
        assert_eq!(repo.get_active_configs().await.unwrap()[0].id, "new");
    }
}
