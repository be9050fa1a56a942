//! Config Repository Port
//!
//! Defines the interface for reading backend configurations.
//! Implementations may use SQLite or in-memory storage.

use crate::domain::entities::BackendConfig;
use crate::domain::errors::RouterError;
use async_trait::async_trait;

/// Read-only access to the persisted backend configurations.
///
/// This is an outbound port. Configurations are administered elsewhere;
/// the router only ever reads the active set.
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Get the active configs, sorted by descending priority with ties
    /// kept in fetch order.
    ///
    /// Fails with [`RouterError::ConfigUnavailable`] when the store cannot
    /// be read or holds no active rows.
    async fn get_active_configs(&self) -> Result<Vec<BackendConfig>, RouterError>;
}

/// Keep only active configs and stable-sort them by descending priority.
pub(crate) fn order_active(configs: Vec<BackendConfig>) -> Vec<BackendConfig> {
    let mut active: Vec<BackendConfig> = configs.into_iter().filter(|c| c.is_active).collect();
    // sort_by is stable, so equal priorities keep fetch order
    active.sort_by(|a, b| b.priority.cmp(&a.priority));
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ProviderKind, Tier};

    fn config(id: &str, priority: i64) -> BackendConfig {
        BackendConfig::new(id, ProviderKind::OpenAi, "m", Tier::Normal, priority)
    }

    #[test]
    fn test_order_active_sorts_descending() {
        let ordered = order_active(vec![config("low", 1), config("high", 10), config("mid", 5)]);
        let ids: Vec<_> = ordered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_order_active_ties_keep_fetch_order() {
        let ordered = order_active(vec![
            config("a", 5),
            config("b", 5),
            config("c", 7),
            config("d", 5),
        ]);
        let ids: Vec<_> = ordered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_order_active_drops_inactive() {
        let ordered = order_active(vec![config("a", 5).inactive(), config("b", 1)]);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].id, "b");
    }
}
