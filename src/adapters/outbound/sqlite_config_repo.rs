//! SQLite Config Repository
//!
//! Implements ConfigRepository on top of a SQLite table of backend configs.
//! The table is read on every request, so administrative edits take effect
//! without a restart.

use crate::domain::entities::BackendConfig;
use crate::domain::errors::RouterError;
use crate::domain::ports::{order_active, ConfigRepository};
use crate::domain::value_objects::{ProviderKind, Tier};
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, Row};
use serde_json::{Map, Value};

/// Table layout expected by [`SqliteConfigRepository`].
pub const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS ai_backend_configs (
    id TEXT PRIMARY KEY,
    provider TEXT NOT NULL,
    model_name TEXT NOT NULL,
    secret_ref TEXT NOT NULL DEFAULT '',
    priority INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    extra_params TEXT,
    use_case_tags TEXT,
    tier TEXT NOT NULL DEFAULT 'normal',
    last_tested_at INTEGER,
    last_test_status TEXT
)";

/// A row as stored, before domain conversion.
struct ConfigRow {
    id: String,
    provider: String,
    model_name: String,
    secret_ref: String,
    priority: i64,
    is_active: bool,
    extra_params: Option<String>,
    use_case_tags: Option<String>,
    tier: String,
    last_tested_at: Option<i64>,
    last_test_status: Option<String>,
}

/// SQLite-backed config repository.
pub struct SqliteConfigRepository {
    db_path: String,
}

impl SqliteConfigRepository {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Create the config table if it does not exist yet.
    pub fn ensure_schema(db_path: &str) -> Result<()> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Load active configs from the SQLite database file.
    fn load_from_sqlite(db_path: &str) -> Result<Vec<BackendConfig>> {
        // Read-only: a missing file is an error rather than a fresh empty database.
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, provider, model_name, secret_ref, priority, is_active,
                    extra_params, use_case_tags, tier, last_tested_at, last_test_status
             FROM ai_backend_configs
             WHERE is_active = 1",
        )?;

        let rows = stmt
            .query_map([], |row| Self::read_row(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows.into_iter().filter_map(Self::row_to_config).collect())
    }

    fn read_row(row: &Row) -> rusqlite::Result<ConfigRow> {
        Ok(ConfigRow {
            id: row.get(0)?,
            provider: row.get(1)?,
            model_name: row.get(2)?,
            secret_ref: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            priority: row.get(4)?,
            is_active: row.get::<_, i64>(5)? != 0,
            extra_params: row.get(6)?,
            use_case_tags: row.get(7)?,
            tier: row.get(8)?,
            last_tested_at: row.get(9)?,
            last_test_status: row.get(10)?,
        })
    }

    /// Convert a stored row to a BackendConfig, or None if its provider is unknown.
    fn row_to_config(row: ConfigRow) -> Option<BackendConfig> {
        let Some(provider) = ProviderKind::parse(&row.provider) else {
            tracing::warn!(
                "skipping config {}: unknown provider {:?}",
                row.id,
                row.provider
            );
            return None;
        };

        Some(BackendConfig {
            provider,
            model_name: row.model_name,
            secret_ref: row.secret_ref,
            priority: row.priority,
            is_active: row.is_active,
            extra_params: Self::parse_extra_params(&row.id, row.extra_params.as_deref()),
            use_case_tags: Self::parse_tags(row.use_case_tags.as_deref()),
            tier: Tier::from_str(&row.tier),
            last_tested_at: row.last_tested_at,
            last_test_status: row.last_test_status,
            id: row.id,
        })
    }

    fn parse_extra_params(id: &str, raw: Option<&str>) -> Map<String, Value> {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Map::new();
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!("config {}: extra_params is not a JSON object, ignoring", id);
                Map::new()
            }
        }
    }

    /// Tags are stored as a JSON array; comma-separated text is accepted too.
    fn parse_tags(raw: Option<&str>) -> Vec<String> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(tags) => tags,
            Err(_) => raw
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

#[async_trait]
impl ConfigRepository for SqliteConfigRepository {
    async fn get_active_configs(&self) -> Result<Vec<BackendConfig>, RouterError> {
        let db_path = self.db_path.clone();

        let loaded = tokio::task::spawn_blocking(move || Self::load_from_sqlite(&db_path))
            .await
            .map_err(|e| RouterError::ConfigUnavailable(format!("spawn_blocking error: {}", e)))?;

        let configs = match loaded {
            Ok(configs) => configs,
            Err(e) => {
                tracing::error!("error reading backend configs from {}: {:?}", self.db_path, e);
                return Err(RouterError::ConfigUnavailable(e.to_string()));
            }
        };

        let active = order_active(configs);
        if active.is_empty() {
            return Err(RouterError::ConfigUnavailable(
                "no active backend configs".to_string(),
            ));
        }

        tracing::debug!("loaded {} active backend configs", active.len());
        Ok(active)
    }
}
