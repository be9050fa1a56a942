//! Secret Store Adapters
//!
//! Credential lookup from the process environment or a fixed map.

use crate::domain::ports::SecretStore;
use async_trait::async_trait;
use std::collections::HashMap;

/// Looks up `{prefix}{secret_ref}` in the process environment.
pub struct EnvSecretStore {
    prefix: String,
}

impl EnvSecretStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, secret_ref: &str) -> String {
        format!("{}{}", self.prefix, secret_ref)
    }
}

impl Default for EnvSecretStore {
    fn default() -> Self {
        Self::new("")
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn lookup(&self, secret_ref: &str) -> Option<String> {
        if secret_ref.is_empty() {
            return None;
        }
        std::env::var(self.var_name(secret_ref))
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

/// Fixed credential map.
#[derive(Default)]
pub struct StaticSecretStore {
    secrets: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, secret_ref: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(secret_ref.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn lookup(&self, secret_ref: &str) -> Option<String> {
        self.secrets
            .get(secret_ref)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}
