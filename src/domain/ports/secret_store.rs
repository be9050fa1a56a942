//! Secret Store Port
//!
//! Resolves credential names to credentials at call time.

use async_trait::async_trait;

/// Lookup of credentials by reference name.
///
/// Configs only ever carry the reference; the credential itself is
/// fetched per call and never logged.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Return the credential for `secret_ref`, or None if absent or empty.
    async fn lookup(&self, secret_ref: &str) -> Option<String>;
}
