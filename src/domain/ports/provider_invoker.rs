//! Provider Invoker Port
//!
//! Single capability interface over every provider kind and call kind.

use crate::domain::entities::{BackendConfig, CallOptions, Payload};
use crate::domain::errors::InvokeError;
use async_trait::async_trait;

/// Sends one request to the backend described by a config.
///
/// Returns `Ok(Some(text))` on success and `Ok(None)` for ordinary negative
/// outcomes (missing credential, non-2xx, timeout, malformed payload,
/// unsupported call kind). Only transport-level failures are `Err`.
/// Either way the caller moves on to the next candidate.
#[async_trait]
pub trait ProviderInvoker: Send + Sync {
    async fn invoke(
        &self,
        config: &BackendConfig,
        payload: &Payload,
        options: &CallOptions,
    ) -> Result<Option<String>, InvokeError>;
}
