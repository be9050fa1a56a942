//! Domain Errors
//!
//! Only request-level failures surface to callers. Per-candidate failures
//! are recovered by the fallback executor and only show up as exhaustion.

/// Errors surfaced to callers of the router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// No active backend configuration exists, or the store is unreachable.
    #[error("no active backend configuration available: {0}")]
    ConfigUnavailable(String),

    /// Every resolved candidate failed or returned empty output.
    #[error("all providers exhausted after {attempted} candidate(s)")]
    AllProvidersExhausted { attempted: usize },

    /// A response could not be parsed as JSON.
    #[error("failed to extract JSON from response: {reason}")]
    JsonExtractionFailed { raw: String, reason: String },

    /// The caller cancelled the request before a candidate succeeded.
    #[error("request cancelled")]
    Cancelled,
}

impl RouterError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigUnavailable(_) => "config_unavailable",
            Self::AllProvidersExhausted { .. } => "all_providers_exhausted",
            Self::JsonExtractionFailed { .. } => "json_extraction_failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Per-candidate failure raised by a provider invoker.
///
/// Ordinary negative outcomes (missing credential, non-2xx, malformed
/// payload) are not errors; they are reported as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invoker error: {0}")]
    Client(String),
}
