//! Fallback Executor
//!
//! Drives the sequential try-until-success policy over a candidate list.

use crate::domain::entities::{BackendConfig, CallOptions, CallResult, Payload};
use crate::domain::errors::RouterError;
use crate::domain::ports::ProviderInvoker;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome of a single candidate attempt.
enum Attempt {
    Served(String),
    Skipped,
    Cancelled,
}

/// Sequential fallback over ranked candidates.
///
/// Exactly one provider call is in flight at a time. A failing candidate is
/// never retried; resilience comes from the candidates ranked after it.
pub struct FallbackExecutor {
    invoker: Arc<dyn ProviderInvoker>,
}

impl FallbackExecutor {
    pub fn new(invoker: Arc<dyn ProviderInvoker>) -> Self {
        Self { invoker }
    }

    /// Try candidates in order until one returns non-empty text.
    pub async fn run(
        &self,
        candidates: &[BackendConfig],
        payload: &Payload,
        options: &CallOptions,
    ) -> Result<CallResult, RouterError> {
        self.run_cancellable(candidates, payload, options, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but stops as soon as `cancel` fires.
    ///
    /// An in-flight provider call is abandoned and no further candidates
    /// are attempted.
    pub async fn run_cancellable(
        &self,
        candidates: &[BackendConfig],
        payload: &Payload,
        options: &CallOptions,
        cancel: &CancellationToken,
    ) -> Result<CallResult, RouterError> {
        for (index, candidate) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!("request cancelled before candidate {}", index);
                return Err(RouterError::Cancelled);
            }

            match self.attempt(index, candidate, payload, options, cancel).await {
                Attempt::Served(text) => {
                    return Ok(CallResult {
                        text,
                        served_by: candidate.clone(),
                    });
                }
                Attempt::Skipped => continue,
                Attempt::Cancelled => return Err(RouterError::Cancelled),
            }
        }

        tracing::warn!(
            "all providers exhausted for {} request ({} candidates)",
            payload.kind(),
            candidates.len()
        );
        Err(RouterError::AllProvidersExhausted {
            attempted: candidates.len(),
        })
    }

    async fn attempt(
        &self,
        index: usize,
        candidate: &BackendConfig,
        payload: &Payload,
        options: &CallOptions,
        cancel: &CancellationToken,
    ) -> Attempt {
        tracing::debug!(
            "invoking candidate {} id={} provider={} model={}",
            index,
            candidate.id,
            candidate.provider,
            candidate.model_name
        );

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("request cancelled while candidate {} was in flight", candidate.id);
                return Attempt::Cancelled;
            }
            outcome = self.invoker.invoke(candidate, payload, options) => outcome,
        };

        match outcome {
            Ok(Some(text)) if !text.trim().is_empty() => {
                tracing::info!(
                    "served by {} ({}/{})",
                    candidate.id,
                    candidate.provider,
                    candidate.model_name
                );
                Attempt::Served(text)
            }
            Ok(_) => {
                tracing::info!("candidate {} returned no output, trying next", candidate.id);
                Attempt::Skipped
            }
            Err(e) => {
                tracing::warn!("candidate {} failed: {}, trying next", candidate.id, e);
                Attempt::Skipped
            }
        }
    }
}
