//! Completion Service - Main application use case
//!
//! Resolves candidates for a request, runs them through the fallback
//! executor, and optionally recovers JSON from the result. This is the
//! primary interface for inbound adapters and embedding applications.

use crate::application::FallbackExecutor;
use crate::domain::entities::{BackendConfig, CallOptions, CallRequest, CallResult, Payload};
use crate::domain::errors::RouterError;
use crate::domain::ports::{ConfigRepository, ProviderInvoker};
use crate::domain::services::{ResponseExtractor, TierResolver};
use crate::domain::value_objects::Tier;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Completion service - main application use case.
///
/// Request lifecycle:
/// 1. Read the active configs (fails with `ConfigUnavailable` if there are none)
/// 2. Resolve them into an ordered candidate list for (tier, use case)
/// 3. Invoke candidates one at a time until one produces text
pub struct CompletionService {
    config_repo: Arc<dyn ConfigRepository>,
    executor: FallbackExecutor,
}

impl CompletionService {
    /// Create a new completion service.
    pub fn new(config_repo: Arc<dyn ConfigRepository>, invoker: Arc<dyn ProviderInvoker>) -> Self {
        Self {
            config_repo,
            executor: FallbackExecutor::new(invoker),
        }
    }

    /// Resolve the ordered candidates for a tier and optional use case.
    ///
    /// Never returns an empty list: either at least one candidate or
    /// `ConfigUnavailable`.
    pub async fn resolve_configs(
        &self,
        tier: Tier,
        use_case: Option<&str>,
    ) -> Result<Vec<BackendConfig>, RouterError> {
        let active = self.config_repo.get_active_configs().await?;
        if active.is_empty() {
            return Err(RouterError::ConfigUnavailable(
                "no active backend configs".to_string(),
            ));
        }

        Ok(TierResolver::resolve(&active, tier, use_case))
    }

    /// Run a text completion over the given candidates.
    pub async fn invoke_with_fallback(
        &self,
        configs: &[BackendConfig],
        system_prompt: &str,
        user_prompt: &str,
        options: &CallOptions,
    ) -> Result<CallResult, RouterError> {
        let payload = Payload::text(system_prompt, user_prompt);
        self.executor.run(configs, &payload, options).await
    }

    /// Run a vision completion over the given candidates.
    pub async fn invoke_vision_with_fallback(
        &self,
        configs: &[BackendConfig],
        prompt: &str,
        image_data_url: &str,
        options: &CallOptions,
    ) -> Result<CallResult, RouterError> {
        let payload = Payload::vision(prompt, image_data_url);
        self.executor.run(configs, &payload, options).await
    }

    /// Recover a JSON value from model text.
    pub fn extract_json(&self, text: &str) -> Result<Value, RouterError> {
        ResponseExtractor::extract_json(text)
    }

    /// Resolve and invoke in one step.
    pub async fn complete(&self, request: &CallRequest) -> Result<CallResult, RouterError> {
        self.complete_cancellable(request, &CancellationToken::new())
            .await
    }

    /// Resolve and invoke, abandoning the request when `cancel` fires.
    pub async fn complete_cancellable(
        &self,
        request: &CallRequest,
        cancel: &CancellationToken,
    ) -> Result<CallResult, RouterError> {
        let candidates = self
            .resolve_configs(request.tier, request.use_case.as_deref())
            .await?;

        tracing::debug!(
            "{} request tier={} use_case={:?}: {} candidate(s)",
            request.payload.kind(),
            request.tier,
            request.use_case,
            candidates.len()
        );

        self.executor
            .run_cancellable(&candidates, &request.payload, &request.options, cancel)
            .await
    }
}
