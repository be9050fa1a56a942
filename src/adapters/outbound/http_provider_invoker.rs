//! HTTP Provider Invoker
//!
//! Sends provider calls over a shared reqwest client.

use crate::adapters::outbound::providers::{parse_response, ProviderSettings, WireRequest};
use crate::domain::entities::{BackendConfig, CallOptions, Payload};
use crate::domain::errors::InvokeError;
use crate::domain::ports::{ProviderInvoker, SecretStore};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const LOGGED_BODY_LIMIT: usize = 256;

/// Provider invoker over HTTP.
///
/// Credentials are resolved through the secret store on every call.
pub struct HttpProviderInvoker {
    client: reqwest::Client,
    settings: ProviderSettings,
    secrets: Arc<dyn SecretStore>,
}

impl HttpProviderInvoker {
    /// Create an invoker whose calls give up after `timeout`.
    pub fn new(
        settings: ProviderSettings,
        secrets: Arc<dyn SecretStore>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, settings, secrets))
    }

    pub fn with_client(
        client: reqwest::Client,
        settings: ProviderSettings,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            client,
            settings,
            secrets,
        }
    }

    async fn credential(&self, config: &BackendConfig) -> Option<String> {
        if config.secret_ref.is_empty() {
            return None;
        }
        self.secrets.lookup(&config.secret_ref).await
    }
}

#[async_trait]
impl ProviderInvoker for HttpProviderInvoker {
    async fn invoke(
        &self,
        config: &BackendConfig,
        payload: &Payload,
        options: &CallOptions,
    ) -> Result<Option<String>, InvokeError> {
        let credential = self.credential(config).await;
        if credential.is_none() && config.provider.requires_credential() {
            tracing::warn!(
                "no credential for {} (secret_ref={:?})",
                config.id,
                config.secret_ref
            );
            return Ok(None);
        }

        let Some(wire) = WireRequest::prepare(
            config,
            payload,
            options,
            &self.settings,
            credential.as_deref(),
        ) else {
            tracing::info!(
                "{} ({}) cannot serve a {} request",
                config.id,
                config.provider,
                payload.kind()
            );
            return Ok(None);
        };

        let mut request = self.client.post(&wire.url).json(&wire.body);
        for (name, value) in &wire.headers {
            request = request.header(*name, value);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::warn!("{} timed out", config.id);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                tracing::warn!("{} timed out reading response", config.id);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if !status.is_success() {
            tracing::warn!(
                "{} returned {}: {}",
                config.id,
                status,
                truncate(&String::from_utf8_lossy(&body))
            );
            return Ok(None);
        }

        let text = parse_response(config.provider, &body);
        if text.is_none() {
            tracing::warn!("{} returned an unexpected response shape", config.id);
        }
        Ok(text)
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= LOGGED_BODY_LIMIT {
        return body.to_string();
    }
    let mut out: String = body.chars().take(LOGGED_BODY_LIMIT).collect();
    out.push_str("...");
    out
}
