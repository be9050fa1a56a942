//! Provider wire protocols.
//!
//! Each supported provider kind maps to exactly one request shape. The
//! closed [`ProviderRequest`] union is built from a config and a payload,
//! serialized, merged over the config's `extra_params`, and sent by the
//! HTTP invoker.

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;

use crate::domain::entities::{BackendConfig, CallOptions, Payload};
use crate::domain::value_objects::ProviderKind;
use serde_json::{Map, Value};

/// Per-provider endpoint settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub gemini_base_url: String,
    pub mistral_base_url: String,
    pub ollama_base_url: String,
    /// Sent when a call does not set `max_tokens`; Anthropic requires one
    pub anthropic_max_tokens: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openai_base_url: "https://api.openai.com".to_string(),
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            mistral_base_url: "https://api.mistral.ai".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            anthropic_max_tokens: 4096,
        }
    }
}

impl ProviderSettings {
    /// Point every provider at the same base URL.
    pub fn all_at(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            openai_base_url: base_url.clone(),
            anthropic_base_url: base_url.clone(),
            gemini_base_url: base_url.clone(),
            mistral_base_url: base_url.clone(),
            ollama_base_url: base_url,
            ..Self::default()
        }
    }

    pub fn base_url(&self, kind: ProviderKind) -> &str {
        let url = match kind {
            ProviderKind::OpenAi => &self.openai_base_url,
            ProviderKind::Anthropic => &self.anthropic_base_url,
            ProviderKind::Gemini => &self.gemini_base_url,
            ProviderKind::Mistral => &self.mistral_base_url,
            ProviderKind::Ollama => &self.ollama_base_url,
        };
        url.trim_end_matches('/')
    }
}

/// A typed request body for one of the supported protocols.
#[derive(Debug)]
pub enum ProviderRequest {
    /// OpenAI and Mistral
    OpenAiCompatible(openai::ChatRequest),
    Anthropic(anthropic::MessagesRequest),
    Gemini(gemini::GenerateContentRequest),
    Ollama(ollama::ChatRequest),
}

impl ProviderRequest {
    /// Build the request body for `config`, or None when the payload cannot
    /// be expressed for its provider (vision on a text-only kind, malformed
    /// data URL).
    pub fn build(
        config: &BackendConfig,
        payload: &Payload,
        options: &CallOptions,
        settings: &ProviderSettings,
    ) -> Option<Self> {
        let model = config.model_name.as_str();
        match config.provider {
            kind @ (ProviderKind::OpenAi | ProviderKind::Mistral) => {
                openai::build(kind, model, payload, options).map(Self::OpenAiCompatible)
            }
            ProviderKind::Anthropic => {
                anthropic::build(model, payload, options, settings.anthropic_max_tokens)
                    .map(Self::Anthropic)
            }
            ProviderKind::Gemini => gemini::build(payload, options).map(Self::Gemini),
            ProviderKind::Ollama => ollama::build(model, payload, options).map(Self::Ollama),
        }
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            Self::OpenAiCompatible(r) => serde_json::to_value(r),
            Self::Anthropic(r) => serde_json::to_value(r),
            Self::Gemini(r) => serde_json::to_value(r),
            Self::Ollama(r) => serde_json::to_value(r),
        }
    }
}

/// Everything needed to send one provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

impl WireRequest {
    /// Assemble the full HTTP request for `config`.
    ///
    /// `credential` is the already-resolved secret, if any.
    pub fn prepare(
        config: &BackendConfig,
        payload: &Payload,
        options: &CallOptions,
        settings: &ProviderSettings,
        credential: Option<&str>,
    ) -> Option<Self> {
        let request = ProviderRequest::build(config, payload, options, settings)?;
        let body = match request.to_value() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("failed to encode request for {}: {}", config.id, e);
                return None;
            }
        };

        let kind = config.provider;
        let base = settings.base_url(kind);
        let url = match kind {
            ProviderKind::OpenAi | ProviderKind::Mistral => format!("{}{}", base, openai::PATH),
            ProviderKind::Anthropic => format!("{}{}", base, anthropic::PATH),
            ProviderKind::Gemini => format!("{}{}", base, gemini::path(&config.model_name)),
            ProviderKind::Ollama => format!("{}{}", base, ollama::PATH),
        };

        Some(Self {
            url,
            headers: auth_headers(kind, credential),
            body: merge_over(&config.extra_params, body),
        })
    }
}

fn auth_headers(kind: ProviderKind, credential: Option<&str>) -> Vec<(&'static str, String)> {
    let mut headers = Vec::with_capacity(2);
    match (kind, credential) {
        (ProviderKind::Anthropic, Some(key)) => {
            headers.push(("x-api-key", key.to_string()));
        }
        (ProviderKind::Gemini, Some(key)) => {
            headers.push(("x-goog-api-key", key.to_string()));
        }
        (_, Some(key)) => {
            headers.push(("authorization", format!("Bearer {}", key)));
        }
        (_, None) => {}
    }
    if kind == ProviderKind::Anthropic {
        headers.push(("anthropic-version", anthropic::API_VERSION.to_string()));
    }
    headers
}

/// Deep-merge `body` over `base`. Values from `body` win; nested objects
/// are merged key by key.
pub fn merge_over(base: &Map<String, Value>, body: Value) -> Value {
    let mut merged = Value::Object(base.clone());
    merge_into(&mut merged, body);
    merged
}

fn merge_into(target: &mut Value, overlay: Value) {
    match (target, overlay) {
        (Value::Object(target), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match target.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, overlay) => *target = overlay,
    }
}

/// Pull the generated text out of a 2xx response body.
pub fn parse_response(kind: ProviderKind, body: &[u8]) -> Option<String> {
    let parsed = match kind {
        ProviderKind::OpenAi | ProviderKind::Mistral => {
            serde_json::from_slice(body).ok().and_then(openai::parse)
        }
        ProviderKind::Anthropic => serde_json::from_slice(body).ok().and_then(anthropic::parse),
        ProviderKind::Gemini => serde_json::from_slice(body).ok().and_then(gemini::parse),
        ProviderKind::Ollama => serde_json::from_slice(body).ok().and_then(ollama::parse),
    };
    parsed.filter(|text| !text.is_empty())
}
