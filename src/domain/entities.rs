//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the model-router domain.
//! They have no I/O and contain only business logic.

use crate::domain::value_objects::{ProviderKind, Tier, TAG_ALL, TAG_GENERAL};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A persisted AI backend configuration.
///
/// Rows are administered externally; this crate only reads the active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Opaque identifier
    pub id: String,
    /// Wire protocol this backend speaks
    pub provider: ProviderKind,
    /// Model requested from the provider
    pub model_name: String,
    /// Name used to look up the credential at call time
    pub secret_ref: String,
    /// Higher values are tried earlier within a tier bucket
    pub priority: i64,
    /// Inactive configs never take part in resolution
    pub is_active: bool,
    /// Provider-side knobs merged into the request body
    #[serde(default)]
    pub extra_params: Map<String, Value>,
    /// Task categories this backend is preferred for
    #[serde(default)]
    pub use_case_tags: Vec<String>,
    pub tier: Tier,
    /// Informational only
    #[serde(default)]
    pub last_tested_at: Option<i64>,
    /// Informational only
    #[serde(default)]
    pub last_test_status: Option<String>,
}

impl BackendConfig {
    /// Create an active config with no tags and no extra params.
    pub fn new(
        id: impl Into<String>,
        provider: ProviderKind,
        model_name: impl Into<String>,
        tier: Tier,
        priority: i64,
    ) -> Self {
        Self {
            id: id.into(),
            provider,
            model_name: model_name.into(),
            secret_ref: String::new(),
            priority,
            is_active: true,
            extra_params: Map::new(),
            use_case_tags: Vec::new(),
            tier,
            last_tested_at: None,
            last_test_status: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.use_case_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_secret_ref(mut self, secret_ref: impl Into<String>) -> Self {
        self.secret_ref = secret_ref.into();
        self
    }

    pub fn with_extra_params(mut self, extra_params: Map<String, Value>) -> Self {
        self.extra_params = extra_params;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.use_case_tags.iter().any(|t| t == tag)
    }

    /// Tagged for every use case.
    pub fn is_for_all(&self) -> bool {
        self.has_tag(TAG_ALL)
    }

    /// Untagged configs count as general.
    pub fn is_general(&self) -> bool {
        self.use_case_tags.is_empty() || self.has_tag(TAG_GENERAL)
    }
}

/// Generation knobs supplied per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallOptions {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Ask for structured JSON output where the protocol supports it
    #[serde(default)]
    pub json_mode: bool,
}

/// What is sent to a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text {
        system_prompt: String,
        user_prompt: String,
    },
    Vision {
        prompt: String,
        /// `data:<mime>;base64,<payload>`
        image_data_url: String,
    },
}

impl Payload {
    pub fn text(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self::Text {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }

    pub fn vision(prompt: impl Into<String>, image_data_url: impl Into<String>) -> Self {
        Self::Vision {
            prompt: prompt.into(),
            image_data_url: image_data_url.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Vision { .. } => "vision",
        }
    }
}

/// A complete request: where to route it and what to send.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub tier: Tier,
    pub use_case: Option<String>,
    pub payload: Payload,
    pub options: CallOptions,
}

impl CallRequest {
    pub fn new(tier: Tier, payload: Payload) -> Self {
        Self {
            tier,
            use_case: None,
            payload,
            options: CallOptions::default(),
        }
    }

    pub fn use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_case = Some(use_case.into());
        self
    }

    pub fn options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }
}

/// Output of a successful fallback run.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    pub text: String,
    /// The config whose backend produced `text`
    pub served_by: BackendConfig,
}
