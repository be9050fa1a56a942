//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Standard alphabet, padding optional.
const DATA_URL_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Use-case tag that matches every requested use case.
pub const TAG_ALL: &str = "all";

/// Use-case tag for general-purpose backends. Untagged configs count as general.
pub const TAG_GENERAL: &str = "general";

/// Coarse cost/quality bucket a backend belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Cheap, fast models for simple tasks
    Lightweight,
    /// Full-size models
    Normal,
}

impl Tier {
    /// Parse a tier from a string.
    ///
    /// # Examples
    /// ```
    /// use model_router::domain::Tier;
    ///
    /// assert_eq!(Tier::from_str("lightweight"), Tier::Lightweight);
    /// assert_eq!(Tier::from_str("unknown"), Tier::Normal); // fallback
    /// ```
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "lightweight" => Self::Lightweight,
            _ => Self::Normal,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lightweight => "lightweight",
            Self::Normal => "normal",
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Self::Normal
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External backend kind whose wire protocol a config targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
    Mistral,
    Ollama,
}

impl ProviderKind {
    /// Parse a provider kind. Unknown kinds have no protocol, so there is no fallback.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "gemini" | "google" => Some(Self::Gemini),
            "mistral" => Some(Self::Mistral),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Mistral => "mistral",
            Self::Ollama => "ollama",
        }
    }

    /// Whether a call cannot be made without a credential.
    ///
    /// Local runtimes (Ollama) accept an optional bearer token.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Self::Ollama)
    }

    /// Whether the protocol has an image-input variant.
    pub fn supports_vision(&self) -> bool {
        !matches!(self, Self::Mistral)
    }

    /// Whether the protocol has a structured-output negotiation field.
    pub fn supports_json_mode(&self) -> bool {
        !matches!(self, Self::Anthropic)
    }

    pub fn all() -> &'static [ProviderKind] {
        &[
            Self::OpenAi,
            Self::Anthropic,
            Self::Gemini,
            Self::Mistral,
            Self::Ollama,
        ]
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An image decomposed from a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    /// Base64 body, exactly as it appeared in the URL
    pub base64: String,
}

impl ImageData {
    /// Strictly decompose a data URL. Anything that is not exactly
    /// `data:<type>/<subtype>;base64,<valid base64>` yields `None`.
    /// Padding is optional and whitespace inside the payload is dropped.
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (mime_type, payload) = rest.split_once(";base64,")?;

        let (kind, subtype) = mime_type.split_once('/')?;
        let valid_token = |s: &str| {
            !s.is_empty()
                && s
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
        };
        if !valid_token(kind) || !valid_token(subtype) {
            return None;
        }

        // Line-wrapped payloads are unwrapped before validation.
        let payload: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        if payload.is_empty() || DATA_URL_ENGINE.decode(&payload).is_err() {
            return None;
        }

        Some(Self {
            mime_type: mime_type.to_string(),
            base64: payload,
        })
    }

    /// Re-assemble the data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}
