//! model-router Library
//!
//! Tier and use-case aware routing of text and vision completions across
//! AI providers, with sequential fallback and JSON recovery from model
//! output.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{CompletionService, FallbackExecutor};
pub use config::load_config;
pub use domain::entities::{BackendConfig, CallOptions, CallRequest, CallResult, Payload};
pub use domain::errors::{InvokeError, RouterError};
pub use domain::ports::{ConfigRepository, ProviderInvoker, SecretStore};
pub use domain::services::{ResponseExtractor, TierResolver};
pub use domain::value_objects::{ProviderKind, Tier};
