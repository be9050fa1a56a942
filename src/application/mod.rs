//! Application Layer
//!
//! Use cases that orchestrate domain services and ports.

mod completion_service;
mod fallback_executor;

pub use completion_service::CompletionService;
pub use fallback_executor::FallbackExecutor;
