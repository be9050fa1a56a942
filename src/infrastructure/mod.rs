//! Infrastructure Layer
//!
//! Cross-cutting runtime concerns.

pub mod shutdown;

pub use shutdown::{shutdown_signal, RequestGuard, ShutdownController};
