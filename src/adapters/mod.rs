//! Adapters
//!
//! Inbound adapters drive the application (HTTP API). Outbound adapters
//! implement the domain ports (config storage, secrets, provider calls).

pub mod inbound;
pub mod outbound;
