//! Domain Layer
//!
//! Entities, value objects, ports, and pure services. Nothing in here
//! performs I/O directly; all I/O goes through the ports.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{BackendConfig, CallOptions, CallRequest, CallResult, Payload};
pub use errors::{InvokeError, RouterError};
pub use value_objects::{ImageData, ProviderKind, Tier, TAG_ALL, TAG_GENERAL};
