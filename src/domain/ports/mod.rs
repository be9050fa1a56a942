mod config_repository;
mod provider_invoker;
mod secret_store;

pub use config_repository::ConfigRepository;
pub(crate) use config_repository::order_active;
pub use provider_invoker::ProviderInvoker;
pub use secret_store::SecretStore;
