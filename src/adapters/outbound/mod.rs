mod http_provider_invoker;
mod memory_config_repo;
pub mod providers;
mod secret_stores;
mod sqlite_config_repo;

pub use http_provider_invoker::HttpProviderInvoker;
pub use memory_config_repo::InMemoryConfigRepository;
pub use providers::ProviderSettings;
pub use secret_stores::{EnvSecretStore, StaticSecretStore};
pub use sqlite_config_repo::SqliteConfigRepository;
