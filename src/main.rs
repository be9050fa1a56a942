//! model-router - AI backend routing service
//!
//! This is the composition root that wires together all the components.

use model_router::adapters::inbound::ApiServer;
use model_router::adapters::outbound::{
    EnvSecretStore, HttpProviderInvoker, SqliteConfigRepository,
};
use model_router::infrastructure::{shutdown_signal, ShutdownController};
use model_router::{load_config, CompletionService};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting model-router listen={} db={} timeout={}s",
        cfg.listen_addr,
        cfg.db_path,
        cfg.request_timeout_secs
    );

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters
    SqliteConfigRepository::ensure_schema(&cfg.db_path)?;
    let config_repo = Arc::new(SqliteConfigRepository::new(cfg.db_path.clone()));

    let secrets = Arc::new(EnvSecretStore::new(cfg.secret_prefix.clone()));
    let invoker = Arc::new(HttpProviderInvoker::new(
        cfg.provider_settings(),
        secrets,
        cfg.request_timeout(),
    )?);

    // 2. Application service
    let service = Arc::new(CompletionService::new(config_repo, invoker));

    // 3. Shutdown coordination
    let shutdown = ShutdownController::new();
    shutdown.spawn_drain_watchdog(cfg.drain_timeout());
    tokio::spawn(shutdown_signal(shutdown.clone()));

    // 4. Inbound adapter
    let server = ApiServer::new(cfg.listen_addr, service, shutdown);
    server.run().await
}
