//! # Tenders API Main Entry Point
//!
//! This is the main entry point for the Tenders API service.

use std::sync::Arc;

use anyhow::Context;
use tenders::{
    config::ConfigLoader,
    db::{health_check, init_pool, migrate},
    observability::TracingObserver,
    server::{run_server, shutdown_on_signal},
    service::TenderService,
    telemetry::init_tracing,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;

    init_tracing(&config).context("Failed to initialize tracing")?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = Arc::new(init_pool(&config).await?);
    if config.run_migrations {
        migrate(&db).await?;
    }
    health_check(&db).await?;

    let service = TenderService::from_config(db, TracingObserver::shared(), &config);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    run_server(Arc::new(config), service, shutdown).await
}
