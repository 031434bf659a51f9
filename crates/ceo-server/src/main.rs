//! # CEO Server
//!
//! Entry point: loads configuration, connects to Postgres, wires the
//! services, starts the cron scheduler and serves the REST API until a
//! shutdown signal arrives.

use ceo_config::ConfigLoader;
use ceo_core::{CeoError, CeoResult};
use ceo_repository::{create_pool, DatabasePoolInterface};
use ceo_rest::create_router;
use ceo_server::{
    startup::{init_logging, print_banner, print_startup_info, shutdown_signal},
    AppContainer,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {}", e);
        eprintln!("Application error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> CeoResult<()> {
    // Load configuration
    let config_loader = ConfigLoader::from_default_location()?;
    let config = config_loader.get().await;

    init_logging(&config.observability, config.app.debug);
    print_banner();
    info!("Starting {} v{}", config.app.name, env!("CARGO_PKG_VERSION"));

    // Database
    let pool = create_pool(&config.database).await?;
    if config.database.run_migrations {
        pool.run_migrations().await?;
    }
    let database: Arc<dyn DatabasePoolInterface> = pool;

    ceo_notify::metrics::register_metrics();
    ceo_jobs::register_metrics();

    let container = AppContainer::new(&config, database.clone())?;

    let scheduler = container.scheduler(&config.scheduler)?;
    if let Some(scheduler) = &scheduler {
        scheduler.start();
    }

    let router = create_router(
        container.app_state(),
        container.token_provider.clone(),
        &config.server,
    );

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CeoError::Configuration(format!("Failed to bind {addr}: {e}")))?;

    print_startup_info(&config);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CeoError::Internal(format!("Server error: {e}")));

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }
    database.close().await;

    info!("Server shutdown complete");
    served
}
