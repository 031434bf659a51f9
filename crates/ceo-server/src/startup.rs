//! Server startup utilities.

use ceo_config::{AppConfig, ObservabilityConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the log filter. `RUST_LOG` wins over the configured level; `debug` forces `debug`.
pub fn log_filter(config: &ObservabilityConfig, debug: bool) -> EnvFilter {
    let level = if debug { "debug" } else { config.log_level.as_str() };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{level},ceo={level},tower_http=debug"))
    })
}

/// Installs the global tracing subscriber, JSON or human-readable.
pub fn init_logging(config: &ObservabilityConfig, debug: bool) {
    let registry = tracing_subscriber::registry().with(log_filter(config, debug));

    if config.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
   ____ _____ ___    ____  _       _    __
  / ___| ____/ _ \  |  _ \| | __ _| |_ / _| ___  _ __ _ __ ___
 | |   |  _|| | | | | |_) | |/ _` | __| |_ / _ \| '__| '_ ` _ \
 | |___| |__| |_| | |  __/| | (_| | |_|  _| (_) | |  | | | | | |
  \____|_____\___/  |_|   |_|\__,_|\__|_|  \___/|_|  |_| |_| |_|
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("Environment: {}", config.app.environment);
    info!("REST API:    http://{}/api", addr);
    info!("Health:      http://{}/health", addr);
    info!("API Docs:    http://{}/api-docs/openapi.json", addr);
    info!(
        "Scheduler:   {}",
        if config.scheduler.enabled { "enabled" } else { "disabled" }
    );
    info!("{}", separator);
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
