//! ==============================================================================
//! main.rs - iot backend entry point
//! ==============================================================================
//!
//! purpose:
//!     a thin http gateway in front of a mongodb collection of sensor
//!     readings. sensor nodes POST readings, the dashboard GETs them back.
//!
//! responsibilities:
//!     - load configuration (backend.toml + environment)
//!     - attempt the single mongodb connection (degraded mode on failure)
//!     - serve the readings api until ctrl+c / sigterm
//!
//! architecture:
//!
//!     sensor nodes ──POST──┐
//!                          ▼
//!                   ┌─────────────┐      ┌───────────────┐
//!                   │   gateway   │─────▶│ ReadingStore  │
//!                   │ (axum+cors) │      │ (MongoStore)  │
//!                   └─────────────┘      └───────┬───────┘
//!                          ▲                     ▼
//!     dashboard ───GET─────┘      Temperature_Sensing.mlx90614_readings_test
//!
//! ==============================================================================

use anyhow::Result;
use iot_backend::config::{mongo_uri_from_env, BackendConfig};
use iot_backend::gateway;
use iot_backend::store::MongoStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // step 1: environment and configuration
    // a missing .env is normal in containers; MONGO_URI may be set directly
    let dotenv = dotenvy::dotenv();
    let (config, origin) = BackendConfig::load_or_default();

    // step 2: logging (RUST_LOG overrides the configured level)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("IoT backend starting, version {}", env!("CARGO_PKG_VERSION"));
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }
    origin.log();
    config.log_summary();

    // step 3: the one connection attempt
    let store = MongoStore::connect(mongo_uri_from_env().as_deref()).await;

    // step 4: serve
    let app = gateway::app(Arc::new(store), &config.cors.allowed_origins)?;
    let addr: SocketAddr = config.server.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

/// resolves on ctrl+c or sigterm
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
