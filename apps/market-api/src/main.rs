//! # Market API
//!
//! HTTP server for the Market POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Market API Server                                │
//! │                                                                         │
//! │  Terminal ───► HTTP (8080) ───► Handlers ───► SQLite                   │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                              Redis / moka                               │
//! │                             (list cache)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use market_api::{app, AppConfig, AppState, ResponseCache};
use market_db::{Database, DbConfig};

const DEFAULT_LOG_FILTER: &str = "market_api=info,market_db=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (also reads .env, so RUST_LOG from it applies below)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting Market API server...");
    info!(
        port = config.http_port,
        database = %config.database_path,
        redis = config.redis_url.is_some(),
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await
    .context("Failed to open database")?;
    info!("Database ready");

    let cache = ResponseCache::from_url(config.redis_url.as_deref(), config.list_cache_ttl()).await;
    info!(?cache, "Response cache ready");

    let addr = config.bind_addr()?;
    let state = AppState::new(db.clone(), cache, config);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
