use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use guestboard::config::HostConfig;
use guestboard::db;
use guestboard::routes;
use guestboard::state::AppState;
use guestboard::store::PgStore;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("server io failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = dotenv {
        debug!(error = %e, "no .env loaded");
    }

    let config = HostConfig::parse();

    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    let state = AppState::new(Arc::new(PgStore::new(pool)));

    let app = routes::app(state, config.site_dir.as_deref());
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, site_dir = ?config.site_dir, "guestboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("guestboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
