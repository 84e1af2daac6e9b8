//! Folio Server - Main Entry Point

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use folio_server::{api, config, db, notifications::NotificationDispatcher, store::PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Folio Server");

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    // Notification channels (each optional)
    let notifier = NotificationDispatcher::from_config(&config)?;

    // Build application state
    let state = api::AppState::new(Arc::new(PgStore::new(db_pool)), config.clone(), notifier);

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
