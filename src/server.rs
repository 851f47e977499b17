/// Server setup and initialization
///
/// Wires together configuration, storage, the crypto codec and HTTP routes.

use crate::{
    api::{create_workflow_routes, AppState},
    config::Config,
    crypto::CryptoCodec,
    workflow::{storage::WorkflowStorage, WorkflowService},
};
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::{str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Build the router over an already initialised service
pub fn build_router(service: WorkflowService) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .merge(create_workflow_routes().with_state(AppState { service }))
}

/// Create the main Axum application
///
/// Opens (and creates if missing) the database, ensures the schema and keys
/// the crypto codec from configuration.
pub async fn create_app(config: &Config) -> Result<Router> {
    tracing::info!("🗄️ Opening workflow database");
    let options = SqliteConnectOptions::from_str(&config.database.url)
        .with_context(|| format!("invalid database url: {}", config.database.url))?
        .create_if_missing(true);
    if let Some(dir) = options.get_filename().parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create data directory {}", dir.display()))?;
        }
    }
    let pool = SqlitePool::connect_with(options)
        .await
        .context("failed to open workflow database")?;

    let storage = WorkflowStorage::new(pool);
    storage
        .init_schema()
        .await
        .context("failed to initialise workflow schema")?;

    let crypto = Arc::new(CryptoCodec::new(&config.crypto));
    let service = WorkflowService::new(storage, crypto);

    tracing::info!("✅ Application initialized successfully");
    Ok(build_router(service))
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Flowvault server...");

    let app = create_app(&config).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
