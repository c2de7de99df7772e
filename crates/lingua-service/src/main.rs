//! LinguaEase Service - HTTP API for the course marketplace
//!
//! This is the main entry point for the lingua-service binary.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingua_service::{create_router, AppState, SeedData, ServiceConfig};
use lingua_store::{MemoryStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lingua=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LinguaEase Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = ?config.data_dir,
        stripe_configured = %config.stripe_secret_key.is_some(),
        enforce_admin_roles = %config.enforce_admin_roles,
        "Service configuration loaded"
    );

    let store = open_store(&config)?;

    if let Some(path) = &config.seed_file {
        tracing::info!(path = %path, "Loading seed data");
        SeedData::from_file(path)?.apply(store.as_ref())?;
    }

    // Build app state
    let state = AppState::new(Arc::clone(&store), config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, closing store");
    store.close()?;

    Ok(())
}

#[cfg(feature = "rocksdb-backend")]
fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    if let Some(path) = &config.data_dir {
        tracing::info!(path = %path, "Opening RocksDB store");
        return Ok(Arc::new(lingua_store::RocksStore::open(path)?));
    }
    tracing::warn!("DATA_DIR not set - using in-memory store");
    Ok(Arc::new(MemoryStore::new()))
}

#[cfg(not(feature = "rocksdb-backend"))]
fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    if config.data_dir.is_some() {
        tracing::warn!("DATA_DIR ignored - built without the rocksdb-backend feature");
    }
    tracing::info!("Using in-memory store");
    Ok(Arc::new(MemoryStore::new()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl+C), shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
