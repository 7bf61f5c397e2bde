//! Learners Hub Service - HTTP API for the learning dashboards
//!
//! This is the main entry point for the learnershub service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use learnershub_service::{create_router, AppState, ServiceConfig, StorageBackend};
use learnershub_store::{FileStore, MemoryStore, RecordStore, Repository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,learnershub=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Learners Hub Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        storage_backend = ?config.storage_backend,
        admin_email = %config.admin_email,
        "Service configuration loaded"
    );

    let backend = open_backend(&config)?;
    let store = Arc::new(Repository::new(backend));

    // Build app state
    let state = AppState::new(store, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn open_backend(config: &ServiceConfig) -> Result<Arc<dyn RecordStore>, Box<dyn std::error::Error>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store - data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::File => {
            tracing::info!(path = %config.data_dir, "Opening file store");
            Ok(Arc::new(FileStore::open(&config.data_dir)?))
        }
        #[cfg(feature = "rocksdb-backend")]
        StorageBackend::Rocksdb => {
            tracing::info!(path = %config.data_dir, "Opening RocksDB store");
            Ok(Arc::new(learnershub_store::RocksStore::open(&config.data_dir)?))
        }
        #[cfg(not(feature = "rocksdb-backend"))]
        StorageBackend::Rocksdb => {
            Err("STORAGE_BACKEND=rocksdb requires the rocksdb-backend feature".into())
        }
    }
}
