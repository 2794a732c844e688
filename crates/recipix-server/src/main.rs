//! # recipix-server
//!
//! HTTP backend for the Recipix recipe book.
//!
//! This binary provides:
//! - **REST API** (axum) for recipes, their ingredient lists, ratings and
//!   favorites, plus the shared ingredient catalog
//! - **Image uploads** stored on disk and served back under `/uploads`
//! - **SQLite storage** (via `recipix-store`) where a recipe and all of its
//!   ingredient links are written in a single transaction

mod api;
mod config;
mod error;
mod image_store;
mod service;

use std::sync::Arc;

use recipix_store::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::image_store::ImageStore;
use crate::service::RecipeService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,recipix_server=debug,recipix_store=debug")
        }))
        .init();

    info!("Starting Recipix server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Database (creates the file and runs migrations if needed)
    let db = Database::open_at(&config.database_path)?;
    let service = RecipeService::new(db);

    // Image store (creates directory if missing)
    let images = Arc::new(ImageStore::new(config.uploads_path.clone(), config.max_image_size).await?);

    let http_addr = config.http_addr;
    let app_state = AppState {
        service,
        images,
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
