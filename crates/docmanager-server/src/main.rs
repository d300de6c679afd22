//! DocManager Server: application entry point.
//!
//! Connects to SurrealDB, applies pending migrations and purges
//! password reset tokens past their retention window.

mod config;

use chrono::Utc;
use docmanager_auth::reset::purge_expired_tokens;
use docmanager_db::repository::SurrealPasswordResetRepository;
use docmanager_db::{DbManager, latest_version, run_migrations};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("docmanager=info".parse()?))
        .json()
        .init();

    info!("Starting DocManager server...");

    let config = ServerConfig::from_env()?;

    let manager = DbManager::connect(&config.db).await?;
    run_migrations(manager.client()).await?;
    info!(version = latest_version(), "Schema is up to date");

    let resets = SurrealPasswordResetRepository::new(manager.client().clone());
    purge_expired_tokens(&resets, Utc::now(), config.reset.retention_days).await?;

    info!("DocManager server stopped.");
    Ok(())
}
