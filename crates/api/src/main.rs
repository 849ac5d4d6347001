//! MeshMind API server.

use std::sync::Arc;

use api::{app, AppState, Config};
use brain_core::PromptMatchmaker;
use database::Database;
use gemini_brain::GeminiBrain;
use matching::UsagePolicy;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting MeshMind API");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // One model client serves both ranking and insight
    let brain = GeminiBrain::from_env()?;
    info!(model = %brain.config().model, "Language model configured");
    let matchmaker = Arc::new(PromptMatchmaker::new(brain));

    if config.identity_token.is_none() {
        info!("IDENTITY_PROXY_TOKEN not set, trusting identity headers as-is");
    }

    let state = AppState::new(
        db,
        matchmaker.clone(),
        matchmaker,
        UsagePolicy::new(config.free_match_limit),
        config.identity_token.clone(),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "MeshMind API listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
