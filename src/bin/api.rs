use market_brief_orchestrator::{api::start_server, BriefConfig, BriefOrchestrator};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BriefConfig::from_env()?;

    info!("🚀 Market Brief Orchestrator - API Server");
    info!("📍 Port: {}", config.port);
    info!("🎧 Audio directory: {}", config.audio_dir.display());

    let orchestrator = Arc::new(BriefOrchestrator::from_config(&config)?);

    info!("✅ Orchestrator initialized");
    info!("📡 Starting API server...");

    start_server(orchestrator, config.port).await?;

    Ok(())
}
