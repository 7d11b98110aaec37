use anyhow::{Context, Result};
use odds_scrape::scrapers::browser::ChromeLauncher;
use odds_scrape::{init_logging, server, ScrapeOrchestrator, ScraperConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    init_logging();

    let config = ScraperConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let orchestrator = ScrapeOrchestrator::new(config, Box::new(ChromeLauncher))
        .context("Failed to set up scraper")?;
    let app = server::router(Arc::new(orchestrator));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    info!("Starting web server at http://{}", bind_addr);
    info!("Endpoints: GET /  GET /scrape");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
