use anyhow::Result;
use skyscanner_scraper::config::ScraperConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    skyscanner_scraper::run(ScraperConfig::default()).await
}
