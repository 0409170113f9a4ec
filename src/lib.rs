//! Drives a remote scraping browser through one Skyscanner listing page:
//! navigate, scroll until enough results are rendered, parse the flight
//! cards out of the HTML, write them to a JSON file.

pub mod browser;
pub mod config;
pub mod output;
pub mod parser;
pub mod scroll;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::config::ScraperConfig;
use crate::scroll::scroll_until_loaded;

/// Run one scrape end to end. The browser session is released on every
/// exit path.
pub async fn run(config: ScraperConfig) -> Result<()> {
    let target_url = config.validated_target_url()?;

    let session = BrowserSession::connect(&config.cdp_endpoint).await?;
    let result = scrape(&session, &config, target_url.as_str()).await;
    session.close().await;
    result
}

async fn scrape(session: &BrowserSession, config: &ScraperConfig, url: &str) -> Result<()> {
    session.navigate(url).await?;

    if config.solve_captcha {
        session
            .wait_for_captcha(config.captcha_detect_timeout)
            .await?;
    }

    scroll_until_loaded(
        session,
        &config.link_prefix,
        config.result_threshold,
        config.max_scroll_rounds,
        config.scroll_pause,
    )
    .await?;

    let html = session.content().await?;

    let summary = parser::parse_listings(&html, &config.link_prefix)?;
    if summary.skipped > 0 {
        warn!("dropped {} listings with unusable links", summary.skipped);
    }
    info!("Parsed {} listings", summary.listings.len());

    output::save_listings(&summary.listings, &config.output_path)
        .with_context(|| format!("failed to save results to {}", config.output_path.display()))
}
