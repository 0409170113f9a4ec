//! Drives the page's infinite scroll until enough results are loaded.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Page-side operations the scroll loop needs, pulled behind a trait so the
/// loop can run against a scripted page in tests.
#[async_trait]
pub trait ScrollTarget {
    /// Run one scroll-to-bottom pass inside the page.
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Give lazy-loaded content time to render.
    async fn settle(&self, pause: Duration);

    /// Count anchors whose href starts with `link_prefix`.
    async fn count_matches(&self, link_prefix: &str) -> Result<usize>;
}

/// The result threshold was never reached within the scroll budget.
///
/// The original flow looped forever in this case; failing with the counts
/// attached makes a broken selector or a short results page diagnosable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScrollError {
    #[error("loaded {found} results after {rounds} scroll rounds, wanted {want}")]
    ThresholdNotReached {
        found: usize,
        want: usize,
        rounds: usize,
    },
}

/// Scroll, settle and re-count once per round until at least `threshold`
/// matching anchors are loaded. Gives up after `max_rounds`.
pub async fn scroll_until_loaded<T: ScrollTarget + ?Sized>(
    target: &T,
    link_prefix: &str,
    threshold: usize,
    max_rounds: usize,
    pause: Duration,
) -> Result<usize> {
    info!("Scrolling and loading more results...");
    let mut loaded = 0;
    for round in 1..=max_rounds {
        target.scroll_to_bottom().await?;
        target.settle(pause).await;
        loaded = target.count_matches(link_prefix).await?;
        info!("Loaded {loaded} relevant results so far (round {round})");
        if loaded >= threshold {
            return Ok(loaded);
        }
    }
    Err(ScrollError::ThresholdNotReached {
        found: loaded,
        want: threshold,
        rounds: max_rounds,
    }
    .into())
}
