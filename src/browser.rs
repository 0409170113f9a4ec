//! Remote browser session over the Chrome DevTools Protocol.
//!
//! The heavy lifting (browser process, anti-bot handling, rendering) lives in
//! the remote scraping-browser service; this module only drives one page on
//! it: navigate, run in-page scroll passes for the loop in [`crate::scroll`],
//! hand back the HTML.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, Page};
use futures_util::StreamExt;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::scroll::ScrollTarget;

/// In-page routine: advance the scroll position in fixed increments until the
/// document's scroll height is exhausted, then resolve so new results can
/// lazy-load.
const SCROLL_TO_BOTTOM_JS: &str = r#"
(async () => {
    await new Promise((resolve) => {
        let totalHeight = 0;
        const distance = 100;
        const timer = setInterval(() => {
            const scrollHeight = document.body.scrollHeight;
            window.scrollBy(0, distance);
            totalHeight += distance;
            if (totalHeight >= scrollHeight) {
                clearInterval(timer);
                resolve();
            }
        }, 100);
    });
})()
"#;

/// One page on a remotely hosted browser, held for the duration of a run.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Attach to the remote browser endpoint and open a fresh page.
    ///
    /// Connection errors are fatal; there is no retry.
    pub async fn connect(endpoint: &str) -> Result<Self> {
        info!("Connecting to scraping browser...");
        let (browser, mut handler) = Browser::connect(endpoint)
            .await
            .context("failed to connect to remote browser endpoint")?;

        // Drive the CDP event stream for the lifetime of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler event error: {e}");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open a page on the remote browser")?;

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Load the target URL and wait for navigation to complete.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        info!("Navigating to {url}...");
        self.page
            .goto(url)
            .await
            .with_context(|| format!("failed to navigate to {url}"))?;
        self.page
            .wait_for_navigation()
            .await
            .context("navigation did not complete")?;
        Ok(())
    }

    /// Ask the scraping-browser service to detect and solve a CAPTCHA.
    ///
    /// `Captcha.waitForSolve` is an out-of-band command specific to the
    /// remote service, so it goes over the wire as a raw CDP method.
    pub async fn wait_for_captcha(&self, detect_timeout: Duration) -> Result<()> {
        info!("Waiting for CAPTCHA to be solved...");
        let resp = self
            .page
            .execute(CaptchaWaitForSolveParams {
                detect_timeout: detect_timeout.as_millis() as u64,
            })
            .await
            .context("Captcha.waitForSolve command failed")?;
        let status = resp
            .result
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown");
        info!("CAPTCHA solve status: {status}");
        Ok(())
    }

    /// Serialize the rendered DOM, including lazy-loaded content, to HTML.
    pub async fn content(&self) -> Result<String> {
        info!("Scraping page content...");
        self.page
            .content()
            .await
            .context("failed to read rendered page content")
    }

    /// Release the session. Runs on both success and failure paths, so
    /// cleanup errors are logged rather than propagated.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("failed to close remote browser cleanly: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            debug!("browser wait after close: {e}");
        }
        self.handler_task.abort();
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaptchaWaitForSolveParams {
    detect_timeout: u64,
}

impl chromiumoxide_types::Method for CaptchaWaitForSolveParams {
    fn identifier(&self) -> chromiumoxide_types::MethodId {
        "Captcha.waitForSolve".into()
    }
}

impl chromiumoxide_types::Command for CaptchaWaitForSolveParams {
    type Response = serde_json::Value;
}

#[async_trait]
impl ScrollTarget for BrowserSession {
    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate(SCROLL_TO_BOTTOM_JS)
            .await
            .context("scroll script failed")?;
        Ok(())
    }

    async fn settle(&self, pause: Duration) {
        tokio::time::sleep(pause).await;
    }

    async fn count_matches(&self, link_prefix: &str) -> Result<usize> {
        let script =
            format!(r#"document.querySelectorAll('a[href^="{link_prefix}"]').length"#);
        self.page
            .evaluate(script)
            .await
            .context("result count query failed")?
            .into_value::<usize>()
            .context("result count was not a number")
    }
}
