//! Extracts flight-destination listings from rendered Skyscanner HTML.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Placeholder for a card field whose element is missing.
pub const MISSING_FIELD: &str = "N/A";

/// One flight-destination card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub link: String,
    pub destination: String,
    pub price: String,
}

/// Parse result: listings in document order, plus how many matched anchors
/// were dropped for having an unusable link.
#[derive(Debug, Default)]
pub struct ParseSummary {
    pub listings: Vec<Listing>,
    pub skipped: usize,
}

/// Scan the document for anchors whose href starts with `link_prefix` and
/// pull a destination and a price out of each one's subtree.
///
/// Skyscanner's class names are hashed, so the sub-elements are matched on
/// the stable `nameContainer` / `priceContainer` substrings.
pub fn parse_listings(html: &str, link_prefix: &str) -> Result<ParseSummary> {
    let document = Html::parse_document(html);
    let anchors = selector("a")?;
    let name = selector(r#"div[class*="nameContainer"]"#)?;
    let price = selector(r#"div[class*="priceContainer"]"#)?;

    let mut summary = ParseSummary::default();
    for card in document.select(&anchors) {
        let href = match card.value().attr("href") {
            Some(href) if href.starts_with(link_prefix) => href,
            _ => continue,
        };
        if href.is_empty() {
            summary.skipped += 1;
            continue;
        }
        summary.listings.push(Listing {
            link: href.to_string(),
            destination: card_field(card, &name),
            price: card_field(card, &price),
        });
    }
    Ok(summary)
}

fn selector(css: &str) -> Result<Selector> {
    // SelectorErrorKind borrows the input, so it cannot ride through `?`.
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css}: {e}"))
}

/// First descendant matching `sel`, as trimmed text; `"N/A"` when absent.
fn card_field(card: ElementRef<'_>, sel: &Selector) -> String {
    match card.select(sel).next() {
        Some(element) => trimmed_text(element),
        None => MISSING_FIELD.to_string(),
    }
}

/// Concatenate the element's text nodes with each fragment trimmed.
fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}
