//! Persists the parsed listings as pretty-printed JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::parser::Listing;

/// Write the listing array to `path`, 4-space indented, overwriting any
/// previous run's output.
pub fn save_listings(listings: &[Listing], path: &Path) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    listings
        .serialize(&mut serializer)
        .context("failed to serialize listings")?;
    fs::write(path, buf).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Data extracted and saved as {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Listing> {
        vec![
            Listing {
                link: "https://www.skyscanner.co.in/transport/flights/in/del/".to_string(),
                destination: "Delhi".to_string(),
                price: "Rs 4,500".to_string(),
            },
            Listing {
                link: "https://www.skyscanner.co.in/transport/flights/in/bom/".to_string(),
                destination: "N/A".to_string(),
                price: "N/A".to_string(),
            },
        ]
    }

    #[test]
    fn listings_round_trip_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skyscanner_results.json");
        let listings = sample();

        save_listings(&listings, &path).unwrap();
        let read_back: Vec<Listing> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read_back, listings);
    }

    #[test]
    fn output_uses_four_space_indentation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        save_listings(&sample(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"link\""));
    }

    #[test]
    fn rerun_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        save_listings(&sample(), &path).unwrap();
        save_listings(&[], &path).unwrap();

        let read_back: Vec<Listing> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(read_back.is_empty());
    }
}
