//! Feed export for year matches.
//!
//! All records are rendered in memory and written to the output path in a
//! single write once the crawl finishes.
//!
//! # Submodules
//!
//! - [`delimited`]: CSV with a `year,url,text` header
//! - [`json`]: JSON array and JSON Lines
//! - [`xml`]: `<items><item>...</item></items>` document

pub mod delimited;
pub mod json;
pub mod xml;

use crate::models::YearMatch;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Output serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    Csv,
    Json,
    #[value(name = "jsonlines")]
    JsonLines,
    Xml,
}

/// Render `records` as `format` and write them to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display(), ?format, count = records.len()))]
pub async fn write_feed(
    records: &[YearMatch],
    format: FeedFormat,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let bytes = match format {
        FeedFormat::Csv => delimited::render(records)?,
        FeedFormat::Json => json::render(records)?,
        FeedFormat::JsonLines => json::render_lines(records)?,
        FeedFormat::Xml => xml::render(records)?,
    };
    fs::write(path, &bytes).await?;
    info!(bytes = bytes.len(), "Wrote feed");
    Ok(())
}
