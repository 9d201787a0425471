//! URL list loading.
//!
//! The input is a header-less CSV file. Only the first column of each row is
//! used; any further columns (notes, labels) are ignored.

use std::error::Error;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Read the URL list at `path`, preserving row order.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_urls(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let raw = tokio::fs::read(path).await?;
    let urls = parse_urls(raw.as_slice())?;
    info!(count = urls.len(), "Loaded URL list");
    Ok(urls)
}

/// Parse URL rows from any reader.
///
/// Rows with an empty or missing first column are skipped.
pub fn parse_urls<R: Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut urls = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        match record.get(0) {
            Some(url) if !url.is_empty() => urls.push(url.to_string()),
            _ => debug!(line = line + 1, "Skipping row without a URL"),
        }
    }
    Ok(urls)
}
