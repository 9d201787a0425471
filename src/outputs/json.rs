//! JSON and JSON Lines feeds.

use crate::models::YearMatch;
use std::error::Error;

/// A pretty-printed JSON array of records.
pub fn render(records: &[YearMatch]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// One compact JSON object per line.
pub fn render_lines(records: &[YearMatch]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut bytes = Vec::new();
    for record in records {
        serde_json::to_writer(&mut bytes, record)?;
        bytes.push(b'\n');
    }
    Ok(bytes)
}
