//! CSV feed.

use crate::models::YearMatch;
use std::error::Error;

const HEADER: [&str; 3] = ["year", "url", "text"];

/// CSV bytes with a header row, written even when there are no records.
pub fn render(records: &[YearMatch]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::fixtures;

    #[test]
    fn test_header_only_when_empty() {
        let bytes = render(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap().trim_end(), "year,url,text");
    }

    #[test]
    fn test_quoted_fields_read_back() {
        let records = fixtures::records();
        let bytes = render(&records).unwrap();

        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), HEADER);
        let parsed: Vec<YearMatch> = rdr.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(parsed, records);
    }
}
