//! Data ingestion and normalization for the sales-insight system.
//!
//! This crate handles:
//! - Quote-tolerant CSV parsing
//! - Price normalization into the reference currency
//! - The one-time normalization pass producing a `Snapshot`

pub mod csv_parser;
pub mod normalizer;
pub mod price;

pub use csv_parser::{parse_csv, CsvParser, ParseStats, ParsedTable};
pub use normalizer::{normalize_record, normalize_records, parse_timestamp};
pub use price::{to_reference_currency, text_to_reference_currency, YEN_PER_USD};

use sales_core::{Result, Snapshot};
use tracing::{debug, warn};

/// Build a snapshot from a fetched payload.
///
/// An absent or blank payload (e.g. a failed fetch) yields an empty
/// snapshot.
pub fn ingest(payload: Option<&str>) -> Snapshot {
    let Some(text) = payload.filter(|t| !t.trim().is_empty()) else {
        warn!("No data to ingest, using empty snapshot");
        return Snapshot::empty();
    };

    let mut parser = CsvParser::new();
    let table = parser.parse_table(text);
    let listings = normalize_records(&table.records);

    let stats = parser.stats();
    if stats.irregular_rows() > 0 || stats.unterminated_quotes > 0 {
        debug!(
            irregular_rows = stats.irregular_rows(),
            unterminated_quotes = stats.unterminated_quotes,
            "Recovered irregular input"
        );
    }
    debug!(listings = listings.len(), columns = table.header.len(), "Ingested snapshot");

    Snapshot::new(table.header, listings)
}

/// Build a snapshot from raw bytes; fails only on invalid UTF-8.
pub fn ingest_bytes(bytes: &[u8]) -> Result<Snapshot> {
    let text = std::str::from_utf8(bytes)?;
    Ok(ingest(Some(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sales_core::{logging::init_test_logging, Error};

    #[test]
    fn test_ingest_missing_payload() {
        init_test_logging();
        assert!(ingest(None).is_empty());
        assert!(ingest(Some("   \n")).is_empty());
    }

    #[test]
    fn test_ingest_normalizes_once() {
        init_test_logging();
        let snapshot = ingest(Some(
            "タイトル,価格(表示),発送元\nwatch,\"30,000円\",\"Osaka, Japan\"\nclock,12.5,US\n",
        ));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.header().len(), 3);
        let listings = snapshot.listings();
        assert_relative_eq!(listings[0].price_usd, 200.0);
        assert_relative_eq!(listings[1].price_usd, 12.5);
        assert_eq!(listings[0].origin.as_deref(), Some("Osaka, Japan"));
    }

    #[test]
    fn test_ingest_bytes() {
        assert_eq!(ingest_bytes(b"a\n1\n2\n").unwrap().len(), 2);
        assert!(matches!(ingest_bytes(&[0xc3, 0x28]), Err(Error::Encoding(_))));
    }
}
