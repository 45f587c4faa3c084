//! Raw record to `Listing` normalization.

use crate::price::{text_to_reference_currency, to_reference_currency};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use sales_core::{Column, Listing, RawRecord};

// `%.f` also accepts a missing fraction.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Normalize one parsed record.
///
/// `price_usd` comes from the canonical USD column when present, else from
/// the display price, else 0.
pub fn normalize_record(record: &RawRecord) -> Listing {
    let mut listing = Listing::default();

    for (name, value) in record.iter() {
        match Column::from_header(name) {
            Some(Column::PriceUsd) => listing.price = Some(value.clone()),
            Some(column) => {
                let text = Some(value.to_string());
                match column {
                    Column::Title => listing.title = text,
                    Column::Condition => listing.condition = text,
                    Column::Origin => listing.origin = text,
                    Column::Seller => listing.seller = text,
                    Column::SoldAt => listing.sold_at_text = text,
                    Column::Url => listing.url = text,
                    Column::DisplayPrice => listing.display_price = text,
                    Column::Shipping => listing.shipping = text,
                    Column::PriceUsd => {}
                }
            }
            None => {
                listing.extra.insert(name.to_string(), value.to_string());
            }
        }
    }

    listing.price_usd = match (&listing.price, &listing.display_price) {
        (Some(price), _) => to_reference_currency(price),
        (None, Some(display)) => text_to_reference_currency(display),
        (None, None) => 0.0,
    };
    listing.shipping_usd = listing
        .shipping
        .as_deref()
        .map(text_to_reference_currency)
        .unwrap_or(0.0);
    listing.sold_at = listing.sold_at_text.as_deref().and_then(parse_timestamp);

    listing
}

/// Normalize records, preserving order.
pub fn normalize_records(records: &[RawRecord]) -> Vec<Listing> {
    records.iter().map(normalize_record).collect()
}

/// Parse a sale timestamp.
///
/// Accepts RFC 3339 and `YYYY-MM-DD` / `YYYY/MM/DD` dates with an optional
/// time of day (`T` or space separated, seconds and fraction optional).
/// Times without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    DATE_FORMATS.iter().find_map(|format| {
        let date = NaiveDate::parse_from_str(raw, format).ok()?;
        Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
    })
}
