//! Sort keys and comparison transforms.

use ordered_float::OrderedFloat;
use sales_core::{Column, Error, Listing, Result, TimestampMs};
use sales_ingestion::{parse_timestamp, text_to_reference_currency};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(Error::query(format!("Unknown sort direction: {other}"))),
        }
    }
}

/// How field values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortTransform {
    /// Normalized price in the reference currency.
    Numeric,
    /// Parsed timestamp; unparseable values compare as 0.
    Timestamp,
    /// Case-sensitive comparison of the raw text; missing values compare as "".
    Lexicographic,
}

impl SortTransform {
    /// Transform used for a column by default.
    pub fn for_field(field: &str) -> Self {
        match Column::from_header(field) {
            Some(column) if column.is_price_bearing() => SortTransform::Numeric,
            Some(Column::SoldAt) => SortTransform::Timestamp,
            _ => SortTransform::Lexicographic,
        }
    }
}

/// Field selector plus direction plus comparison transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
    pub transform: SortTransform,
}

/// Comparable form of one listing's field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum KeyValue {
    Number(OrderedFloat<f64>),
    Time(TimestampMs),
    Text(String),
}

impl SortKey {
    /// Key with the transform inferred from the field.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        let field = field.into();
        let transform = SortTransform::for_field(&field);
        Self {
            field,
            direction,
            transform,
        }
    }

    /// Sort by normalized price.
    pub fn price(direction: SortDirection) -> Self {
        Self::new(Column::PriceUsd.header_name(), direction)
    }

    /// Sort by sale timestamp.
    pub fn date(direction: SortDirection) -> Self {
        Self::new(Column::SoldAt.header_name(), direction)
    }

    /// Override the comparison transform.
    pub fn with_transform(mut self, transform: SortTransform) -> Self {
        self.transform = transform;
        self
    }

    pub(crate) fn extract(&self, listing: &Listing) -> KeyValue {
        let column = Column::from_header(&self.field);
        match self.transform {
            SortTransform::Numeric => {
                let value = match column {
                    Some(Column::PriceUsd) => listing.price_usd,
                    Some(Column::Shipping) => listing.shipping_usd,
                    _ => listing
                        .field(&self.field)
                        .map(|text| text_to_reference_currency(&text))
                        .unwrap_or(0.0),
                };
                KeyValue::Number(OrderedFloat(value))
            }
            SortTransform::Timestamp => {
                let ts = match column {
                    Some(Column::SoldAt) => listing.sold_at_ms(),
                    _ => listing
                        .field(&self.field)
                        .and_then(|text| parse_timestamp(&text))
                        .map(|ts| ts.timestamp_millis())
                        .unwrap_or(0),
                };
                KeyValue::Time(ts)
            }
            SortTransform::Lexicographic => {
                KeyValue::Text(listing.field(&self.field).unwrap_or_default().into_owned())
            }
        }
    }

    /// Apply the direction to an ascending comparison.
    pub(crate) fn orient(&self, ordering: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::date(SortDirection::Descending)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction.as_str())
    }
}

/// Short names accepted in place of header names.
///
/// Profit is a fixed margin on the normalized price, so it orders exactly
/// like the price.
fn resolve_alias(name: &str) -> Option<Column> {
    match name {
        "price" | "profit" => Some(Column::PriceUsd),
        "date" => Some(Column::SoldAt),
        "title" => Some(Column::Title),
        "seller" => Some(Column::Seller),
        "location" | "region" => Some(Column::Origin),
        "shipping" => Some(Column::Shipping),
        _ => None,
    }
}

impl FromStr for SortKey {
    type Err = Error;

    /// Parse `field[:asc|:desc]`; the direction defaults to ascending.
    fn from_str(s: &str) -> Result<Self> {
        let (field, direction) = match s.rsplit_once(':') {
            Some((field, direction)) => (field.trim(), direction.parse::<SortDirection>()?),
            None => (s.trim(), SortDirection::Ascending),
        };
        if field.is_empty() {
            return Err(Error::query("Sort field cannot be empty"));
        }

        let field = match resolve_alias(field) {
            Some(column) => column.header_name(),
            None => field,
        };
        Ok(Self::new(field, direction))
    }
}
