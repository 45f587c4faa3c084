//! Core data types for the sales-insight system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Currency marker identifying a price string as Japanese yen.
pub const YEN_MARKER: char = '円';

/// Bucket label for records whose grouping value is missing or empty.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A single cell produced by the CSV parser.
///
/// The canonical USD price column is parsed eagerly into `Number`; every
/// other cell stays `Text`, including yen-marked prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    /// String form of the value (numbers use the shortest `f64` display).
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// True for an empty text cell.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// Columns of the marketplace export that receive special treatment.
///
/// Header names are matched exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    /// Listing title.
    Title,
    /// Item condition.
    Condition,
    /// Shipping origin / region.
    Origin,
    /// Seller name.
    Seller,
    /// Sale timestamp.
    SoldAt,
    /// Item page URL.
    Url,
    /// Price already expressed in the reference currency.
    PriceUsd,
    /// Price as displayed on the marketplace (may carry the yen marker).
    DisplayPrice,
    /// Shipping cost (may carry the yen marker).
    Shipping,
}

impl Column {
    /// Every recognized column.
    pub const ALL: [Column; 9] = [
        Column::Title,
        Column::Condition,
        Column::Origin,
        Column::Seller,
        Column::SoldAt,
        Column::Url,
        Column::PriceUsd,
        Column::DisplayPrice,
        Column::Shipping,
    ];

    /// Header name as it appears in the export.
    pub fn header_name(self) -> &'static str {
        match self {
            Column::Title => "タイトル",
            Column::Condition => "商品の状態",
            Column::Origin => "発送元",
            Column::Seller => "出品者",
            Column::SoldAt => "販売日時",
            Column::Url => "URL",
            Column::PriceUsd => "価格(USD)",
            Column::DisplayPrice => "価格(表示)",
            Column::Shipping => "送料",
        }
    }

    /// Look up a column by its exact header name.
    pub fn from_header(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.header_name() == name)
    }

    /// Columns whose values are prices (numeric sort, normalization).
    pub fn is_price_bearing(self) -> bool {
        matches!(self, Column::PriceUsd | Column::DisplayPrice | Column::Shipping)
    }
}

/// Ordered, de-duplicated column names read from the first line of input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Build a header; repeated names keep their first position.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self { names: unique }
    }

    /// Column names in input order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate column names in input order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Position of a column name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Whether the header contains a column name.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One parsed data row, aligned with its header.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    header: Arc<Header>,
    values: Vec<FieldValue>,
}

impl RawRecord {
    /// Create a record; missing trailing values become empty text and
    /// excess values are dropped.
    pub fn new(header: Arc<Header>, mut values: Vec<FieldValue>) -> Self {
        values.resize(header.len(), FieldValue::default());
        Self { header, values }
    }

    /// The header this record is keyed by.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Value for a column name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.header.position(name).map(|i| &self.values[i])
    }

    /// Value for a recognized column.
    pub fn column(&self, column: Column) -> Option<&FieldValue> {
        self.get(column.header_name())
    }

    /// Values in header order.
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// `(name, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.header.iter().zip(self.values.iter())
    }
}

/// A normalized sale record.
///
/// Recognized columns are named fields (`None` when the column is absent
/// from the header, `Some("")` when present but empty); unrecognized
/// columns pass through `extra`. The derived values are computed once
/// during ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: Option<String>,
    pub condition: Option<String>,
    pub origin: Option<String>,
    pub seller: Option<String>,
    /// Sale timestamp text as exported.
    pub sold_at_text: Option<String>,
    pub url: Option<String>,
    /// Canonical USD price cell as parsed.
    pub price: Option<FieldValue>,
    /// Displayed price (yen values already formatted for display).
    pub display_price: Option<String>,
    pub shipping: Option<String>,
    /// Unrecognized columns, keyed by header name.
    pub extra: BTreeMap<String, String>,
    /// Normalized price in the reference currency.
    pub price_usd: f64,
    /// Normalized shipping cost in the reference currency.
    pub shipping_usd: f64,
    /// Parsed sale timestamp.
    pub sold_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Text of a recognized column.
    pub fn text(&self, column: Column) -> Option<Cow<'_, str>> {
        fn borrowed(v: &Option<String>) -> Option<Cow<'_, str>> {
            v.as_deref().map(Cow::Borrowed)
        }

        match column {
            Column::Title => borrowed(&self.title),
            Column::Condition => borrowed(&self.condition),
            Column::Origin => borrowed(&self.origin),
            Column::Seller => borrowed(&self.seller),
            Column::SoldAt => borrowed(&self.sold_at_text),
            Column::Url => borrowed(&self.url),
            Column::PriceUsd => self.price.as_ref().map(FieldValue::as_text),
            Column::DisplayPrice => borrowed(&self.display_price),
            Column::Shipping => borrowed(&self.shipping),
        }
    }

    /// Text of any column by header name.
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match Column::from_header(name) {
            Some(column) => self.text(column),
            None => self.extra.get(name).map(|v| Cow::Borrowed(v.as_str())),
        }
    }

    /// `(name, text)` for every header column, in header order.
    pub fn fields<'a>(
        &'a self,
        header: &'a Header,
    ) -> impl Iterator<Item = (&'a str, Cow<'a, str>)> + 'a {
        header
            .iter()
            .filter_map(move |name| self.field(name).map(|value| (name, value)))
    }

    /// Sale timestamp in ms; 0 when missing or unparseable.
    pub fn sold_at_ms(&self) -> TimestampMs {
        self.sold_at.map(|ts| ts.timestamp_millis()).unwrap_or(0)
    }

    /// Seller name, if present and non-empty.
    pub fn seller_name(&self) -> Option<&str> {
        self.seller.as_deref().filter(|s| !s.is_empty())
    }
}

/// An immutable ingested data set.
///
/// Replaced wholesale on re-ingestion; clones share the same listings.
#[derive(Debug, Clone)]
pub struct Snapshot {
    header: Arc<Header>,
    listings: Arc<[Listing]>,
}

impl Snapshot {
    /// Create a snapshot from a header and normalized listings.
    pub fn new(header: Arc<Header>, listings: Vec<Listing>) -> Self {
        Self {
            header,
            listings: Arc::from(listings),
        }
    }

    /// A snapshot with no columns and no listings.
    pub fn empty() -> Self {
        Self::new(Arc::new(Header::default()), Vec::new())
    }

    /// The header.
    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    /// All listings in input order.
    pub fn listings(&self) -> &Arc<[Listing]> {
        &self.listings
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether there are no listings.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
