//! Daily price trend.

use crate::aggregator::{Aggregator, BucketOrder};
use crate::profit::estimated_profit;
use sales_core::Listing;
use sales_query::RecordSet;
use serde::{Deserialize, Serialize};

/// Average price and estimated profit for one sale day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD`, the raw timestamp text, or `"Unknown"`.
    pub date: String,
    pub average_price: f64,
    pub estimated_profit: f64,
    pub count: usize,
}

/// Trend key of a listing.
///
/// Parsed timestamps use their calendar day; unparseable text is kept as-is.
pub fn sale_day(listing: &Listing) -> Option<String> {
    match listing.sold_at {
        Some(ts) => Some(ts.format("%Y-%m-%d").to_string()),
        None => listing.sold_at_text.clone(),
    }
}

/// Per-day points in first-seen order.
pub fn price_trend(records: &RecordSet, margin_pct: f64) -> Vec<TrendPoint> {
    Aggregator::for_listings(records)
        .bucket_by_key(sale_day, BucketOrder::FirstSeen)
        .into_iter()
        .map(|bucket| {
            let average_price = bucket.mean();
            TrendPoint {
                estimated_profit: estimated_profit(average_price, margin_pct),
                average_price,
                count: bucket.count,
                date: bucket.key,
            }
        })
        .collect()
}
