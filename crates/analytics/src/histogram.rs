//! Fixed price-range buckets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of five fixed price bands on the normalized price.
///
/// Boundaries are upper-inclusive, so every price lands in exactly one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "0-50")]
    UpTo50,
    #[serde(rename = "51-100")]
    UpTo100,
    #[serde(rename = "101-200")]
    UpTo200,
    #[serde(rename = "201-500")]
    UpTo500,
    #[serde(rename = "501+")]
    Over500,
}

impl PriceRange {
    /// Bands in boundary order.
    pub const ALL: [PriceRange; 5] = [
        PriceRange::UpTo50,
        PriceRange::UpTo100,
        PriceRange::UpTo200,
        PriceRange::UpTo500,
        PriceRange::Over500,
    ];

    /// Band containing a price. Negative prices fall in the lowest band.
    pub fn for_price(price: f64) -> Self {
        if price <= 50.0 {
            PriceRange::UpTo50
        } else if price <= 100.0 {
            PriceRange::UpTo100
        } else if price <= 200.0 {
            PriceRange::UpTo200
        } else if price <= 500.0 {
            PriceRange::UpTo500
        } else {
            PriceRange::Over500
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriceRange::UpTo50 => "0-50",
            PriceRange::UpTo100 => "51-100",
            PriceRange::UpTo200 => "101-200",
            PriceRange::UpTo500 => "201-500",
            PriceRange::Over500 => "501+",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of records in one price band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRangeBucket {
    pub range: PriceRange,
    pub count: usize,
}

/// Count prices per band; output is always the five bands in order.
pub fn price_range_histogram<I>(prices: I) -> Vec<PriceRangeBucket>
where
    I: IntoIterator<Item = f64>,
{
    let mut counts = [0usize; 5];
    for price in prices {
        counts[PriceRange::for_price(price).index()] += 1;
    }

    PriceRange::ALL
        .into_iter()
        .zip(counts)
        .map(|(range, count)| PriceRangeBucket { range, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_per_band() {
        let buckets = price_range_histogram([10.0, 75.0, 150.0, 300.0, 600.0]);
        let labels: Vec<&str> = buckets.iter().map(|b| b.range.label()).collect();
        assert_eq!(labels, vec!["0-50", "51-100", "101-200", "201-500", "501+"]);
        assert!(buckets.iter().all(|b| b.count == 1));
    }

    #[test]
    fn test_boundaries_upper_inclusive() {
        assert_eq!(PriceRange::for_price(0.0), PriceRange::UpTo50);
        assert_eq!(PriceRange::for_price(50.0), PriceRange::UpTo50);
        assert_eq!(PriceRange::for_price(50.5), PriceRange::UpTo100);
        assert_eq!(PriceRange::for_price(100.0), PriceRange::UpTo100);
        assert_eq!(PriceRange::for_price(200.01), PriceRange::UpTo500);
        assert_eq!(PriceRange::for_price(500.0), PriceRange::UpTo500);
        assert_eq!(PriceRange::for_price(500.5), PriceRange::Over500);
        assert_eq!(PriceRange::for_price(-3.0), PriceRange::UpTo50);
    }

    #[test]
    fn test_empty_has_all_bands() {
        let buckets = price_range_histogram(std::iter::empty());
        assert_eq!(buckets.len(), 5);
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_serialized_as_label() {
        assert_eq!(PriceRange::Over500.to_string(), "501+");
        assert_eq!(serde_json::to_string(&PriceRange::UpTo200).unwrap(), "\"101-200\"");
    }
}
