//! Summary statistics and grouped buckets over a record sequence.

use crate::histogram::{price_range_histogram, PriceRangeBucket};
use ordered_float::OrderedFloat;
use sales_core::{Listing, UNKNOWN_LABEL};
use sales_query::RecordSet;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;

/// Count, mean, min, max and total of the normalized price.
///
/// All fields are 0 for an empty sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub total: f64,
    /// Sample standard deviation; 0 with fewer than two records.
    pub std_dev: f64,
}

/// Records sharing a grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: String,
    pub count: usize,
    /// Sum of normalized prices.
    pub sum: f64,
}

impl Bucket {
    fn new(key: String) -> Self {
        Self {
            key,
            count: 0,
            sum: 0.0,
        }
    }

    /// Average price in the bucket.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Fraction of `total` records falling in this bucket.
    pub fn share_of(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.count as f64 / total as f64
        }
    }
}

/// Output order for `bucket_by_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketOrder {
    /// Order in which keys first appear (time series).
    FirstSeen,
    /// Descending count, truncated to the first `n` (leaderboards).
    /// Ties keep first-seen order.
    TopByCount(usize),
}

/// Average price of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAverage {
    pub key: String,
    pub average: f64,
    pub count: usize,
}

/// Computes aggregates over borrowed records with a price accessor.
pub struct Aggregator<'a, T> {
    records: Vec<&'a T>,
    price: Box<dyn Fn(&T) -> f64 + 'a>,
}

impl<'a> Aggregator<'a, Listing> {
    /// Aggregate listings by their normalized price.
    pub fn for_listings(records: &'a RecordSet) -> Self {
        Self::new(records.iter(), |listing: &Listing| listing.price_usd)
    }
}

impl<'a, T> Aggregator<'a, T> {
    /// Create an aggregator over `records` using `price` for every metric.
    pub fn new<I, F>(records: I, price: F) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        F: Fn(&T) -> f64 + 'a,
    {
        Self {
            records: records.into_iter().collect(),
            price: Box::new(price),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Normalized prices in record order.
    pub fn prices(&self) -> Vec<f64> {
        self.records.iter().map(|&r| (self.price)(r)).collect()
    }

    /// Summary statistics of the price.
    pub fn summary_statistics(&self) -> SummaryStatistics {
        if self.records.is_empty() {
            return SummaryStatistics::default();
        }

        let prices = self.prices();
        let count = prices.len();
        let std_dev = if count < 2 {
            0.0
        } else {
            Statistics::std_dev(prices.iter())
        };

        SummaryStatistics {
            count,
            mean: Statistics::mean(prices.iter()),
            min: Statistics::min(prices.iter()),
            max: Statistics::max(prices.iter()),
            total: prices.iter().sum(),
            std_dev,
        }
    }

    /// Group records by a derived key.
    ///
    /// A `None` or empty key counts under `"Unknown"`, so bucket counts
    /// always sum to the record count (before any truncation).
    pub fn bucket_by_key<K>(&self, key_fn: K, order: BucketOrder) -> Vec<Bucket>
    where
        K: Fn(&T) -> Option<String>,
    {
        let mut buckets = self.group(key_fn);
        if let BucketOrder::TopByCount(n) = order {
            // Stable: ties keep first-seen order.
            buckets.sort_by(|a, b| b.count.cmp(&a.count));
            buckets.truncate(n);
        }
        buckets
    }

    /// Average price per group, highest first, optionally truncated.
    pub fn average_by_group<K>(&self, key_fn: K, limit: Option<usize>) -> Vec<GroupAverage>
    where
        K: Fn(&T) -> Option<String>,
    {
        let mut averages: Vec<GroupAverage> = self
            .group(key_fn)
            .into_iter()
            .map(|bucket| GroupAverage {
                average: bucket.mean(),
                count: bucket.count,
                key: bucket.key,
            })
            .collect();

        averages.sort_by_key(|g| std::cmp::Reverse(OrderedFloat(g.average)));
        if let Some(limit) = limit {
            averages.truncate(limit);
        }
        averages
    }

    /// Record counts in the five fixed price bands.
    pub fn price_range_histogram(&self) -> Vec<PriceRangeBucket> {
        price_range_histogram(self.prices())
    }

    /// Buckets in first-seen key order.
    fn group<K>(&self, key_fn: K) -> Vec<Bucket>
    where
        K: Fn(&T) -> Option<String>,
    {
        let mut buckets: Vec<Bucket> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for &record in &self.records {
            let key = key_fn(record)
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string());

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    index.insert(key.clone(), buckets.len());
                    buckets.push(Bucket::new(key));
                    buckets.len() - 1
                }
            };

            let bucket = &mut buckets[slot];
            bucket.count += 1;
            bucket.sum += (self.price)(record);
        }

        buckets
    }
}
