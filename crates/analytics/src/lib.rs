//! Aggregation of normalized listings into dashboard views.
//!
//! This crate provides:
//! - Summary statistics (count, mean, min, max, total, standard deviation)
//! - Grouped buckets and per-group averages
//! - Fixed price-range histogram
//! - Daily price trend with estimated profit

pub mod aggregator;
pub mod histogram;
pub mod profit;
pub mod report;
pub mod trend;

pub use aggregator::{Aggregator, Bucket, BucketOrder, GroupAverage, SummaryStatistics};
pub use histogram::{price_range_histogram, PriceRange, PriceRangeBucket};
pub use profit::estimated_profit;
pub use report::{unique_sellers, DashboardReport};
pub use trend::{price_trend, sale_day, TrendPoint};
