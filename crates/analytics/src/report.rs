//! Dashboard report assembled for the presentation layer.

use crate::aggregator::{Aggregator, Bucket, BucketOrder, GroupAverage, SummaryStatistics};
use crate::histogram::PriceRangeBucket;
use crate::profit::estimated_profit;
use crate::trend::{price_trend, TrendPoint};
use sales_core::config::AnalyticsConfig;
use sales_core::Listing;
use sales_query::RecordSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Every aggregate view of one record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub summary: SummaryStatistics,
    pub unique_sellers: usize,
    /// Estimated profit on the total normalized price.
    pub estimated_profit: f64,
    pub price_ranges: Vec<PriceRangeBucket>,
    /// Sellers by sale count.
    pub top_sellers: Vec<Bucket>,
    /// Shipping origins by average price.
    pub region_averages: Vec<GroupAverage>,
    pub trend: Vec<TrendPoint>,
}

impl DashboardReport {
    /// Build the report; an empty record set yields zeros and empty lists.
    pub fn build(records: &RecordSet, config: &AnalyticsConfig) -> Self {
        let aggregator = Aggregator::for_listings(records);
        let summary = aggregator.summary_statistics();

        let report = Self {
            summary,
            unique_sellers: unique_sellers(records),
            estimated_profit: estimated_profit(summary.total, config.profit_margin_pct),
            price_ranges: aggregator.price_range_histogram(),
            top_sellers: aggregator
                .bucket_by_key(seller_key, BucketOrder::TopByCount(config.top_sellers)),
            region_averages: aggregator.average_by_group(region_key, Some(config.top_regions)),
            trend: price_trend(records, config.profit_margin_pct),
        };

        debug!(
            listings = report.summary.count,
            sellers = report.unique_sellers,
            trend_points = report.trend.len(),
            "Built dashboard report"
        );
        report
    }
}

fn seller_key(listing: &Listing) -> Option<String> {
    listing.seller_name().map(str::to_string)
}

fn region_key(listing: &Listing) -> Option<String> {
    listing.origin.clone()
}

/// Number of distinct non-empty seller names.
pub fn unique_sellers(records: &RecordSet) -> usize {
    records
        .iter()
        .filter_map(Listing::seller_name)
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::PriceRange;
    use approx::assert_relative_eq;
    use sales_core::logging::init_test_logging;
    use sales_ingestion::ingest;
    use sales_query::ListingQuery;

    const EXPORT: &str = "タイトル,出品者,発送元,価格(USD),価格(表示),送料,販売日時\n\
        Seiko 5,alpha,\"Tokyo, Japan\",120,\"18,000円\",\"1,500円\",2024-03-01 10:00:00\n\
        Casio F91W,beta,USA,15,15.00,5,2024-03-01 12:00:00\n\
        Citizen,alpha,\"Tokyo, Japan\",80,\"12,000円\",0,2024-03-02 09:00:00\n\
        Orient,,Germany,600,600.00,20,2024-03-02 11:00:00\n\
        Grand Seiko,gamma,,3000,\"450,000円\",\"3,000円\",not recorded\n";

    #[test]
    fn test_full_report() {
        init_test_logging();
        let set = RecordSet::from(ingest(Some(EXPORT)));
        let report = DashboardReport::build(&set, &AnalyticsConfig::default());

        assert_eq!(report.summary.count, 5);
        assert_relative_eq!(report.summary.total, 3815.0);
        assert_relative_eq!(report.summary.mean, 763.0);
        assert_relative_eq!(report.summary.min, 15.0);
        assert_relative_eq!(report.summary.max, 3000.0);
        assert_relative_eq!(report.estimated_profit, 1144.5, epsilon = 1e-9);
        assert_eq!(report.unique_sellers, 3);

        let counts: Vec<(PriceRange, usize)> =
            report.price_ranges.iter().map(|b| (b.range, b.count)).collect();
        assert_eq!(
            counts,
            vec![
                (PriceRange::UpTo50, 1),
                (PriceRange::UpTo100, 1),
                (PriceRange::UpTo200, 1),
                (PriceRange::UpTo500, 0),
                (PriceRange::Over500, 2),
            ]
        );

        let sellers: Vec<(&str, usize)> = report
            .top_sellers
            .iter()
            .map(|b| (b.key.as_str(), b.count))
            .collect();
        assert_eq!(
            sellers,
            vec![("alpha", 2), ("beta", 1), ("Unknown", 1), ("gamma", 1)]
        );

        let regions: Vec<&str> = report.region_averages.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(regions, vec!["Unknown", "Germany", "Tokyo, Japan", "USA"]);
        assert_relative_eq!(report.region_averages[2].average, 100.0);

        let days: Vec<&str> = report.trend.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(days, vec!["2024-03-01", "2024-03-02", "not recorded"]);
    }

    #[test]
    fn test_limits_from_config() {
        let set = RecordSet::from(ingest(Some(EXPORT)));
        let config = AnalyticsConfig {
            top_sellers: 1,
            top_regions: 2,
            ..Default::default()
        };
        let report = DashboardReport::build(&set, &config);
        assert_eq!(report.top_sellers.len(), 1);
        assert_eq!(report.top_sellers[0].key, "alpha");
        assert_eq!(report.region_averages.len(), 2);
    }

    #[test]
    fn test_report_on_filtered_view() {
        let set = RecordSet::from(ingest(Some(EXPORT)));
        let view = ListingQuery::default().with_region("Japan").apply(&set);
        let report = DashboardReport::build(&view, &AnalyticsConfig::default());

        assert_eq!(report.summary.count, 2);
        assert_eq!(report.unique_sellers, 1);
        // Default sort is newest first.
        assert_eq!(report.trend[0].date, "2024-03-02");
    }

    #[test]
    fn test_empty_report() {
        let report = DashboardReport::build(&RecordSet::empty(), &AnalyticsConfig::default());
        assert_eq!(report.summary, SummaryStatistics::default());
        assert_eq!(report.unique_sellers, 0);
        assert_eq!(report.estimated_profit, 0.0);
        assert_eq!(report.price_ranges.len(), 5);
        assert!(report.top_sellers.is_empty());
        assert!(report.region_averages.is_empty());
        assert!(report.trend.is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let set = RecordSet::from(ingest(Some(EXPORT)));
        let report = DashboardReport::build(&set, &AnalyticsConfig::default());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["count"], 5);
        assert_eq!(json["price_ranges"][4]["range"], "501+");
        assert_eq!(json["top_sellers"][0]["key"], "alpha");

        let back: DashboardReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
