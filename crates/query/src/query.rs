//! Explicit view state: search term, region filter and sort key.

use crate::predicate::{FilterPredicate, ALL_SENTINEL};
use crate::record_set::RecordSet;
use crate::sort::SortKey;
use sales_core::config::QueryConfig;
use sales_core::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The current table view: which listings are shown and in what order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Free-text search term.
    pub search: String,
    /// Shipping-origin filter value; `"all"` disables it.
    pub region: String,
    /// Sort key; `None` keeps input order.
    pub sort: Option<SortKey>,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            region: ALL_SENTINEL.to_string(),
            sort: Some(SortKey::default()),
        }
    }
}

impl ListingQuery {
    /// Build from configuration; fails on a malformed sort key.
    pub fn from_config(config: &QueryConfig) -> Result<Self> {
        let sort = match config.sort.trim() {
            "" => None,
            text => Some(text.parse::<SortKey>()?),
        };
        Ok(Self {
            search: config.search.clone(),
            region: config.region.clone(),
            sort,
        })
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_sort(mut self, sort: Option<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    /// Combined filter for the region and search term.
    pub fn predicate(&self) -> FilterPredicate {
        FilterPredicate::region(self.region.as_str())
            .and(FilterPredicate::search(self.search.as_str()))
    }

    /// Apply region filter, then search, then sort.
    pub fn apply(&self, records: &RecordSet) -> RecordSet {
        let filtered = records.filter(&self.predicate());
        let view = match &self.sort {
            Some(key) => filtered.sort_by(key),
            None => filtered,
        };

        debug!(
            input = records.len(),
            output = view.len(),
            search = %self.search,
            region = %self.region,
            "Applied listing query"
        );
        view
    }
}
