//! Filtering, searching and sorting of normalized listings.
//!
//! All operations are pure: they produce new `RecordSet` views over a
//! shared, immutable snapshot.

pub mod predicate;
pub mod query;
pub mod record_set;
pub mod sort;

pub use predicate::{FilterPredicate, ALL_SENTINEL};
pub use query::ListingQuery;
pub use record_set::RecordSet;
pub use sort::{SortDirection, SortKey, SortTransform};
