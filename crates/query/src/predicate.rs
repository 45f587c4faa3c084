//! Composable record filters.

use sales_core::{Column, Header, Listing};
use serde::{Deserialize, Serialize};

/// Filter value that disables a field filter.
pub const ALL_SENTINEL: &str = "all";

/// A condition selecting a subset of listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FilterPredicate {
    /// Keeps everything.
    #[default]
    MatchAll,
    /// Case-insensitive substring match against any header field.
    Search(String),
    /// Case-sensitive substring match on one field. Listings without the
    /// field are excluded.
    FieldContains { field: String, value: String },
    /// Exact match on one field.
    FieldEquals { field: String, value: String },
    /// All inner predicates must match.
    And(Vec<FilterPredicate>),
}

impl FilterPredicate {
    /// Free-text search; an empty term matches everything.
    pub fn search(term: impl Into<String>) -> Self {
        let term = term.into();
        if term.is_empty() {
            FilterPredicate::MatchAll
        } else {
            FilterPredicate::Search(term)
        }
    }

    /// Substring filter on a field, disabled by the `all` sentinel.
    pub fn field_contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if value == ALL_SENTINEL {
            FilterPredicate::MatchAll
        } else {
            FilterPredicate::FieldContains {
                field: field.into(),
                value,
            }
        }
    }

    /// Shipping-origin filter.
    pub fn region(value: impl Into<String>) -> Self {
        Self::field_contains(Column::Origin.header_name(), value)
    }

    /// Conjunction with another predicate, flattening trivial cases.
    pub fn and(self, other: FilterPredicate) -> Self {
        match (self, other) {
            (FilterPredicate::MatchAll, p) | (p, FilterPredicate::MatchAll) => p,
            (FilterPredicate::And(mut left), FilterPredicate::And(right)) => {
                left.extend(right);
                FilterPredicate::And(left)
            }
            (FilterPredicate::And(mut left), p) => {
                left.push(p);
                FilterPredicate::And(left)
            }
            (p, q) => FilterPredicate::And(vec![p, q]),
        }
    }

    /// Evaluate against a listing. `header` bounds the fields searched.
    pub fn matches(&self, listing: &Listing, header: &Header) -> bool {
        match self {
            FilterPredicate::MatchAll => true,
            FilterPredicate::Search(term) => {
                let needle = term.to_lowercase();
                listing
                    .fields(header)
                    .any(|(_, value)| value.to_lowercase().contains(&needle))
            }
            FilterPredicate::FieldContains { field, value } => listing
                .field(field)
                .is_some_and(|text| text.contains(value.as_str())),
            FilterPredicate::FieldEquals { field, value } => {
                listing.field(field).is_some_and(|text| text == value.as_str())
            }
            FilterPredicate::And(predicates) => {
                predicates.iter().all(|p| p.matches(listing, header))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> (Listing, Header) {
        let listing = Listing {
            title: Some("Vintage SEIKO Watch".to_string()),
            origin: Some("Tokyo, Japan".to_string()),
            seller: Some("shop".to_string()),
            ..Default::default()
        };
        let header = Header::new(["タイトル", "発送元", "出品者"]);
        (listing, header)
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let (listing, header) = listing();
        assert!(FilterPredicate::search("seiko").matches(&listing, &header));
        assert!(FilterPredicate::search("TOKYO").matches(&listing, &header));
        assert!(!FilterPredicate::search("casio").matches(&listing, &header));
        assert_eq!(FilterPredicate::search(""), FilterPredicate::MatchAll);
    }

    #[test]
    fn test_search_limited_to_header() {
        let (listing, _) = listing();
        let header = Header::new(["出品者"]);
        assert!(!FilterPredicate::search("seiko").matches(&listing, &header));
    }

    #[test]
    fn test_region_filter() {
        let (listing, header) = listing();
        assert!(FilterPredicate::region("Japan").matches(&listing, &header));
        assert!(!FilterPredicate::region("japan").matches(&listing, &header));
        assert_eq!(FilterPredicate::region("all"), FilterPredicate::MatchAll);
    }

    #[test]
    fn test_missing_field_excluded() {
        let (listing, header) = listing();
        let p = FilterPredicate::field_contains("送料", "");
        assert!(!p.matches(&listing, &header));
    }

    #[test]
    fn test_field_equals() {
        let (listing, header) = listing();
        let exact = FilterPredicate::FieldEquals {
            field: "出品者".to_string(),
            value: "shop".to_string(),
        };
        assert!(exact.matches(&listing, &header));

        let partial = FilterPredicate::FieldEquals {
            field: "出品者".to_string(),
            value: "sho".to_string(),
        };
        assert!(!partial.matches(&listing, &header));
    }

    #[test]
    fn test_and_composition() {
        let (listing, header) = listing();
        let p = FilterPredicate::region("Japan").and(FilterPredicate::search("watch"));
        assert!(matches!(p, FilterPredicate::And(ref inner) if inner.len() == 2));
        assert!(p.matches(&listing, &header));

        let p = p.and(FilterPredicate::search("clock"));
        assert!(matches!(p, FilterPredicate::And(ref inner) if inner.len() == 3));
        assert!(!p.matches(&listing, &header));

        let p = FilterPredicate::MatchAll.and(FilterPredicate::region("all"));
        assert_eq!(p, FilterPredicate::MatchAll);
    }
}
