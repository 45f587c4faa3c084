//! Immutable views over a snapshot of listings.

use crate::predicate::FilterPredicate;
use crate::sort::SortKey;
use sales_core::{Header, Listing, Snapshot};
use std::sync::Arc;

/// A filtered and ordered view over shared listings.
///
/// Operations return a new view and never touch the backing listings, so
/// views compose in any order and can be shared between readers.
#[derive(Debug, Clone)]
pub struct RecordSet {
    header: Arc<Header>,
    source: Arc<[Listing]>,
    rows: Vec<usize>,
}

impl RecordSet {
    /// View every listing of a snapshot in input order.
    pub fn new(snapshot: &Snapshot) -> Self {
        Self {
            header: snapshot.header().clone(),
            source: snapshot.listings().clone(),
            rows: (0..snapshot.len()).collect(),
        }
    }

    /// A view with no listings.
    pub fn empty() -> Self {
        Self::new(&Snapshot::empty())
    }

    /// Column names of the underlying snapshot.
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Listing at a view position.
    pub fn get(&self, index: usize) -> Option<&Listing> {
        self.rows.get(index).map(|&row| &self.source[row])
    }

    /// Listings in view order.
    pub fn iter(&self) -> impl Iterator<Item = &Listing> + '_ {
        self.rows.iter().map(move |&row| &self.source[row])
    }

    /// Keep listings where any field contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Self {
        self.filter(&FilterPredicate::search(term))
    }

    /// Keep listings whose `field` contains `value`; `"all"` keeps everything.
    pub fn filter_by_field(&self, field: &str, value: &str) -> Self {
        self.filter(&FilterPredicate::field_contains(field, value))
    }

    /// Keep listings matching a predicate.
    pub fn filter(&self, predicate: &FilterPredicate) -> Self {
        if matches!(predicate, FilterPredicate::MatchAll) {
            return self.clone();
        }

        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&row| predicate.matches(&self.source[row], &self.header))
            .collect();
        self.with_rows(rows)
    }

    /// Stable sort by a key; equal keys keep their current relative order.
    pub fn sort_by(&self, key: &SortKey) -> Self {
        let mut keyed: Vec<_> = self
            .rows
            .iter()
            .map(|&row| (key.extract(&self.source[row]), row))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| key.orient(a.cmp(b)));

        self.with_rows(keyed.into_iter().map(|(_, row)| row).collect())
    }

    /// Copy the listings of this view out.
    pub fn to_vec(&self) -> Vec<Listing> {
        self.iter().cloned().collect()
    }

    fn with_rows(&self, rows: Vec<usize>) -> Self {
        Self {
            header: self.header.clone(),
            source: self.source.clone(),
            rows,
        }
    }
}

impl From<&Snapshot> for RecordSet {
    fn from(snapshot: &Snapshot) -> Self {
        Self::new(snapshot)
    }
}

impl From<Snapshot> for RecordSet {
    fn from(snapshot: Snapshot) -> Self {
        Self::new(&snapshot)
    }
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Listing;
    type IntoIter = Box<dyn Iterator<Item = &'a Listing> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{SortDirection, SortTransform};
    use sales_ingestion::ingest;

    const CSV: &str = "タイトル,出品者,発送元,価格(USD),販売日時\n\
        Seiko 5,alpha,\"Tokyo, Japan\",120,2024-03-02 10:00:00\n\
        Casio F91W,beta,USA,15,2024-03-01 09:00:00\n\
        Citizen,alpha,\"Osaka, Japan\",80,unknown\n\
        Orient Bambino,gamma,Germany,80,2024-03-03 12:00:00\n\
        Seiko Presage,delta,\"Nagoya, Japan\",300,2024-02-28\n";

    fn record_set() -> RecordSet {
        RecordSet::from(ingest(Some(CSV)))
    }

    fn titles(set: &RecordSet) -> Vec<String> {
        set.iter().filter_map(|l| l.title.clone()).collect()
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let set = record_set();
        let found = set.search("");
        assert_eq!(found.len(), 5);
        assert_eq!(titles(&found), titles(&set));
    }

    #[test]
    fn test_search_any_field() {
        let set = record_set();
        assert_eq!(titles(&set.search("SEIKO")), vec!["Seiko 5", "Seiko Presage"]);
        assert_eq!(titles(&set.search("alpha")), vec!["Seiko 5", "Citizen"]);
        assert_eq!(titles(&set.search("300")), vec!["Seiko Presage"]);
        assert!(set.search("rolex").is_empty());
    }

    #[test]
    fn test_filter_by_field() {
        let set = record_set();
        let japan = set.filter_by_field("発送元", "Japan");
        assert_eq!(japan.len(), 3);
        assert_eq!(set.filter_by_field("発送元", "all").len(), 5);
        assert!(set.filter_by_field("存在しない", "x").is_empty());
    }

    #[test]
    fn test_sort_reversal_and_stability() {
        let set = record_set();
        let asc = set.sort_by(&SortKey::price(SortDirection::Ascending));
        let desc = set.sort_by(&SortKey::price(SortDirection::Descending));

        assert_eq!(
            titles(&asc),
            vec!["Casio F91W", "Citizen", "Orient Bambino", "Seiko 5", "Seiko Presage"]
        );
        // Ties (80) keep input order in both directions.
        assert_eq!(
            titles(&desc),
            vec!["Seiko Presage", "Seiko 5", "Citizen", "Orient Bambino", "Casio F91W"]
        );
    }

    #[test]
    fn test_unparseable_date_sorts_earliest() {
        let set = record_set();
        let sorted = set.sort_by(&SortKey::date(SortDirection::Ascending));
        assert_eq!(
            titles(&sorted),
            vec!["Citizen", "Seiko Presage", "Casio F91W", "Seiko 5", "Orient Bambino"]
        );

        let latest = set.sort_by(&SortKey::default());
        assert_eq!(latest.get(0).and_then(|l| l.title.as_deref()), Some("Orient Bambino"));
        assert_eq!(latest.get(4).and_then(|l| l.title.as_deref()), Some("Citizen"));
    }

    #[test]
    fn test_profit_sort_follows_price() {
        let set = record_set();
        let by_profit = set.sort_by(&"profit:desc".parse().unwrap());
        let by_price = set.sort_by(&SortKey::price(SortDirection::Descending));
        assert_eq!(titles(&by_profit), titles(&by_price));
        assert_eq!(titles(&by_profit)[0], "Seiko Presage");
    }

    #[test]
    fn test_lexicographic_sort() {
        let set = record_set();
        let by_title = set.sort_by(&"title:asc".parse().unwrap());
        assert_eq!(titles(&by_title)[0], "Casio F91W");

        // Text comparison of the price column: "120" < "15" < "300" < "80".
        let by_text = set.sort_by(
            &SortKey::price(SortDirection::Ascending).with_transform(SortTransform::Lexicographic),
        );
        assert_eq!(titles(&by_text)[0], "Seiko 5");
        assert_eq!(titles(&by_text)[4], "Orient Bambino");
    }

    #[test]
    fn test_composition_leaves_source_untouched() {
        let set = record_set();
        let view = set
            .sort_by(&SortKey::price(SortDirection::Descending))
            .filter_by_field("発送元", "Japan")
            .search("seiko");
        assert_eq!(titles(&view), vec!["Seiko Presage", "Seiko 5"]);

        let other_order = set
            .search("seiko")
            .filter_by_field("発送元", "Japan")
            .sort_by(&SortKey::price(SortDirection::Descending));
        assert_eq!(titles(&other_order), titles(&view));

        assert_eq!(set.len(), 5);
        assert_eq!(set.get(0).and_then(|l| l.title.as_deref()), Some("Seiko 5"));
    }

    #[test]
    fn test_empty_set() {
        let set = RecordSet::empty();
        assert!(set.search("x").is_empty());
        assert!(set.sort_by(&SortKey::default()).is_empty());
        assert!(set.get(0).is_none());
    }
}
