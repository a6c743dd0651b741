//! Routes, hops and the sentence index they are annotated from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::address::Address;
use crate::format::RouteFormatter;

/// Maps each discovered address to the context sentence of the first link
/// that pointed at it. Entries are never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceIndex {
    sentences: HashMap<Address, String>,
}

impl SentenceIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `sentence` for `address` unless one is already present.
    ///
    /// Returns `true` when the sentence was stored.
    pub fn record(&mut self, address: &Address, sentence: impl Into<String>) -> bool {
        if self.sentences.contains_key(address) {
            return false;
        }
        self.sentences.insert(address.clone(), sentence.into());
        true
    }

    /// Gets the sentence recorded for an address.
    #[must_use]
    pub fn get(&self, address: &Address) -> Option<&str> {
        self.sentences.get(address).map(String::as_str)
    }

    /// Number of indexed addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// One step of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    /// 1-based position in the route.
    pub position: usize,
    /// The page reached by this hop.
    pub address: Address,
    /// The sentence that contained the link, when one was recorded.
    pub sentence: Option<String>,
}

/// Counters collected while searching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Pages fetched and parsed.
    pub pages_expanded: usize,
    /// In-scope links returned by all expansions.
    pub links_discovered: usize,
    /// Expansions that failed to fetch.
    pub dead_ends: usize,
    /// Popped entries discarded as visited or over-depth.
    pub entries_pruned: usize,
    /// Wall-clock duration of the search.
    pub elapsed_ms: f64,
    /// When the search finished.
    pub completed_at: DateTime<Utc>,
}

impl Default for SearchStats {
    fn default() -> Self {
        Self {
            pages_expanded: 0,
            links_discovered: 0,
            dead_ends: 0,
            entries_pruned: 0,
            elapsed_ms: 0.0,
            completed_at: Utc::now(),
        }
    }
}

/// A discovered route from a start page to a target page.
///
/// The start page itself is not a hop: a route whose start equals its target
/// has no hops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Where the search began.
    pub start: Address,
    /// The page that was searched for.
    pub target: Address,
    /// Hops in order, ending at the target.
    pub hops: Vec<Hop>,
    /// Search counters.
    pub stats: SearchStats,
}

impl Route {
    /// Assembles a route from a path and the sentences recorded during the
    /// search.
    #[must_use]
    pub fn from_path(
        start: Address,
        target: Address,
        path: &[Address],
        index: &SentenceIndex,
        stats: SearchStats,
    ) -> Self {
        let hops = path
            .iter()
            .enumerate()
            .map(|(i, address)| Hop {
                position: i + 1,
                address: address.clone(),
                sentence: index.get(address).map(String::from),
            })
            .collect();

        Self {
            start,
            target,
            hops,
            stats,
        }
    }

    /// Number of hops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Whether the start was already the target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// The addresses of every hop, in order.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.hops.iter().map(|hop| &hop.address)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&RouteFormatter::new().format(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(title: &str) -> Address {
        Address::parse(&format!("https://en.wikipedia.org/wiki/{title}")).unwrap()
    }

    #[test]
    fn test_sentence_index_first_write_wins() {
        let mut index = SentenceIndex::new();
        assert!(index.record(&addr("C"), "X links to C."));
        assert!(!index.record(&addr("C"), "B links to C."));

        assert_eq!(index.get(&addr("C")), Some("X links to C."));
        assert_eq!(index.len(), 1);
        assert!(index.get(&addr("D")).is_none());
    }

    #[test]
    fn test_route_from_path_numbers_hops() {
        let mut index = SentenceIndex::new();
        index.record(&addr("B"), "See B for details.");

        let route = Route::from_path(
            addr("A"),
            addr("C"),
            &[addr("B"), addr("C")],
            &index,
            SearchStats::default(),
        );

        assert_eq!(route.len(), 2);
        assert_eq!(route.hops[0].position, 1);
        assert_eq!(route.hops[0].sentence.as_deref(), Some("See B for details."));
        assert_eq!(route.hops[1].position, 2);
        assert!(route.hops[1].sentence.is_none());
        assert_eq!(route.addresses().cloned().collect::<Vec<_>>(), vec![addr("B"), addr("C")]);
    }

    #[test]
    fn test_empty_route() {
        let route = Route::from_path(addr("A"), addr("A"), &[], &SentenceIndex::new(), SearchStats::default());
        assert!(route.is_empty());
        assert_eq!(route.to_string(), "");
    }

    #[test]
    fn test_route_serializes_to_json() {
        let mut index = SentenceIndex::new();
        index.record(&addr("B"), "See B for details.");
        let route = Route::from_path(addr("A"), addr("B"), &[addr("B")], &index, SearchStats::default());

        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(value["start"], "https://en.wikipedia.org/wiki/A");
        assert_eq!(value["hops"][0]["position"], 1);
        assert_eq!(value["hops"][0]["sentence"], "See B for details.");
        assert_eq!(value["stats"]["pages_expanded"], 0);
    }
}
