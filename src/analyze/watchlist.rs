// src/analyze/watchlist.rs
//! Watchlist matching for high-value authors and organizations.
//!
//! Matching is a case-insensitive substring test, so "Ilya" hits
//! "Ilya Sutskever mentioned ...". Short names can produce false positives;
//! configure full names where that matters.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchlistEntry {
    pub name: String,
    /// Informational; scoring uses flat per-kind points.
    #[serde(default)]
    pub weight: Option<i32>,
}

impl WatchlistEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: None,
        }
    }
}

/// Entries whose name occurs in `text`, in configuration order.
pub fn match_entries<'a>(text: &str, entries: &'a [WatchlistEntry]) -> Vec<&'a WatchlistEntry> {
    let haystack = text.to_lowercase();
    entries
        .iter()
        .filter(|e| !e.name.is_empty() && haystack.contains(&e.name.to_lowercase()))
        .collect()
}

/// Authors and organizations found in one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchlistHits {
    pub authors: Vec<WatchlistEntry>,
    pub organizations: Vec<WatchlistEntry>,
}
