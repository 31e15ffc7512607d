// src/analyze/mod.rs
//! Analysis pass: watchlist match, channel tags and scoring for one item.
//!
//! Everything here is synchronous and side-effect free; reputation results are
//! fetched beforehand and passed in.

pub mod channels;
pub mod links;
pub mod scoring;
pub mod watchlist;

use crate::config::RadarConfig;
use crate::item::Item;

pub use crate::analyze::channels::{tag_channels, Channel};
pub use crate::analyze::links::extract_references;
pub use crate::analyze::scoring::{score, ReputationMap, ScoreCard};
pub use crate::analyze::watchlist::{match_entries, WatchlistEntry, WatchlistHits};

/// Watchlist hits for an item: authors against contributors+text, organizations against text.
pub fn watchlist_hits(item: &Item, cfg: &RadarConfig) -> WatchlistHits {
    WatchlistHits {
        authors: match_entries(&item.author_text(), &cfg.authors)
            .into_iter()
            .cloned()
            .collect(),
        organizations: match_entries(&item.full_text(), &cfg.organizations)
            .into_iter()
            .cloned()
            .collect(),
    }
}

/// Order: watchlist match -> channel tag -> score. Returns the hits for category filters.
pub fn analyze_item(item: &mut Item, reputation: &ReputationMap, cfg: &RadarConfig) -> WatchlistHits {
    let hits = watchlist_hits(item, cfg);
    let channels = tag_channels(&item.full_text(), &cfg.channels);
    scoring::apply(item, reputation, &hits, channels);
    hits
}
