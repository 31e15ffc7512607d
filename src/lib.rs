// src/lib.rs
//! Mining, enrichment and scoring pipeline for fast-moving technical news.
//!
//! Sources (a paper index and syndication feeds) are fetched concurrently,
//! normalized into [`item::Item`]s, enriched with code/model reputation,
//! matched against a watchlist and topic channels, scored, deduplicated and
//! ranked. Every score is the sum of its explanation lines.

pub mod analyze;
pub mod config;
pub mod ingest;
pub mod item;
pub mod mining;
pub mod rank;
pub mod reputation;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::RadarConfig;
pub use crate::item::{Item, ReferenceKind, Signal};
pub use crate::mining::{Miner, MiningError, RunReport};
pub use crate::reputation::{Metric, ReputationResult, ReputationSource};
pub use tokio_util::sync::CancellationToken;
