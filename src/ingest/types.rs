// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing/grouping label of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCategory {
    Paper,
    Official,
    Media,
    Tools,
    Community,
    Safety,
    Interview,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 7] = [
        SourceCategory::Paper,
        SourceCategory::Official,
        SourceCategory::Media,
        SourceCategory::Tools,
        SourceCategory::Community,
        SourceCategory::Safety,
        SourceCategory::Interview,
    ];

    /// Default number of entries kept per feed of this category.
    pub fn default_item_cap(self) -> usize {
        match self {
            SourceCategory::Official => 2,
            SourceCategory::Media | SourceCategory::Tools => 1,
            SourceCategory::Community => 8,
            SourceCategory::Safety => 10,
            SourceCategory::Interview => 20,
            // bounded by the query's max results instead
            SourceCategory::Paper => usize::MAX,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceCategory::Paper => "paper",
            SourceCategory::Official => "official",
            SourceCategory::Media => "media",
            SourceCategory::Tools => "tools",
            SourceCategory::Community => "community",
            SourceCategory::Safety => "safety",
            SourceCategory::Interview => "interview",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured remote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    pub category: SourceCategory,
    /// Overrides the category's default per-feed cap.
    #[serde(default)]
    pub item_cap: Option<usize>,
    /// Dedicated sources skip the category keyword filter (safety).
    #[serde(default)]
    pub dedicated: bool,
}

impl Source {
    pub fn item_cap(&self) -> usize {
        self.item_cap
            .unwrap_or_else(|| self.category.default_item_cap())
    }
}

/// One remote record normalized to the common shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub title: String,
    pub body: String,
    pub contributors: Vec<String>,
    pub url: String,
    pub published: Option<DateTime<Utc>>,
    pub source: String,
    pub category: SourceCategory,
}

/// Fetch one remote source and normalize its native records.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>>;
    fn name(&self) -> &str;
    fn category(&self) -> SourceCategory;
}
