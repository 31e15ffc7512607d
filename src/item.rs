// src/item.rs
//! The mined unit of content and the signals that explain its score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ingest::types::{RawRecord, SourceCategory};

/// Closed set of reference kinds found in item text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// Code-hosting repository (github.com/owner/repo).
    Code,
    /// Model-hosting repository (huggingface.co/org/name).
    Model,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Code => f.write_str("code"),
            ReferenceKind::Model => f.write_str("model"),
        }
    }
}

/// One human-readable explanation line and the points it contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub text: String,
    pub points: u32,
}

impl Signal {
    pub fn new(text: impl Into<String>, points: u32) -> Self {
        Self {
            text: text.into(),
            points,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Canonical source URL; the identity used for dedup.
    pub url: String,
    pub title: String,
    pub body: String,
    pub contributors: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub source: String,
    pub category: SourceCategory,
    pub references: BTreeMap<ReferenceKind, String>,
    pub channels: Vec<String>,
    pub signals: Vec<Signal>,
    pub score: u32,
}

impl Item {
    /// Fresh, unscored item built from one normalized source record.
    pub fn from_record(rec: RawRecord) -> Self {
        Self {
            url: rec.url,
            title: rec.title,
            body: rec.body,
            contributors: rec.contributors,
            published: rec.published,
            source: rec.source,
            category: rec.category,
            references: BTreeMap::new(),
            channels: Vec::new(),
            signals: Vec::new(),
            score: 0,
        }
    }

    /// Title and body joined, the text that channels and organizations match against.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }

    /// Contributors, title and body joined; authors match against this.
    pub fn author_text(&self) -> String {
        if self.contributors.is_empty() {
            return self.full_text();
        }
        format!("{} {}", self.contributors.join(", "), self.full_text())
    }

    pub fn explanations(&self) -> Vec<&str> {
        self.signals.iter().map(|s| s.text.as_str()).collect()
    }

    /// Sum of recorded signal points. Always equals `score` for an emitted item.
    pub fn recomputed_score(&self) -> u32 {
        self.signals.iter().map(|s| s.points).sum()
    }
}
