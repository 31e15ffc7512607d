// src/analyze/channels.rs
//! Topic tagging by named keyword groups. Tags never affect the score.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Names of channels with at least one keyword in `text`, in configuration order.
pub fn tag_channels(text: &str, channels: &[Channel]) -> Vec<String> {
    let haystack = text.to_lowercase();
    channels
        .iter()
        .filter(|ch| {
            ch.keywords
                .iter()
                .any(|kw| !kw.is_empty() && haystack.contains(&kw.to_lowercase()))
        })
        .map(|ch| ch.name.clone())
        .collect()
}
