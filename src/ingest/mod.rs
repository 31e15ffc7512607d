// src/ingest/mod.rs
pub mod providers;
pub mod types;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RadarConfig;
use crate::ingest::providers::{arxiv::ArxivAdapter, feed::FeedAdapter};
use crate::ingest::types::{Source, SourceAdapter, SourceCategory};

/// Longest body kept after normalization, in chars.
pub const MAX_TEXT_CHARS: usize = 1500;

/// Normalize feed/API text: keep link targets, strip HTML, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Anchors become their href so reference extraction still sees the URL
    static RE_ANCHOR: OnceCell<Regex> = OnceCell::new();
    let re_anchor = RE_ANCHOR.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>"#).unwrap()
    });
    out = re_anchor.replace_all(&out, " $1 ").to_string();

    // 3) Strip remaining tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 4) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 5) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }
    out
}

/// True when a safety-category record should be kept: dedicated sources keep
/// everything, general ones only records mentioning a safety keyword.
pub fn passes_safety_filter(source: &Source, text: &str, keywords: &[String]) -> bool {
    if source.dedicated {
        return true;
    }
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .any(|k| !k.is_empty() && haystack.contains(&k.to_lowercase()))
}

/// Shared HTTP client for source endpoints.
pub fn source_client(cfg: &RadarConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.reputation.user_agent.clone())
        .timeout(Duration::from_millis(cfg.mining.source_timeout_ms))
        .build()
        .context("building source http client")
}

/// One adapter per configured source, optionally restricted to a category.
/// Order follows the configuration, which fixes the dedup precedence.
pub fn build_adapters(
    cfg: &Arc<RadarConfig>,
    only: Option<SourceCategory>,
) -> Result<Vec<Box<dyn SourceAdapter>>> {
    let client = source_client(cfg)?;
    let adapters = cfg
        .sources
        .iter()
        .filter(|s| only.map_or(true, |c| s.category == c))
        .map(|s| -> Box<dyn SourceAdapter> {
            match s.category {
                SourceCategory::Paper => Box::new(ArxivAdapter::from_url(
                    s.clone(),
                    client.clone(),
                    cfg.mining.paper_query.clone(),
                    cfg.mining.paper_max_results,
                )),
                _ => Box::new(FeedAdapter::from_url(
                    s.clone(),
                    client.clone(),
                    cfg.mining.safety_keywords.clone(),
                )),
            }
        })
        .collect();
    Ok(adapters)
}
