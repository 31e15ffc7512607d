// src/config.rs
//! Run configuration: watchlist, channels, sources and pipeline tunables.
//!
//! Loaded once per process from TOML into an immutable [`RadarConfig`] that is
//! handed to every component that needs it (wrap it in an `Arc` to share).
//!
//! Path resolution:
//! 1) `$RADAR_CONFIG_PATH` (must exist)
//! 2) `config/radar.toml`
//! 3) built-in empty defaults
//!
//! Environment overrides applied after parsing: `GITHUB_TOKEN`, `RADAR_MIN_SCORE`.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::channels::Channel;
use crate::analyze::watchlist::WatchlistEntry;
use crate::ingest::types::{Source, SourceCategory};

pub const DEFAULT_CONFIG_PATH: &str = "config/radar.toml";
pub const ENV_CONFIG_PATH: &str = "RADAR_CONFIG_PATH";
pub const ENV_MIN_SCORE: &str = "RADAR_MIN_SCORE";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

pub const DEFAULT_PAPER_QUERY: &str = "cat:cs.CL OR cat:cs.AI OR cat:cs.CV OR cat:cs.LG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadarConfig {
    #[serde(default)]
    pub mining: MiningSettings,
    #[serde(default)]
    pub reputation: ReputationSettings,
    #[serde(default)]
    pub authors: Vec<WatchlistEntry>,
    #[serde(default)]
    pub organizations: Vec<WatchlistEntry>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MiningSettings {
    /// Upper bound on concurrent remote calls within one run.
    pub max_in_flight: usize,
    /// Per-source fetch timeout.
    pub source_timeout_ms: u64,
    pub paper_query: String,
    pub paper_max_results: usize,
    /// Caller-side digest view: minimum score and number of items.
    pub min_score: u32,
    pub top_n: usize,
    pub safety_keywords: Vec<String>,
}

impl Default for MiningSettings {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            source_timeout_ms: 15_000,
            paper_query: DEFAULT_PAPER_QUERY.to_string(),
            paper_max_results: 50,
            min_score: 40,
            top_n: 5,
            safety_keywords: [
                "safety",
                "alignment",
                "risk",
                "red team",
                "preparedness",
                "superalignment",
                "policy",
                "societal",
                "governance",
                "audit",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReputationSettings {
    pub timeout_ms: u64,
    pub github_api: String,
    pub hf_api: String,
    pub user_agent: String,
    /// Never read from the file; only from `$GITHUB_TOKEN`.
    #[serde(skip)]
    pub github_token: Option<String>,
}

impl Default for ReputationSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            github_api: "https://api.github.com".to_string(),
            hf_api: "https://huggingface.co".to_string(),
            user_agent: "trend-radar/0.1".to_string(),
            github_token: None,
        }
    }
}

impl RadarConfig {
    /// Parse from a TOML string and clean up blank entries.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: RadarConfig = toml::from_str(s).context("parsing radar config toml")?;
        cfg.clean();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading radar config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolve the config path from the environment, load it and apply env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                tracing::warn!(path = DEFAULT_CONFIG_PATH, "no radar config found, using defaults");
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        self.reputation.github_token = std::env::var(ENV_GITHUB_TOKEN)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(ms) = parse_min_score_env(std::env::var(ENV_MIN_SCORE).ok()) {
            self.mining.min_score = ms;
        }
    }

    pub fn sources_for(&self, category: SourceCategory) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(move |s| s.category == category)
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    fn clean(&mut self) {
        for list in [&mut self.authors, &mut self.organizations] {
            list.iter_mut().for_each(|e| e.name = e.name.trim().to_string());
            list.retain(|e| !e.name.is_empty());
        }
        for ch in &mut self.channels {
            ch.keywords = ch
                .keywords
                .iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
        self.sources.retain(|s| !s.url.trim().is_empty());
        self.mining.max_in_flight = self.mining.max_in_flight.max(1);
    }
}

fn parse_min_score_env(raw: Option<String>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    const SAMPLE: &str = r#"
[mining]
max_in_flight = 4
paper_max_results = 20

[[authors]]
name = " Ada Lovelace "
weight = 10

[[authors]]
name = ""

[[organizations]]
name = "DeepMind"

[[channels]]
name = "Agents"
description = "Tool use and autonomy"
keywords = ["agent", " ", "tool use"]

[[sources]]
name = "arXiv"
url = "http://export.arxiv.org/api/query"
category = "paper"

[[sources]]
name = "r/LocalLLaMA"
url = "https://www.reddit.com/r/LocalLLaMA/.rss"
category = "community"
"#;

    #[test]
    fn parses_and_cleans_sample() {
        let cfg = RadarConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(cfg.mining.max_in_flight, 4);
        assert_eq!(cfg.mining.paper_max_results, 20);
        // untouched defaults survive partial sections
        assert_eq!(cfg.mining.min_score, 40);
        assert_eq!(cfg.mining.paper_query, DEFAULT_PAPER_QUERY);
        assert_eq!(cfg.authors.len(), 1);
        assert_eq!(cfg.authors[0].name, "Ada Lovelace");
        assert_eq!(cfg.authors[0].weight, Some(10));
        assert_eq!(cfg.channels[0].keywords, vec!["agent", "tool use"]);
        assert_eq!(cfg.sources_for(SourceCategory::Paper).count(), 1);
        assert_eq!(cfg.sources_for(SourceCategory::Media).count(), 0);
    }

    #[test]
    fn empty_document_is_default() {
        let cfg = RadarConfig::from_toml_str("").unwrap();
        assert!(!cfg.has_sources());
        assert_eq!(cfg.reputation.timeout_ms, 5_000);
    }

    #[test]
    fn min_score_env_parsing() {
        assert_eq!(parse_min_score_env(Some(" 60 ".into())), Some(60));
        assert_eq!(parse_min_score_env(Some("abc".into())), None);
        assert_eq!(parse_min_score_env(None), None);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_MIN_SCORE);

        // nothing on disk -> defaults
        let cfg = RadarConfig::load_default().unwrap();
        assert!(!cfg.has_sources());

        let p = tmp.path().join("custom.toml");
        fs::write(&p, SAMPLE).unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_MIN_SCORE, "75");
        let cfg = RadarConfig::load_default().unwrap();
        assert_eq!(cfg.sources.len(), 2);
        assert_eq!(cfg.mining.min_score, 75);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(RadarConfig::load_default().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_MIN_SCORE);
        env::set_current_dir(&old).unwrap();
    }
}
