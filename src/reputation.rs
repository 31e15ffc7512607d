// src/reputation.rs
//! Popularity lookups for extracted references (GitHub stars, Hugging Face likes).
//!
//! Lookups never fail from the caller's point of view: any transport error,
//! timeout, non-200 status or malformed URL becomes `value = 0, fresh = false`.
//! A successful lookup of an unpopular repo is `value = 0, fresh = true`.

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::ReputationSettings;
use crate::item::ReferenceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Stars,
    Likes,
}

impl Metric {
    pub fn for_kind(kind: ReferenceKind) -> Self {
        match kind {
            ReferenceKind::Code => Metric::Stars,
            ReferenceKind::Model => Metric::Likes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationResult {
    pub metric: Metric,
    pub value: u64,
    /// True iff the remote call succeeded.
    pub fresh: bool,
}

impl ReputationResult {
    pub fn ok(metric: Metric, value: u64) -> Self {
        Self {
            metric,
            value,
            fresh: true,
        }
    }

    pub fn failed(metric: Metric) -> Self {
        Self {
            metric,
            value: 0,
            fresh: false,
        }
    }
}

/// Anything that can rate a reference. The HTTP implementation is [`HttpReputation`].
#[async_trait]
pub trait ReputationSource: Send + Sync {
    async fn lookup(&self, kind: ReferenceKind, url: &str) -> ReputationResult;
}

/// Last two non-empty path segments, e.g. `owner/repo`.
pub fn repo_path(url: &str) -> Option<(String, String)> {
    let parsed = url::Url::parse(url).ok()?;
    let segs: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segs.as_slice() {
        [.., a, b] => Some((a.to_string(), b.to_string())),
        _ => None,
    }
}

#[derive(Deserialize)]
struct RepoMeta {
    stargazers_count: Option<u64>,
    watchers_count: Option<u64>,
}

#[derive(Deserialize)]
struct ModelMeta {
    likes: Option<u64>,
}

pub struct HttpReputation {
    http: reqwest::Client,
    github_api: String,
    hf_api: String,
    github_token: Option<String>,
}

impl HttpReputation {
    pub fn new(settings: &ReputationSettings) -> Result<Self> {
        let timeout = Duration::from_millis(settings.timeout_ms);
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("building reputation http client")?;
        Ok(Self {
            http,
            github_api: settings.github_api.trim_end_matches('/').to_string(),
            hf_api: settings.hf_api.trim_end_matches('/').to_string(),
            github_token: settings.github_token.clone(),
        })
    }

    async fn github_stars(&self, owner: &str, repo: &str) -> Option<u64> {
        let api_url = format!("{}/repos/{owner}/{repo}", self.github_api);
        let mut req = self
            .http
            .get(&api_url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(tok) = &self.github_token {
            req = req.header("Authorization", format!("token {tok}"));
        }
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "reputation", error = %e, %owner, %repo, "github lookup failed");
                return None;
            }
        };
        match resp.status().as_u16() {
            200 => match resp.json::<RepoMeta>().await {
                Ok(meta) => Some(meta.stargazers_count.or(meta.watchers_count).unwrap_or(0)),
                Err(e) => {
                    tracing::warn!(target: "reputation", error = %e, %owner, %repo, "github body undecodable");
                    None
                }
            },
            403 => {
                tracing::warn!(target: "reputation", %owner, %repo, "github api rate limit exceeded");
                None
            }
            404 => {
                // private or deleted
                tracing::debug!(target: "reputation", %owner, %repo, "github repo not found");
                None
            }
            code => {
                tracing::warn!(target: "reputation", status = code, %owner, %repo, "github unexpected status");
                None
            }
        }
    }

    async fn hf_likes(&self, org: &str, name: &str) -> Option<u64> {
        let api_url = format!("{}/api/models/{org}/{name}", self.hf_api);
        let resp = match self.http.get(&api_url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "reputation", error = %e, %org, %name, "hf lookup failed");
                return None;
            }
        };
        if resp.status().as_u16() != 200 {
            tracing::debug!(target: "reputation", status = resp.status().as_u16(), %org, %name, "hf non-200");
            return None;
        }
        match resp.json::<ModelMeta>().await {
            Ok(meta) => Some(meta.likes.unwrap_or(0)),
            Err(e) => {
                tracing::warn!(target: "reputation", error = %e, %org, %name, "hf body undecodable");
                None
            }
        }
    }
}

#[async_trait]
impl ReputationSource for HttpReputation {
    async fn lookup(&self, kind: ReferenceKind, url: &str) -> ReputationResult {
        let metric = Metric::for_kind(kind);
        counter!("reputation_lookups_total").increment(1);

        let Some((a, b)) = repo_path(url) else {
            tracing::debug!(target: "reputation", %url, "reference url has no owner/name path");
            counter!("reputation_failures_total").increment(1);
            return ReputationResult::failed(metric);
        };

        let value = match kind {
            ReferenceKind::Code => self.github_stars(&a, &b).await,
            ReferenceKind::Model => self.hf_likes(&a, &b).await,
        };
        match value {
            Some(v) => ReputationResult::ok(metric, v),
            None => {
                counter!("reputation_failures_total").increment(1);
                ReputationResult::failed(metric)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_path_takes_last_two_segments() {
        assert_eq!(
            repo_path("https://github.com/openai/whisper/"),
            Some(("openai".into(), "whisper".into()))
        );
        assert_eq!(
            repo_path("https://huggingface.co/DeepSeek-AI/DeepSeek-V3"),
            Some(("DeepSeek-AI".into(), "DeepSeek-V3".into()))
        );
        assert_eq!(repo_path("https://github.com/openai"), None);
        assert_eq!(repo_path("not a url"), None);
    }

    #[test]
    fn failed_is_distinct_from_zero() {
        let zero = ReputationResult::ok(Metric::Stars, 0);
        let failed = ReputationResult::failed(Metric::Stars);
        assert_eq!(zero.value, failed.value);
        assert_ne!(zero, failed);
    }

    #[tokio::test]
    async fn malformed_url_fails_without_network() {
        let rep = HttpReputation::new(&ReputationSettings {
            github_api: "http://127.0.0.1:9".into(),
            ..ReputationSettings::default()
        })
        .unwrap();
        let r = rep.lookup(ReferenceKind::Code, "https://github.com/only-owner").await;
        assert_eq!(r, ReputationResult::failed(Metric::Stars));
    }
}
