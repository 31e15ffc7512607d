use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use super::parse_timestamp;
use crate::ingest::normalize_text;
use crate::ingest::types::{RawRecord, Source, SourceAdapter, SourceCategory};

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: Option<String>,
}

/// Paper-index adapter: one search query per run, newest submissions first.
pub struct ArxivAdapter {
    source: Source,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        query: String,
        max_results: usize,
    },
}

impl ArxivAdapter {
    pub fn from_fixture(source: Source, xml: &str) -> Self {
        Self {
            source,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(source: Source, client: reqwest::Client, query: String, max_results: usize) -> Self {
        Self {
            source,
            mode: Mode::Http {
                client,
                query,
                max_results,
            },
        }
    }

    fn parse_records(&self, xml: &str) -> Result<Vec<RawRecord>> {
        let t0 = std::time::Instant::now();
        let feed: AtomFeed = from_str(xml).context("parsing arxiv atom xml")?;

        let mut out = Vec::with_capacity(feed.entries.len());
        for e in feed.entries {
            let url = e.id.as_deref().map(str::trim).unwrap_or_default().to_string();
            if url.is_empty() {
                tracing::debug!(target: "ingest", source = %self.source.name, "arxiv entry without id skipped");
                continue;
            }
            out.push(RawRecord {
                title: normalize_text(e.title.as_deref().unwrap_or_default()),
                body: normalize_text(e.summary.as_deref().unwrap_or_default()),
                contributors: e
                    .authors
                    .into_iter()
                    .filter_map(|a| a.name)
                    .map(|n| normalize_text(&n))
                    .filter(|n| !n.is_empty())
                    .collect(),
                url,
                published: e
                    .published
                    .or(e.updated)
                    .as_deref()
                    .and_then(parse_timestamp),
                source: self.source.name.clone(),
                category: SourceCategory::Paper,
            });
        }

        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("mining_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for ArxivAdapter {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        match &self.mode {
            Mode::Fixture(xml) => self.parse_records(xml),
            Mode::Http {
                client,
                query,
                max_results,
            } => {
                let max = max_results.to_string();
                tracing::info!(target: "ingest", source = %self.source.name, max_results, "querying paper index");
                let body = client
                    .get(&self.source.url)
                    .query(&[
                        ("search_query", query.as_str()),
                        ("start", "0"),
                        ("max_results", max.as_str()),
                        ("sortBy", "submittedDate"),
                        ("sortOrder", "descending"),
                    ])
                    .send()
                    .await
                    .context("arxiv http get()")?
                    .error_for_status()
                    .context("arxiv http status")?
                    .text()
                    .await
                    .context("arxiv http .text()")?;
                let mut recs = self.parse_records(&body)?;
                recs.truncate(*max_results);
                Ok(recs)
            }
        }
    }

    fn name(&self) -> &str {
        &self.source.name
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Paper
    }
}
