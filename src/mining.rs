// src/mining.rs
//! Mining run orchestration.
//!
//! Phases:
//! 1) fetch every source concurrently (bounded, per-source timeout, cancellable)
//! 2) flatten in adapter order and dedup by canonical URL
//! 3) extract references and look each distinct one up concurrently
//! 4) one synchronous pass: watchlist -> channels -> score -> category filter -> sort

use futures::stream::{self, StreamExt};
use metrics::{counter, gauge};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::analyze::{analyze_item, extract_references, ReputationMap};
use crate::config::RadarConfig;
use crate::ingest::build_adapters;
use crate::ingest::types::{RawRecord, SourceAdapter, SourceCategory};
use crate::item::{Item, ReferenceKind};
use crate::rank;
use crate::reputation::{HttpReputation, Metric, ReputationResult, ReputationSource};
use crate::telemetry;

#[derive(Debug, thiserror::Error)]
pub enum MiningError {
    /// Not a single source in any category; nothing could ever be mined.
    #[error("no sources configured in any category")]
    NoSourcesConfigured,
    #[error(transparent)]
    Setup(#[from] anyhow::Error),
}

/// Ranked output of one run plus bookkeeping about how it went.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub items: Vec<Item>,
    pub sources_attempted: usize,
    pub sources_failed: usize,
    pub records_seen: usize,
    pub duplicates_dropped: usize,
    pub items_filtered: usize,
    pub cancelled: bool,
}

enum Fetched {
    Records(Vec<RawRecord>),
    Failed,
    Cancelled,
}

pub struct Miner {
    cfg: Arc<RadarConfig>,
    reputation: Arc<dyn ReputationSource>,
}

impl Miner {
    pub fn new(cfg: Arc<RadarConfig>, reputation: Arc<dyn ReputationSource>) -> Self {
        Self { cfg, reputation }
    }

    /// Miner backed by the live reputation APIs.
    pub fn from_config(cfg: Arc<RadarConfig>) -> anyhow::Result<Self> {
        let reputation = Arc::new(HttpReputation::new(&cfg.reputation)?);
        Ok(Self::new(cfg, reputation))
    }

    pub fn config(&self) -> &RadarConfig {
        &self.cfg
    }

    /// Every configured source. Zero sources overall is an error, not an empty success.
    pub async fn mine_all(&self, cancel: &CancellationToken) -> Result<RunReport, MiningError> {
        if !self.cfg.has_sources() {
            tracing::error!(target: "mining", "no sources configured in any category");
            return Err(MiningError::NoSourcesConfigured);
        }
        let adapters = build_adapters(&self.cfg, None)?;
        Ok(self.run(&adapters, cancel).await)
    }

    /// Only the sources of `category`; an unconfigured category yields an empty report.
    pub async fn mine_category(
        &self,
        category: SourceCategory,
        cancel: &CancellationToken,
    ) -> Result<RunReport, MiningError> {
        let adapters = build_adapters(&self.cfg, Some(category))?;
        if adapters.is_empty() {
            tracing::info!(target: "mining", %category, "no sources configured for category");
            return Ok(RunReport::default());
        }
        Ok(self.run(&adapters, cancel).await)
    }

    /// Run the pipeline over explicit adapters, in the given order.
    pub async fn run(&self, adapters: &[Box<dyn SourceAdapter>], cancel: &CancellationToken) -> RunReport {
        telemetry::ensure_metrics_described();
        counter!("mining_runs_total").increment(1);
        let t0 = std::time::Instant::now();
        let max_in_flight = self.cfg.mining.max_in_flight.max(1);
        let source_timeout = Duration::from_millis(self.cfg.mining.source_timeout_ms);

        let mut report = RunReport {
            sources_attempted: adapters.len(),
            ..RunReport::default()
        };

        // (1) fetch; `buffered` keeps adapter order in the output
        let fetched: Vec<Fetched> = stream::iter(adapters.iter())
            .map(|a| fetch_source(a.as_ref(), source_timeout, cancel))
            .buffered(max_in_flight)
            .collect()
            .await;

        // (2) flatten + dedup before any lookup is spent on a duplicate
        let mut items = Vec::new();
        for f in fetched {
            match f {
                Fetched::Records(recs) => items.extend(recs.into_iter().map(Item::from_record)),
                Fetched::Failed => report.sources_failed += 1,
                Fetched::Cancelled => {}
            }
        }
        report.records_seen = items.len();
        let (mut items, dropped) = rank::dedup_first_seen(items);
        report.duplicates_dropped = dropped;
        counter!("mining_dedup_total").increment(dropped as u64);

        // (3) references + reputation
        for it in &mut items {
            it.references = extract_references(&it.full_text());
        }
        let reputations = self.lookup_references(&items, max_in_flight, cancel).await;

        // (4) synchronous scoring pass
        let mut scored = Vec::with_capacity(items.len());
        for mut it in items {
            let rep: ReputationMap = it
                .references
                .iter()
                .filter_map(|(kind, url)| {
                    reputations
                        .get(&(*kind, url.clone()))
                        .map(|r| (*kind, *r))
                })
                .collect();
            let hits = analyze_item(&mut it, &rep, &self.cfg);
            if it.category == SourceCategory::Interview && hits.authors.is_empty() {
                report.items_filtered += 1;
                continue;
            }
            scored.push(it);
        }
        rank::sort_items(&mut scored);

        report.cancelled = cancel.is_cancelled();
        report.items = scored;
        counter!("mining_items_total").increment(report.items.len() as u64);
        gauge!("mining_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        tracing::info!(
            target: "mining",
            sources = report.sources_attempted,
            failed = report.sources_failed,
            records = report.records_seen,
            dedup = report.duplicates_dropped,
            filtered = report.items_filtered,
            items = report.items.len(),
            cancelled = report.cancelled,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "mining run finished"
        );
        report
    }

    /// One lookup per distinct (kind, url); identical references share a result.
    async fn lookup_references(
        &self,
        items: &[Item],
        max_in_flight: usize,
        cancel: &CancellationToken,
    ) -> HashMap<(ReferenceKind, String), ReputationResult> {
        let mut seen = HashSet::new();
        let wanted: Vec<(ReferenceKind, String)> = items
            .iter()
            .flat_map(|it| it.references.iter().map(|(k, u)| (*k, u.clone())))
            .filter(|key| seen.insert(key.clone()))
            .collect();
        if wanted.is_empty() {
            return HashMap::new();
        }

        let call_timeout = Duration::from_millis(self.cfg.reputation.timeout_ms);
        let reputation = &self.reputation;
        stream::iter(wanted)
            .map(|(kind, url)| async move {
                let failed = ReputationResult::failed(Metric::for_kind(kind));
                let res = tokio::select! {
                    _ = cancel.cancelled() => failed,
                    r = tokio::time::timeout(call_timeout, reputation.lookup(kind, &url)) => {
                        r.unwrap_or_else(|_| {
                            tracing::warn!(target: "reputation", %url, "lookup timed out");
                            failed
                        })
                    }
                };
                ((kind, url), res)
            })
            .buffer_unordered(max_in_flight)
            .collect()
            .await
    }
}

async fn fetch_source(adapter: &dyn SourceAdapter, timeout: Duration, cancel: &CancellationToken) -> Fetched {
    let name = adapter.name();
    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::info!(target: "mining", source = %name, "fetch abandoned on cancellation");
            Fetched::Cancelled
        }
        res = tokio::time::timeout(timeout, adapter.fetch_records()) => match res {
            Ok(Ok(recs)) => {
                tracing::debug!(target: "mining", source = %name, records = recs.len(), "source fetched");
                Fetched::Records(recs)
            }
            Ok(Err(e)) => {
                tracing::warn!(target: "mining", error = ?e, source = %name, "source error");
                counter!("mining_source_errors_total").increment(1);
                Fetched::Failed
            }
            Err(_) => {
                tracing::warn!(target: "mining", source = %name, timeout_ms = timeout.as_millis() as u64, "source timed out");
                counter!("mining_source_errors_total").increment(1);
                Fetched::Failed
            }
        }
    }
}
