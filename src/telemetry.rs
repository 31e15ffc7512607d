// src/telemetry.rs
use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;

pub const ENV_METRICS_ADDR: &str = "RADAR_METRICS_ADDR";

/// One-time metrics registration (so series show up on the exporter).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("mining_runs_total", "Mining runs started.");
        describe_counter!(
            "mining_source_errors_total",
            "Source fetches that failed or timed out."
        );
        describe_counter!("mining_records_total", "Records normalized by adapters.");
        describe_counter!("mining_dedup_total", "Records dropped as duplicate URLs.");
        describe_counter!("mining_items_total", "Scored items emitted by runs.");
        describe_counter!(
            "ingest_feed_recovered_total",
            "Malformed feeds parsed by the lenient recovery scan."
        );
        describe_counter!("reputation_lookups_total", "Reputation lookups attempted.");
        describe_counter!(
            "reputation_failures_total",
            "Reputation lookups that could not determine a value."
        );
        describe_histogram!("ingest_parse_ms", "Source parse time in milliseconds.");
        describe_gauge!("mining_last_run_ts", "Unix ts when a mining run last finished.");
    });
}

/// Install the Prometheus recorder with an HTTP scrape listener on `addr`.
/// Must be called from inside a tokio runtime.
pub fn install_exporter(addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid {ENV_METRICS_ADDR} `{addr}`"))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("prometheus: install exporter")?;
    ensure_metrics_described();
    tracing::info!(%addr, "prometheus exporter listening");
    Ok(())
}
