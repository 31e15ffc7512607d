//! `radar`: run one mining pass and print the ranked digest as JSON on stdout.
//!
//! Usage: `radar [category]` where category is one of
//! paper | official | media | tools | community | safety | interview.
//! Without a category every configured source is mined.
//!
//! Logs go to stderr (`RUST_LOG`, default `trend_radar=info,warn`).

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trend_radar::ingest::types::SourceCategory;
use trend_radar::telemetry::{install_exporter, ENV_METRICS_ADDR};
use trend_radar::{rank, CancellationToken, Item, Miner, MiningError, RadarConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trend_radar=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn parse_category(arg: &str) -> Result<SourceCategory> {
    SourceCategory::ALL
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(arg))
        .ok_or_else(|| anyhow!("unknown category `{arg}`"))
}

#[derive(Serialize)]
struct Digest<'a> {
    min_score: u32,
    total_items: usize,
    sources_attempted: usize,
    sources_failed: usize,
    cancelled: bool,
    items: Vec<&'a Item>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Ok(addr) = std::env::var(ENV_METRICS_ADDR) {
        install_exporter(&addr)?;
    }

    let category = std::env::args().nth(1).map(|a| parse_category(&a)).transpose()?;
    let cfg = Arc::new(RadarConfig::load_default().context("loading radar config")?);
    let miner = Miner::from_config(cfg.clone())?;

    // Abandon in-flight fetches on Ctrl-C; the partial report is still printed.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling mining run");
            on_signal.cancel();
        }
    });

    let result = match category {
        Some(c) => miner.mine_category(c, &cancel).await,
        None => miner.mine_all(&cancel).await,
    };
    let report = match result {
        Ok(r) => r,
        Err(MiningError::NoSourcesConfigured) => {
            return Err(anyhow!(
                "no sources configured; add [[sources]] to the radar config"
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let digest = Digest {
        min_score: cfg.mining.min_score,
        total_items: report.items.len(),
        sources_attempted: report.sources_attempted,
        sources_failed: report.sources_failed,
        cancelled: report.cancelled,
        items: rank::top(&report.items, cfg.mining.min_score, cfg.mining.top_n),
    };
    println!("{}", serde_json::to_string_pretty(&digest)?);
    Ok(())
}
