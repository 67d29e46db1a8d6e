//! Pipeline orchestrator — sequences one ingest run, computes nothing itself.
//!
//! Stages: validate provider -> open store -> init schema -> fetch + normalize
//! -> upsert prices -> analytics -> upsert -> risk -> upsert -> summary.
//!
//! The store is opened after provider validation, so a configuration error
//! leaves the store untouched. Once opened, it is released on every exit path:
//! explicitly on success, by drop when a stage fails.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use finpulse_core::analytics::compute_analytics;
use finpulse_core::data::{normalize, DataError, DataProvider};
use finpulse_core::domain::PriceRow;
use finpulse_core::risk::compute_risk;
use finpulse_core::store::{Store, StoreError};
use finpulse_core::EngineError;

use crate::config::{ConfigError, PipelineConfig};
use crate::summary::{Outcome, RunSummary};

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Run the full ingest pipeline once.
pub fn run_pipeline(
    config: &PipelineConfig,
    provider: &dyn DataProvider,
) -> Result<RunSummary, PipelineError> {
    let span = info_span!(
        "pipeline",
        provider = %config.provider,
        tickers = config.tickers.len()
    );
    let _enter = span.enter();

    config.validate_provider()?;

    let mut store = Store::open(&config.store_location)?;
    let summary = run_stages(config, provider, &mut store)?;
    store.close()?;

    info!(
        outcome = ?summary.outcome,
        loaded = summary.tickers_loaded.len(),
        "pipeline finished"
    );
    Ok(summary)
}

fn run_stages(
    config: &PipelineConfig,
    provider: &dyn DataProvider,
    store: &mut Store,
) -> Result<RunSummary, PipelineError> {
    store.init_schema()?;

    debug!(provider = provider.name(), "fetching prices");
    let raw = provider.fetch(&config.tickers, config.period, config.interval)?;
    let fetched = raw.len();
    let report = normalize(raw)?;
    info!(
        fetched,
        kept = report.rows.len(),
        dropped_no_close = report.dropped_no_close,
        duplicates = report.duplicates,
        "prices normalized"
    );

    let prices = report.rows;
    if prices.is_empty() {
        warn!("provider returned no price data");
        return Ok(RunSummary::no_data(
            config.tickers.clone(),
            store.location().to_string(),
        ));
    }

    let prices_rows_upserted = store.upsert_prices(&prices)?;
    info!(rows = prices_rows_upserted, "prices upserted");

    let analytics = compute_analytics(&prices)?;
    let analytics_rows_upserted = if analytics.is_empty() {
        0
    } else {
        store.upsert_analytics(&analytics)?
    };
    info!(rows = analytics_rows_upserted, "analytics upserted");

    let risk = compute_risk(&prices)?;
    let risk_rows_upserted = if risk.is_empty() {
        0
    } else {
        store.upsert_risk(&risk)?
    };
    info!(rows = risk_rows_upserted, "risk upserted");

    let tickers_loaded = loaded_tickers(&prices);
    for ticker in &config.tickers {
        if !tickers_loaded.contains(ticker) {
            warn!(%ticker, "requested ticker not loaded");
        }
    }

    Ok(RunSummary {
        tickers_requested: config.tickers.clone(),
        tickers_loaded,
        prices_rows_upserted,
        analytics_rows_upserted,
        risk_rows_upserted,
        store_location: store.location().to_string(),
        message: "Pipeline completed successfully.".to_string(),
        outcome: Outcome::Completed,
        dataset_hash: Some(dataset_hash(&prices)),
    })
}

/// Distinct tickers present in `prices`, sorted.
fn loaded_tickers(prices: &[PriceRow]) -> Vec<String> {
    prices
        .iter()
        .map(|r| r.ticker.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// BLAKE3 over the normalized rows in key order.
///
/// Two runs that fetched identical data produce the same hash.
pub fn dataset_hash(prices: &[PriceRow]) -> String {
    fn opt_f64(hasher: &mut blake3::Hasher, v: Option<f64>) {
        match v {
            Some(x) => hasher.update(&[1]).update(&x.to_bits().to_le_bytes()),
            None => hasher.update(&[0]),
        };
    }

    let mut hasher = blake3::Hasher::new();
    for row in prices {
        hasher.update(row.ticker.as_bytes());
        hasher.update(&[0]);
        hasher.update(row.date.to_string().as_bytes());
        opt_f64(&mut hasher, row.open);
        opt_f64(&mut hasher, row.high);
        opt_f64(&mut hasher, row.low);
        opt_f64(&mut hasher, row.close);
        opt_f64(&mut hasher, row.adj_close);
        match row.volume {
            Some(v) => hasher.update(&[1]).update(&v.to_le_bytes()),
            None => hasher.update(&[0]),
        };
    }
    hasher.finalize().to_hex().to_string()
}
