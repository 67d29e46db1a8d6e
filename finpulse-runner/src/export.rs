//! CSV export of stored rows.
//!
//! Writes three files into an output directory:
//! - `prices.csv`: every stored price row for the selected tickers
//! - `analytics.csv`: every stored analytics row
//! - `risk.csv`: the latest risk row per ticker
//!
//! NULL fields are written as empty cells.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use finpulse_core::domain::{AnalyticsRow, PriceRow, RiskRow};
use finpulse_core::store::{PriceRange, Store};

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

// ─── CSV rendering ──────────────────────────────────────────────────

/// Render price rows as CSV.
pub fn prices_csv(rows: &[PriceRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ticker", "date", "open", "high", "low", "close", "adj_close", "volume",
    ])?;
    for r in rows {
        wtr.write_record([
            r.ticker.clone(),
            r.date.to_string(),
            opt(r.open),
            opt(r.high),
            opt(r.low),
            opt(r.close),
            opt(r.adj_close),
            opt(r.volume),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Render analytics rows as CSV.
pub fn analytics_csv(rows: &[AnalyticsRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", "date", "daily_return", "ma20", "ma50", "vol20"])?;
    for r in rows {
        wtr.write_record([
            r.ticker.clone(),
            r.date.to_string(),
            opt(r.daily_return),
            opt(r.ma20),
            opt(r.ma50),
            opt(r.vol20),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Render risk rows as CSV.
pub fn risk_csv(rows: &[RiskRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", "as_of_date", "var_95_1d", "sharpe", "max_drawdown"])?;
    for r in rows {
        wtr.write_record([
            r.ticker.clone(),
            r.as_of_date.to_string(),
            opt(r.var_95_1d),
            opt(r.sharpe),
            r.max_drawdown.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Directory export ───────────────────────────────────────────────

/// Export stored rows for `tickers` (all stored tickers when empty) into `out_dir`.
///
/// Returns the paths written.
pub fn export_csv(store: &Store, tickers: &[String], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let tickers = if tickers.is_empty() {
        store.tickers()?
    } else {
        tickers.iter().map(|t| t.trim().to_uppercase()).collect()
    };

    let mut prices = Vec::new();
    let mut analytics = Vec::new();
    let mut risk = Vec::new();
    for ticker in &tickers {
        prices.extend(store.prices(ticker, &PriceRange::default())?);
        analytics.extend(store.analytics(ticker, None, None)?);
        risk.extend(store.latest_risk(ticker)?);
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create export dir: {}", out_dir.display()))?;

    let files = [
        ("prices.csv", prices_csv(&prices)?),
        ("analytics.csv", analytics_csv(&analytics)?),
        ("risk.csv", risk_csv(&risk)?),
    ];
    let mut written = Vec::with_capacity(files.len());
    for (name, body) in files {
        let path = out_dir.join(name);
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    tracing::info!(
        dir = %out_dir.display(),
        tickers = tickers.len(),
        prices = prices.len(),
        analytics = analytics.len(),
        risk = risk.len(),
        "export written"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn nulls_render_as_empty_cells() {
        let row = AnalyticsRow {
            ticker: "AAPL".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            daily_return: None,
            ma20: Some(1.5),
            ma50: None,
            vol20: None,
        };
        let csv = analytics_csv(&[row]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("ticker,date,daily_return,ma20,ma50,vol20"));
        assert_eq!(lines.next(), Some("AAPL,2024-01-02,,1.5,,"));
    }

    #[test]
    fn export_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store
            .upsert_prices(&[PriceRow::from_close(
                "MSFT",
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                400.0,
            )])
            .unwrap();

        let written = export_csv(&store, &[], dir.path()).unwrap();
        assert_eq!(written.len(), 3);

        let prices = std::fs::read_to_string(dir.path().join("prices.csv")).unwrap();
        assert!(prices.contains("MSFT,2024-01-02,,,,400,,"));
        let risk = std::fs::read_to_string(dir.path().join("risk.csv")).unwrap();
        assert_eq!(risk.lines().count(), 1);
    }
}
