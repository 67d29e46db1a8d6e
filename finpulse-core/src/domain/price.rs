//! PriceRow — one daily OHLCV observation for a ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV row keyed by `(ticker, date)`.
///
/// Every price field is nullable: providers routinely return partial bars.
/// Only `close` is required by the engines, and rows without one are dropped
/// during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
}

impl PriceRow {
    /// Row carrying only the fields the engines read.
    pub fn from_close(ticker: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            adj_close: None,
            volume: None,
        }
    }

    /// Natural key of the row.
    pub fn key(&self) -> (&str, NaiveDate) {
        (&self.ticker, self.date)
    }

    /// True when the close is present and finite.
    pub fn has_close(&self) -> bool {
        self.close.is_some_and(f64::is_finite)
    }
}
