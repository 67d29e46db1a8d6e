//! AnalyticsRow — derived per-date metrics for a ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trailing-window analytics for one `(ticker, date)`.
///
/// `None` means the metric is undefined at that position: not enough history
/// yet, or the inputs in its window were not finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub daily_return: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub vol20: Option<f64>,
}
