//! RiskRow — point-in-time risk summary for a ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Risk metrics for a ticker as of its latest observed date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRow {
    pub ticker: String,
    pub as_of_date: NaiveDate,
    /// Historical-simulation 1-day VaR at 95%: the 5th percentile daily return.
    pub var_95_1d: Option<f64>,
    /// Annualized Sharpe ratio. `None` when return volatility is exactly zero.
    pub sharpe: Option<f64>,
    /// Worst peak-to-trough decline, in `[-1, 0]`.
    pub max_drawdown: f64,
}
