//! Risk engine — one point-in-time summary per ticker.
//!
//! Metrics are computed over the ticker's whole sorted series:
//! - `var_95_1d`: 5th percentile of daily returns (historical simulation)
//! - `sharpe`: `mean / std * sqrt(252)` over daily returns, `None` when `std == 0`
//! - `max_drawdown`: worst `close / running_peak - 1`
//!
//! Tickers with fewer than [`MIN_RISK_RETURNS`] valid returns get no row. That
//! is a normal outcome, so callers cannot assume one row per ticker.

use crate::domain::{PriceRow, RiskRow};
use crate::series::{partition, EngineError, TickerSeries};
use crate::stats;

/// Minimum number of valid daily returns before risk metrics are produced.
pub const MIN_RISK_RETURNS: usize = 30;

/// Trading days per year, used to annualize the Sharpe ratio.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Percentile of the return distribution reported as 1-day VaR.
pub const VAR_PERCENTILE: f64 = 5.0;

/// Compute at most one risk row per ticker in `prices`, in ticker order.
pub fn compute_risk(prices: &[PriceRow]) -> Result<Vec<RiskRow>, EngineError> {
    let series = partition(prices)?;
    Ok(series.iter().filter_map(risk_for_series).collect())
}

fn risk_for_series(series: &TickerSeries<'_>) -> Option<RiskRow> {
    let returns: Vec<f64> = stats::simple_returns(&series.closes)
        .into_iter()
        .filter(|r| r.is_finite())
        .collect();

    if returns.len() < MIN_RISK_RETURNS {
        tracing::debug!(
            ticker = series.ticker,
            returns = returns.len(),
            required = MIN_RISK_RETURNS,
            "insufficient history for risk metrics"
        );
        return None;
    }

    let as_of_date = series.last_date()?;
    let var_95_1d = stats::percentile_linear(&returns, VAR_PERCENTILE);
    let sharpe = sharpe_ratio(&returns);
    let max_drawdown = stats::max_drawdown(&series.closes);

    Some(RiskRow {
        ticker: series.ticker.to_string(),
        as_of_date,
        var_95_1d,
        sharpe,
        max_drawdown,
    })
}

/// Annualized Sharpe ratio with a zero risk-free rate.
///
/// `None` when the sample standard deviation is exactly zero.
pub fn sharpe_ratio(returns: &[f64]) -> Option<f64> {
    let mean = stats::mean(returns)?;
    let std = stats::sample_std(returns)?;
    if std == 0.0 {
        return None;
    }
    stats::finite(mean / std * TRADING_DAYS_PER_YEAR.sqrt())
}
