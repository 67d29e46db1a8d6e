//! Analytics engine — per-date trailing metrics for each ticker.
//!
//! For every `(ticker, date)` in the input, produces:
//! - `daily_return`: `close[i] / close[i-1] - 1` against the previous observation
//!   in the sorted series (gaps in the calendar are bridged, not nulled)
//! - `ma20`, `ma50`: simple moving averages of the last 20 / 50 closes
//! - `vol20`: sample standard deviation of the last 20 daily returns
//!
//! Windows count observations, not calendar days. A metric is `None` until its
//! window is full, and whenever the window holds a non-finite input.

pub mod rolling;

pub use rolling::RollingWindow;

use crate::domain::{AnalyticsRow, PriceRow};
use crate::series::{partition, EngineError, TickerSeries};
use crate::stats;

/// Short moving-average window, in observations.
pub const MA_SHORT_WINDOW: usize = 20;
/// Long moving-average window, in observations.
pub const MA_LONG_WINDOW: usize = 50;
/// Volatility window, in daily returns.
pub const VOL_WINDOW: usize = 20;

/// Compute analytics rows for every `(ticker, date)` in `prices`.
///
/// Output is grouped by ticker (ascending) and dated ascending within each
/// ticker. Empty input gives empty output.
pub fn compute_analytics(prices: &[PriceRow]) -> Result<Vec<AnalyticsRow>, EngineError> {
    let series = partition(prices)?;
    let mut out = Vec::with_capacity(prices.len());
    for s in &series {
        analyze_series(s, &mut out);
    }
    Ok(out)
}

fn analyze_series(series: &TickerSeries<'_>, out: &mut Vec<AnalyticsRow>) {
    let mut ma_short = RollingWindow::new(MA_SHORT_WINDOW);
    let mut ma_long = RollingWindow::new(MA_LONG_WINDOW);
    let mut vol = RollingWindow::new(VOL_WINDOW);
    let mut prev_close: Option<f64> = None;

    for (&date, &close) in series.dates.iter().zip(&series.closes) {
        ma_short.push(close);
        ma_long.push(close);

        let daily_return = match prev_close {
            Some(prev) => {
                let r = close / prev - 1.0;
                vol.push(r);
                stats::finite(r)
            }
            None => None,
        };
        prev_close = Some(close);

        out.push(AnalyticsRow {
            ticker: series.ticker.to_string(),
            date,
            daily_return,
            ma20: ma_short.mean(),
            ma50: ma_long.mean(),
            vol20: vol.sample_std(),
        });
    }
}
