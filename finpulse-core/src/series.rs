//! Per-ticker close series — the common input of both engines.
//!
//! Rows are partitioned by ticker and each partition is sorted ascending by
//! date before any window is computed. Rolling results depend on that order,
//! so the engines never read price rows directly.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::PriceRow;

/// Caller contract violations detected while reading price rows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("price row dated {date} has an empty ticker")]
    MissingTicker { date: NaiveDate },

    #[error("price row {ticker} {date} has no close")]
    MissingClose { ticker: String, date: NaiveDate },
}

/// Chronologically ordered closes for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSeries<'a> {
    pub ticker: &'a str,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
}

impl TickerSeries<'_> {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Date of the latest observation.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Split rows by ticker and sort each partition by date.
///
/// Partitions come back in ticker order. A repeated `(ticker, date)` keeps the
/// last row, as normalization does. A present-but-NaN close is accepted and
/// propagates through the engines; an absent close is an error.
pub fn partition(rows: &[PriceRow]) -> Result<Vec<TickerSeries<'_>>, EngineError> {
    let mut groups: BTreeMap<&str, BTreeMap<NaiveDate, f64>> = BTreeMap::new();

    for row in rows {
        if row.ticker.is_empty() {
            return Err(EngineError::MissingTicker { date: row.date });
        }
        let close = row.close.ok_or_else(|| EngineError::MissingClose {
            ticker: row.ticker.clone(),
            date: row.date,
        })?;
        groups
            .entry(row.ticker.as_str())
            .or_default()
            .insert(row.date, close);
    }

    Ok(groups
        .into_iter()
        .map(|(ticker, points)| {
            let (dates, closes) = points.into_iter().unzip();
            TickerSeries {
                ticker,
                dates,
                closes,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn partitions_and_sorts_each_ticker() {
        let rows = vec![
            PriceRow::from_close("MSFT", d(5), 3.0),
            PriceRow::from_close("AAPL", d(4), 2.0),
            PriceRow::from_close("MSFT", d(1), 1.0),
            PriceRow::from_close("AAPL", d(2), 1.0),
        ];
        let series = partition(&rows).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].ticker, "AAPL");
        assert_eq!(series[0].dates, vec![d(2), d(4)]);
        assert_eq!(series[1].ticker, "MSFT");
        assert_eq!(series[1].closes, vec![1.0, 3.0]);
        assert_eq!(series[1].last_date(), Some(d(5)));
    }

    #[test]
    fn empty_input_has_no_partitions() {
        assert!(partition(&[]).unwrap().is_empty());
    }

    #[test]
    fn missing_close_is_rejected() {
        let mut row = PriceRow::from_close("AAPL", d(2), 1.0);
        row.close = None;
        assert_eq!(
            partition(&[row]).unwrap_err(),
            EngineError::MissingClose {
                ticker: "AAPL".into(),
                date: d(2)
            }
        );
    }

    #[test]
    fn empty_ticker_is_rejected() {
        let row = PriceRow::from_close("", d(2), 1.0);
        assert!(matches!(
            partition(&[row]),
            Err(EngineError::MissingTicker { .. })
        ));
    }

    #[test]
    fn nan_close_is_carried_through() {
        let rows = [PriceRow::from_close("AAPL", d(2), f64::NAN)];
        let series = partition(&rows).unwrap();
        assert!(series[0].closes[0].is_nan());
    }

    #[test]
    fn duplicate_key_keeps_last_row() {
        let rows = vec![
            PriceRow::from_close("AAPL", d(2), 1.0),
            PriceRow::from_close("AAPL", d(3), 2.0),
            PriceRow::from_close("AAPL", d(2), 5.0),
        ];
        let series = partition(&rows).unwrap();
        assert_eq!(series[0].dates, vec![d(2), d(3)]);
        assert_eq!(series[0].closes, vec![5.0, 2.0]);
    }
}
