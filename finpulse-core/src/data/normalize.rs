//! Normalization of provider output into storable price rows.
//!
//! Rules, applied in order:
//! 1. A row with an empty ticker is a provider contract violation and fails the batch.
//! 2. Tickers are trimmed and uppercased.
//! 3. Rows without a finite close are dropped.
//! 4. Duplicate `(ticker, date)` keys collapse to the last occurrence.
//!
//! Output is sorted by `(ticker, date)`.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::provider::DataError;
use crate::domain::PriceRow;

/// Outcome of normalizing a batch of provider rows.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    pub rows: Vec<PriceRow>,
    /// Rows dropped because they had no usable close.
    pub dropped_no_close: usize,
    /// Rows replaced by a later row with the same key.
    pub duplicates: usize,
}

/// Normalize provider rows. See the module docs for the rules.
pub fn normalize(rows: Vec<PriceRow>) -> Result<NormalizeReport, DataError> {
    let mut by_key: BTreeMap<(String, NaiveDate), PriceRow> = BTreeMap::new();
    let mut dropped_no_close = 0;
    let mut duplicates = 0;

    for mut row in rows {
        let ticker = row.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(DataError::MalformedRow(format!(
                "row dated {} has no ticker",
                row.date
            )));
        }
        row.ticker = ticker;

        if !row.has_close() {
            dropped_no_close += 1;
            continue;
        }

        if by_key.insert((row.ticker.clone(), row.date), row).is_some() {
            duplicates += 1;
        }
    }

    Ok(NormalizeReport {
        rows: by_key.into_values().collect(),
        dropped_no_close,
        duplicates,
    })
}
