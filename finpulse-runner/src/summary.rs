//! Run summary — the one value a pipeline run hands back to its driver.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every stage ran. Some tickers may still be missing.
    Completed,
    /// The provider returned no rows; nothing was written.
    NoData,
}

/// Counts and identities reported by a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Tickers as configured, in configured order.
    pub tickers_requested: Vec<String>,
    /// Tickers with at least one stored price row, sorted.
    pub tickers_loaded: Vec<String>,
    pub prices_rows_upserted: usize,
    pub analytics_rows_upserted: usize,
    pub risk_rows_upserted: usize,
    pub store_location: String,
    pub message: String,
    pub outcome: Outcome,
    /// BLAKE3 of the normalized price rows. `None` when nothing was fetched.
    pub dataset_hash: Option<String>,
}

impl RunSummary {
    /// Summary for a run whose provider returned nothing.
    pub fn no_data(tickers_requested: Vec<String>, store_location: String) -> Self {
        Self {
            tickers_requested,
            tickers_loaded: Vec::new(),
            prices_rows_upserted: 0,
            analytics_rows_upserted: 0,
            risk_rows_upserted: 0,
            store_location,
            message: "No price data returned from provider.".to_string(),
            outcome: Outcome::NoData,
            dataset_hash: None,
        }
    }

    /// Process exit status: 1 when no ticker loaded, 0 otherwise (partial loads succeed).
    pub fn exit_code(&self) -> i32 {
        if self.tickers_loaded.is_empty() {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== FinPulse Pipeline Summary ===")?;
        writeln!(f, "Store:              {}", self.store_location)?;
        writeln!(f, "Tickers requested:  {}", self.tickers_requested.join(", "))?;
        writeln!(f, "Tickers loaded:     {}", self.tickers_loaded.join(", "))?;
        writeln!(f, "Prices upserted:    {}", self.prices_rows_upserted)?;
        writeln!(f, "Analytics upserted: {}", self.analytics_rows_upserted)?;
        writeln!(f, "Risk upserted:      {}", self.risk_rows_upserted)?;
        if let Some(hash) = &self.dataset_hash {
            writeln!(f, "Dataset hash:       {}", &hash[..hash.len().min(16)])?;
        }
        writeln!(f, "Message:            {}", self.message)?;
        write!(f, "=================================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(loaded: &[&str]) -> RunSummary {
        RunSummary {
            tickers_requested: vec!["AAPL".into(), "MSFT".into()],
            tickers_loaded: loaded.iter().map(|t| t.to_string()).collect(),
            prices_rows_upserted: 10,
            analytics_rows_upserted: 10,
            risk_rows_upserted: 0,
            store_location: "./data/market.db".into(),
            message: "Pipeline completed successfully.".into(),
            outcome: Outcome::Completed,
            dataset_hash: Some("ab".repeat(32)),
        }
    }

    #[test]
    fn exit_code_tracks_loaded_tickers() {
        assert_eq!(completed(&["AAPL"]).exit_code(), 0);
        assert_eq!(completed(&[]).exit_code(), 1);
        assert_eq!(RunSummary::no_data(vec![], ":memory:".into()).exit_code(), 1);
    }

    #[test]
    fn display_has_fixed_layout() {
        let text = completed(&["AAPL"]).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=== FinPulse Pipeline Summary ===");
        assert_eq!(lines[2], "Tickers requested:  AAPL, MSFT");
        assert_eq!(lines[3], "Tickers loaded:     AAPL");
        assert!(lines.contains(&"Dataset hash:       abababababababab"));
        assert_eq!(*lines.last().unwrap(), "=================================");
    }

    #[test]
    fn no_data_summary_is_all_zero() {
        let summary = RunSummary::no_data(vec!["AAPL".into()], ":memory:".into());
        assert_eq!(summary.outcome, Outcome::NoData);
        assert_eq!(summary.prices_rows_upserted, 0);
        assert_eq!(summary.analytics_rows_upserted, 0);
        assert_eq!(summary.risk_rows_upserted, 0);
        assert!(!summary.to_string().contains("Dataset hash"));
    }

    #[test]
    fn serializes_outcome_as_snake_case() {
        let json = serde_json::to_value(completed(&["AAPL"])).unwrap();
        assert_eq!(json["outcome"], "completed");
    }
}
