//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over price sources so the pipeline can be
//! driven by Yahoo Finance in production and by in-memory fakes in tests.

use thiserror::Error;

use super::range::{Interval, Period};
use crate::domain::PriceRow;

/// Identifier of the only provider the pipeline accepts.
pub const SUPPORTED_PROVIDER: &str = "yfinance";

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("ticker not found: {ticker}")]
    TickerNotFound { ticker: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("malformed price row: {0}")]
    MalformedRow(String),

    #[error("http client error: {0}")]
    Client(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Source of daily price rows.
///
/// `fetch` tolerates partial coverage: tickers the provider cannot supply are
/// absent from the output, and an empty vector is a valid "no data" answer.
/// An `Err` is reserved for failures that make the whole request meaningless.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch price rows for every ticker over the lookback period.
    fn fetch(
        &self,
        tickers: &[String],
        period: Period,
        interval: Interval,
    ) -> Result<Vec<PriceRow>, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}
