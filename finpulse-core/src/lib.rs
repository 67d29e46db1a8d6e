//! FinPulse Core — domain rows, price ingestion, analytics and risk engines, storage.
//!
//! This crate contains everything below the pipeline:
//! - Domain rows (prices, analytics, risk) and their natural keys
//! - The `DataProvider` seam with a Yahoo chart implementation and normalization
//! - Analytics engine: daily returns, 20/50 moving averages, 20-day volatility
//! - Risk engine: historical 1-day VaR, annualized Sharpe, max drawdown
//! - SQLite store with idempotent bulk upserts and keyed reads
//!
//! The engines are pure: no I/O, no clock, same rows in gives same rows out.

pub mod analytics;
pub mod data;
pub mod domain;
pub mod risk;
pub mod series;
pub mod stats;
pub mod store;

pub use series::EngineError;
