//! FinPulse Runner — pipeline orchestration, configuration, queries, export.
//!
//! This crate builds on `finpulse-core` to provide:
//! - Layered pipeline configuration (defaults, TOML file, overrides)
//! - The ingest pipeline: fetch -> upsert -> analytics -> risk -> summary
//! - The run summary reported to drivers
//! - Read-side queries and CSV export over a populated store

pub mod config;
pub mod export;
pub mod pipeline;
pub mod query;
pub mod summary;

pub use config::{parse_tickers, ConfigError, ConfigOverrides, PipelineConfig};
pub use export::export_csv;
pub use pipeline::{dataset_hash, run_pipeline, PipelineError};
pub use query::{PriceQuery, QueryError, QueryService};
pub use summary::{Outcome, RunSummary};
