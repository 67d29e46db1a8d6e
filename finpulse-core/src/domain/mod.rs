//! Domain rows for FinPulse.
//!
//! Three row kinds, each with a natural key that the store upserts on:
//! prices `(ticker, date)`, analytics `(ticker, date)`, risk `(ticker, as_of_date)`.

pub mod analytics;
pub mod price;
pub mod risk;

pub use analytics::AnalyticsRow;
pub use price::PriceRow;
pub use risk::RiskRow;
