//! Price data: provider seam, Yahoo implementation, normalization.

pub mod circuit_breaker;
pub mod normalize;
pub mod provider;
pub mod range;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use normalize::{normalize, NormalizeReport};
pub use provider::{DataError, DataProvider, SUPPORTED_PROVIDER};
pub use range::{Interval, Period};
pub use yahoo::YahooProvider;
