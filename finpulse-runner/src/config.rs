//! Pipeline configuration.
//!
//! A `PipelineConfig` is resolved once at the boundary from layered sources and
//! then passed by reference into the pipeline. Precedence, highest first:
//! explicit overrides (CLI flags, environment) -> TOML file -> defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use finpulse_core::data::{Interval, Period, SUPPORTED_PROVIDER};

/// Default store location when none is configured.
pub const DEFAULT_STORE_LOCATION: &str = "./data/market.db";

/// Default ticker list when none is configured.
pub const DEFAULT_TICKERS: &str = "AAPL,MSFT,GOOGL,JPM,GS";

/// Configuration errors. All of these are fatal and raised before any I/O on the store.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported data provider '{provider}' (supported: {supported})", supported = SUPPORTED_PROVIDER)]
    UnsupportedProvider { provider: String },

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Everything one pipeline run needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Provider identifier. Must equal `"yfinance"` for a run to start.
    pub provider: String,
    /// Path of the SQLite database file.
    pub store_location: PathBuf,
    /// Normalized ticker list: uppercase, unique, in first-seen order.
    pub tickers: Vec<String>,
    pub period: Period,
    pub interval: Interval,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider: SUPPORTED_PROVIDER.to_string(),
            store_location: PathBuf::from(DEFAULT_STORE_LOCATION),
            tickers: parse_tickers(DEFAULT_TICKERS),
            period: Period::default(),
            interval: Interval::default(),
        }
    }
}

/// Optional values layered over a base config. Every field is raw text as it
/// arrives from a flag or environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub provider: Option<String>,
    pub store_location: Option<PathBuf>,
    pub tickers: Option<String>,
    pub period: Option<String>,
    pub interval: Option<String>,
}

/// On-disk TOML shape. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    provider: Option<String>,
    store_location: Option<PathBuf>,
    tickers: Option<Vec<String>>,
    period: Option<String>,
    interval: Option<String>,
}

impl PipelineConfig {
    /// Resolve defaults, then `file` (if any), then `overrides`.
    pub fn resolve(file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(overrides)?;
        Ok(config)
    }

    /// Load a TOML file layered over the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse TOML text layered over the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        let mut config = Self::default();
        config.apply(ConfigOverrides {
            provider: file.provider,
            store_location: file.store_location,
            tickers: file.tickers.map(|list| list.join(",")),
            period: file.period,
            interval: file.interval,
        })?;
        Ok(config)
    }

    /// Overwrite every field that `overrides` sets.
    pub fn apply(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(provider) = overrides.provider {
            self.provider = provider.trim().to_string();
        }
        if let Some(location) = overrides.store_location {
            self.store_location = location;
        }
        if let Some(raw) = overrides.tickers {
            self.tickers = parse_tickers(&raw);
        }
        if let Some(raw) = overrides.period {
            self.period = raw.parse().map_err(ConfigError::InvalidPeriod)?;
        }
        if let Some(raw) = overrides.interval {
            self.interval = raw.parse().map_err(ConfigError::InvalidInterval)?;
        }
        Ok(())
    }

    /// Fail unless the configured provider is the supported one.
    pub fn validate_provider(&self) -> Result<(), ConfigError> {
        if self.provider == SUPPORTED_PROVIDER {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedProvider {
                provider: self.provider.clone(),
            })
        }
    }
}

/// Split a comma-separated list into trimmed, uppercased, unique tickers.
///
/// Order of first occurrence is preserved; empty entries are dropped.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ticker in raw.split(',').map(|t| t.trim().to_uppercase()) {
        if !ticker.is_empty() && !out.contains(&ticker) {
            out.push(ticker);
        }
    }
    out
}
