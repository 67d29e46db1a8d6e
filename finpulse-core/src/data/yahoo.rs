//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. Handles rate limiting,
//! retries with exponential backoff, response parsing, and the circuit breaker.
//! Tickers are requested in parallel; a ticker that cannot be fetched is logged
//! and left out of the result.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use serde::Deserialize;

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider};
use super::range::{Interval, Period};
use crate::domain::PriceRow;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Outcome of a single chart request, as seen by the retry loop.
enum Attempt {
    Retry(DataError),
    Fatal(DataError),
}

/// How the chart endpoint's HTTP status is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartStatus {
    Ok,
    /// 403: the client is blocked; stop every ticker.
    Banned,
    /// 404: the symbol does not exist.
    UnknownTicker,
    /// 429
    Throttled,
    /// Any other non-success status.
    Unavailable,
}

impl From<reqwest::StatusCode> for ChartStatus {
    fn from(status: reqwest::StatusCode) -> Self {
        use reqwest::StatusCode;
        match status {
            StatusCode::FORBIDDEN => ChartStatus::Banned,
            StatusCode::NOT_FOUND => ChartStatus::UnknownTicker,
            StatusCode::TOO_MANY_REQUESTS => ChartStatus::Throttled,
            s if s.is_success() => ChartStatus::Ok,
            _ => ChartStatus::Unavailable,
        }
    }
}

/// Seconds from a `Retry-After` header, 60 when absent or not a number.
fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(60)
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Client(e.to_string()))?;

        Ok(Self {
            client,
            circuit_breaker,
            base_url: "https://query2.finance.yahoo.com".to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Point the provider at a different host (mirrors, local fixtures).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the chart API URL for a ticker.
    fn chart_url(&self, ticker: &str, period: Period, interval: Interval) -> String {
        format!(
            "{}/v8/finance/chart/{ticker}?range={period}&interval={interval}&includeAdjustedClose=true",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Parse the chart API response into price rows.
    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<PriceRow>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::TickerNotFound {
                        ticker: ticker.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // Yahoo omits timestamps entirely when the range holds no bars.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut rows = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());

            // Holidays come back as all-null bars
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            rows.push(PriceRow {
                ticker: ticker.to_string(),
                date,
                open,
                high,
                low,
                close,
                adj_close,
                volume: volume.and_then(|v| i64::try_from(v).ok()),
            });
        }

        Ok(rows)
    }

    /// Fetch one ticker, retrying transient failures with exponential backoff.
    fn fetch_ticker(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<PriceRow>, DataError> {
        let url = self.chart_url(ticker, period, interval);
        let mut last_error = DataError::Other(format!("no request made for {ticker}"));

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(ticker, attempt, ?delay, error = %last_error, "retrying chart request");
                std::thread::sleep(delay);
            }
            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            match self.request_chart(ticker, &url) {
                Ok(rows) => {
                    self.circuit_breaker.record_success();
                    return Ok(rows);
                }
                Err(Attempt::Retry(e)) => last_error = e,
                Err(Attempt::Fatal(e)) => return Err(e),
            }
        }
        Err(last_error)
    }

    /// One chart request. Feeds the breaker according to the response status.
    fn request_chart(&self, ticker: &str, url: &str) -> Result<Vec<PriceRow>, Attempt> {
        let resp = self.client.get(url).send().map_err(|e| {
            let err = DataError::NetworkUnreachable(e.to_string());
            if e.is_connect() || e.is_timeout() {
                Attempt::Retry(err)
            } else {
                Attempt::Fatal(err)
            }
        })?;

        let status = resp.status();
        match ChartStatus::from(status) {
            ChartStatus::Ok => {
                let chart: ChartResponse = resp.json().map_err(|e| {
                    Attempt::Fatal(DataError::ResponseFormatChanged(format!(
                        "failed to parse chart for {ticker}: {e}"
                    )))
                })?;
                Self::parse_response(ticker, chart).map_err(Attempt::Fatal)
            }
            ChartStatus::Banned => {
                self.circuit_breaker.trip();
                Err(Attempt::Fatal(DataError::CircuitBreakerTripped))
            }
            ChartStatus::UnknownTicker => Err(Attempt::Fatal(DataError::TickerNotFound {
                ticker: ticker.to_string(),
            })),
            ChartStatus::Throttled => {
                self.circuit_breaker.record_failure();
                Err(Attempt::Retry(DataError::RateLimited {
                    retry_after_secs: retry_after_secs(resp.headers()),
                }))
            }
            ChartStatus::Unavailable => {
                self.circuit_breaker.record_failure();
                Err(Attempt::Retry(DataError::Other(format!(
                    "HTTP {status} for {ticker}"
                ))))
            }
        }
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        tickers: &[String],
        period: Period,
        interval: Interval,
    ) -> Result<Vec<PriceRow>, DataError> {
        let results: Vec<(&String, Result<Vec<PriceRow>, DataError>)> = tickers
            .par_iter()
            .map(|ticker| (ticker, self.fetch_ticker(ticker, period, interval)))
            .collect();

        let mut rows = Vec::new();
        for (ticker, result) in results {
            match result {
                Ok(fetched) => {
                    tracing::debug!(ticker = %ticker, rows = fetched.len(), "fetched");
                    rows.extend(fetched);
                }
                Err(e) => tracing::warn!(ticker = %ticker, error = %e, "skipping ticker"),
            }
        }
        Ok(rows)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse(json: &str) -> Result<Vec<PriceRow>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_response("AAPL", resp)
    }

    #[test]
    fn parses_bars_and_skips_holidays() {
        // 2024-01-02, 2024-01-03 (holiday, all null), 2024-01-04 (no close)
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704205800,1704292200,1704378600],
            "indicators":{
                "quote":[{"open":[187.1,null,182.1],"high":[188.4,null,183.0],
                          "low":[183.8,null,180.8],"close":[185.6,null,null],
                          "volume":[82488700,null,71983600]}],
                "adjclose":[{"adjclose":[184.9,null,null]}]}}],"error":null}}"#;
        let rows = parse(json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ticker, "AAPL");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(rows[0].close, Some(185.6));
        assert_eq!(rows[0].adj_close, Some(184.9));
        assert_eq!(rows[0].volume, Some(82_488_700));
        assert_eq!(rows[1].close, None);
    }

    #[test]
    fn missing_timestamps_mean_no_rows() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn not_found_error_maps_to_ticker_not_found() {
        let json = r#"{"chart":{"result":null,
            "error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(parse(json), Err(DataError::TickerNotFound { .. })));
    }

    #[test]
    fn other_error_is_format_change() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"x"}}}"#;
        assert!(matches!(parse(json), Err(DataError::ResponseFormatChanged(_))));
    }

    #[test]
    fn status_classes() {
        use reqwest::StatusCode;
        assert_eq!(ChartStatus::from(StatusCode::OK), ChartStatus::Ok);
        assert_eq!(ChartStatus::from(StatusCode::FORBIDDEN), ChartStatus::Banned);
        assert_eq!(ChartStatus::from(StatusCode::NOT_FOUND), ChartStatus::UnknownTicker);
        assert_eq!(ChartStatus::from(StatusCode::TOO_MANY_REQUESTS), ChartStatus::Throttled);
        assert_eq!(ChartStatus::from(StatusCode::BAD_GATEWAY), ChartStatus::Unavailable);
    }

    #[test]
    fn retry_after_defaults_to_a_minute() {
        use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_secs(&headers), 60);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("17"));
        assert_eq!(retry_after_secs(&headers), 17);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"));
        assert_eq!(retry_after_secs(&headers), 60);
    }

    #[test]
    fn chart_url_carries_range_and_interval() {
        let provider = YahooProvider::new(Arc::new(CircuitBreaker::default_provider()))
            .unwrap()
            .with_base_url("http://localhost:9/");
        let url = provider.chart_url("MSFT", Period::TwoYears, Interval::Daily);
        assert_eq!(
            url,
            "http://localhost:9/v8/finance/chart/MSFT?range=2y&interval=1d&includeAdjustedClose=true"
        );
    }

    #[test]
    fn tripped_breaker_skips_every_ticker() {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        breaker.trip();
        let provider = YahooProvider::new(breaker).unwrap();
        assert!(!provider.is_available());
        let rows = provider
            .fetch(&["AAPL".to_string()], Period::OneMonth, Interval::Daily)
            .unwrap();
        assert!(rows.is_empty());
    }
}
