//! Read-side queries over a populated store.

use chrono::NaiveDate;
use thiserror::Error;

use finpulse_core::domain::{AnalyticsRow, PriceRow, RiskRow};
use finpulse_core::store::{PriceRange, Store, StoreError};

/// Page size when a query gives none.
pub const DEFAULT_LIMIT: u32 = 100;
/// Largest page a single query may read.
pub const MAX_LIMIT: u32 = 500;

/// Errors from read-side queries.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("ticker not found: {0}")]
    TickerNotFound(String),
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// A paged price lookup for one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    pub ticker: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub limit: u32,
    pub offset: u32,
}

impl PriceQuery {
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            start: None,
            end: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Clamp into `1..=MAX_LIMIT`.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit.clamp(1, i64::from(MAX_LIMIT)) as u32;
        self
    }

    /// Negative offsets read from the start.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = u32::try_from(offset.max(0)).unwrap_or(u32::MAX);
        self
    }

    fn range(&self) -> PriceRange {
        PriceRange {
            start: self.start,
            end: self.end,
            limit: Some(self.limit),
            offset: self.offset,
        }
    }
}

/// Query facade over a [`Store`].
pub struct QueryService<'a> {
    store: &'a Store,
}

impl<'a> QueryService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Every ticker with stored prices, sorted.
    pub fn tickers(&self) -> Result<Vec<String>, QueryError> {
        Ok(self.store.tickers()?)
    }

    /// One page of prices. Unknown tickers are an error, not an empty page.
    pub fn prices(&self, query: &PriceQuery) -> Result<Vec<PriceRow>, QueryError> {
        if let (Some(start), Some(end)) = (query.start, query.end) {
            if start > end {
                return Err(QueryError::InvalidRange { start, end });
            }
        }
        self.require_ticker(&query.ticker)?;
        Ok(self.store.prices(&query.ticker, &query.range())?)
    }

    /// Newest risk row for `ticker`, `None` if risk was never computed for it.
    pub fn latest_risk(&self, ticker: &str) -> Result<Option<RiskRow>, QueryError> {
        let ticker = ticker.trim().to_uppercase();
        self.require_ticker(&ticker)?;
        Ok(self.store.latest_risk(&ticker)?)
    }

    pub fn analytics(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<AnalyticsRow>, QueryError> {
        let ticker = ticker.trim().to_uppercase();
        self.require_ticker(&ticker)?;
        Ok(self.store.analytics(&ticker, start, end)?)
    }

    fn require_ticker(&self, ticker: &str) -> Result<(), QueryError> {
        if self.store.ticker_exists(ticker)? {
            Ok(())
        } else {
            Err(QueryError::TickerNotFound(ticker.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn seeded() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        let rows: Vec<_> = (1..=20)
            .map(|day| PriceRow::from_close("AAPL", d(day), day as f64))
            .collect();
        store.upsert_prices(&rows).unwrap();
        store
    }

    #[test]
    fn limit_and_offset_are_clamped() {
        assert_eq!(PriceQuery::new("aapl").limit, DEFAULT_LIMIT);
        assert_eq!(PriceQuery::new("aapl").limit(0).limit, 1);
        assert_eq!(PriceQuery::new("aapl").limit(10_000).limit, MAX_LIMIT);
        assert_eq!(PriceQuery::new("aapl").offset(-5).offset, 0);
        assert_eq!(PriceQuery::new(" aapl ").ticker, "AAPL");
    }

    #[test]
    fn prices_page_through_range() {
        let store = seeded();
        let service = QueryService::new(&store);
        let query = PriceQuery::new("aapl")
            .between(Some(d(5)), Some(d(15)))
            .limit(3)
            .offset(2);
        let rows = service.prices(&query).unwrap();
        let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(7), d(8), d(9)]);
    }

    #[test]
    fn unknown_ticker_is_not_found() {
        let store = seeded();
        let service = QueryService::new(&store);
        assert!(matches!(
            service.prices(&PriceQuery::new("zzzz")),
            Err(QueryError::TickerNotFound(t)) if t == "ZZZZ"
        ));
        assert!(matches!(
            service.latest_risk("zzzz"),
            Err(QueryError::TickerNotFound(_))
        ));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let store = seeded();
        let service = QueryService::new(&store);
        let query = PriceQuery::new("AAPL").between(Some(d(10)), Some(d(1)));
        assert!(matches!(
            service.prices(&query),
            Err(QueryError::InvalidRange { .. })
        ));
    }

    #[test]
    fn known_ticker_without_risk_reads_none() {
        let store = seeded();
        let service = QueryService::new(&store);
        assert_eq!(service.latest_risk("AAPL").unwrap(), None);
        assert_eq!(service.tickers().unwrap(), vec!["AAPL"]);
    }
}
