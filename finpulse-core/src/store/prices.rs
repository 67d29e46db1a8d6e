use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{Store, StoreError};
use crate::domain::PriceRow;

const UPSERT_PRICE: &str = r#"
INSERT INTO prices (ticker, date, open, high, low, close, adj_close, volume)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
ON CONFLICT(ticker, date) DO UPDATE SET
    open = excluded.open,
    high = excluded.high,
    low = excluded.low,
    close = excluded.close,
    adj_close = excluded.adj_close,
    volume = excluded.volume
"#;

const PRICE_COLUMNS: &str = "ticker, date, open, high, low, close, adj_close, volume";

/// Date window and paging for price reads. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// `None` reads every matching row.
    pub limit: Option<u32>,
    pub offset: u32,
}

fn price_from_row(row: &Row<'_>) -> rusqlite::Result<PriceRow> {
    Ok(PriceRow {
        ticker: row.get(0)?,
        date: row.get(1)?,
        open: row.get(2)?,
        high: row.get(3)?,
        low: row.get(4)?,
        close: row.get(5)?,
        adj_close: row.get(6)?,
        volume: row.get(7)?,
    })
}

impl Store {
    /// Insert or overwrite price rows by `(ticker, date)`. Returns rows affected.
    pub fn upsert_prices(&mut self, rows: &[PriceRow]) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut affected = 0;
        {
            let mut stmt = tx.prepare_cached(UPSERT_PRICE)?;
            for r in rows {
                affected += stmt.execute(params![
                    r.ticker, r.date, r.open, r.high, r.low, r.close, r.adj_close, r.volume,
                ])?;
            }
        }
        tx.commit()?;
        Ok(affected)
    }

    /// Point read by natural key.
    pub fn price(&self, ticker: &str, date: NaiveDate) -> Result<Option<PriceRow>, StoreError> {
        let sql = format!("SELECT {PRICE_COLUMNS} FROM prices WHERE ticker = ?1 AND date = ?2");
        Ok(self
            .conn
            .query_row(&sql, params![ticker, date], price_from_row)
            .optional()?)
    }

    /// Range read for one ticker, ordered by date ascending.
    pub fn prices(&self, ticker: &str, range: &PriceRange) -> Result<Vec<PriceRow>, StoreError> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = range.limit.map_or(-1, i64::from);
        let sql = format!(
            "SELECT {PRICE_COLUMNS} FROM prices \
             WHERE ticker = ?1 \
               AND (?2 IS NULL OR date >= ?2) \
               AND (?3 IS NULL OR date <= ?3) \
             ORDER BY date ASC LIMIT ?4 OFFSET ?5"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![ticker, range.start, range.end, limit, i64::from(range.offset)],
                price_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Whether any price row exists for `ticker`.
    pub fn ticker_exists(&self, ticker: &str) -> Result<bool, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM prices WHERE ticker = ?1",
            params![ticker],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    /// Distinct tickers with stored prices, sorted.
    pub fn tickers(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT ticker FROM prices ORDER BY ticker")?;
        let tickers = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tickers)
    }
}
