use chrono::NaiveDate;
use rusqlite::params;

use super::{Store, StoreError};
use crate::domain::AnalyticsRow;

const UPSERT_ANALYTICS: &str = r#"
INSERT INTO analytics (ticker, date, daily_return, ma20, ma50, vol20)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT(ticker, date) DO UPDATE SET
    daily_return = excluded.daily_return,
    ma20 = excluded.ma20,
    ma50 = excluded.ma50,
    vol20 = excluded.vol20
"#;

impl Store {
    /// Insert or overwrite analytics rows by `(ticker, date)`. Returns rows affected.
    pub fn upsert_analytics(&mut self, rows: &[AnalyticsRow]) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut affected = 0;
        {
            let mut stmt = tx.prepare_cached(UPSERT_ANALYTICS)?;
            for r in rows {
                affected += stmt.execute(params![
                    r.ticker,
                    r.date,
                    r.daily_return,
                    r.ma20,
                    r.ma50,
                    r.vol20,
                ])?;
            }
        }
        tx.commit()?;
        Ok(affected)
    }

    /// Analytics for one ticker within optional inclusive bounds, dated ascending.
    pub fn analytics(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<AnalyticsRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ticker, date, daily_return, ma20, ma50, vol20 FROM analytics \
             WHERE ticker = ?1 \
               AND (?2 IS NULL OR date >= ?2) \
               AND (?3 IS NULL OR date <= ?3) \
             ORDER BY date ASC",
        )?;
        let rows = stmt
            .query_map(params![ticker, start, end], |row| {
                Ok(AnalyticsRow {
                    ticker: row.get(0)?,
                    date: row.get(1)?,
                    daily_return: row.get(2)?,
                    ma20: row.get(3)?,
                    ma50: row.get(4)?,
                    vol20: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn row(day: u32, ret: Option<f64>) -> AnalyticsRow {
        AnalyticsRow {
            ticker: "AAPL".into(),
            date: d(day),
            daily_return: ret,
            ma20: None,
            ma50: None,
            vol20: None,
        }
    }

    #[test]
    fn upsert_overwrites_by_key() {
        let mut store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store.upsert_analytics(&[row(1, None), row(2, Some(0.1))]).unwrap();
        store.upsert_analytics(&[row(2, Some(0.2))]).unwrap();

        let stored = store.analytics("AAPL", None, None).unwrap();
        assert_eq!(stored, vec![row(1, None), row(2, Some(0.2))]);
        assert_eq!(store.analytics("AAPL", Some(d(2)), None).unwrap().len(), 1);
    }

    #[test]
    fn empty_upsert_is_noop() {
        let mut store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        assert_eq!(store.upsert_analytics(&[]).unwrap(), 0);
    }
}
