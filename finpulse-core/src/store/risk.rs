use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{Store, StoreError};
use crate::domain::RiskRow;

const UPSERT_RISK: &str = r#"
INSERT INTO risk (ticker, as_of_date, var_95_1d, sharpe, max_drawdown)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(ticker, as_of_date) DO UPDATE SET
    var_95_1d = excluded.var_95_1d,
    sharpe = excluded.sharpe,
    max_drawdown = excluded.max_drawdown
"#;

const RISK_COLUMNS: &str = "ticker, as_of_date, var_95_1d, sharpe, max_drawdown";

fn risk_from_row(row: &Row<'_>) -> rusqlite::Result<RiskRow> {
    Ok(RiskRow {
        ticker: row.get(0)?,
        as_of_date: row.get(1)?,
        var_95_1d: row.get(2)?,
        sharpe: row.get(3)?,
        max_drawdown: row.get(4)?,
    })
}

impl Store {
    /// Insert or overwrite risk rows by `(ticker, as_of_date)`. Returns rows affected.
    pub fn upsert_risk(&mut self, rows: &[RiskRow]) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut affected = 0;
        {
            let mut stmt = tx.prepare_cached(UPSERT_RISK)?;
            for r in rows {
                affected += stmt.execute(params![
                    r.ticker,
                    r.as_of_date,
                    r.var_95_1d,
                    r.sharpe,
                    r.max_drawdown,
                ])?;
            }
        }
        tx.commit()?;
        Ok(affected)
    }

    /// Risk row for an exact `(ticker, as_of_date)`.
    pub fn risk(&self, ticker: &str, as_of_date: NaiveDate) -> Result<Option<RiskRow>, StoreError> {
        let sql = format!("SELECT {RISK_COLUMNS} FROM risk WHERE ticker = ?1 AND as_of_date = ?2");
        Ok(self
            .conn
            .query_row(&sql, params![ticker, as_of_date], risk_from_row)
            .optional()?)
    }

    /// Most recent risk row for a ticker.
    pub fn latest_risk(&self, ticker: &str) -> Result<Option<RiskRow>, StoreError> {
        let sql = format!(
            "SELECT {RISK_COLUMNS} FROM risk WHERE ticker = ?1 ORDER BY as_of_date DESC LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![ticker], risk_from_row)
            .optional()?)
    }
}
