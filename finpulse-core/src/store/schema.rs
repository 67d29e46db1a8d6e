//! Table definitions. Every statement is `IF NOT EXISTS`, so applying the
//! schema to an initialized database is a no-op.

pub const PRICES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS prices (
    ticker TEXT NOT NULL,
    date TEXT NOT NULL,
    open REAL,
    high REAL,
    low REAL,
    close REAL,
    adj_close REAL,
    volume INTEGER,
    PRIMARY KEY (ticker, date)
);
"#;

pub const ANALYTICS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS analytics (
    ticker TEXT NOT NULL,
    date TEXT NOT NULL,
    daily_return REAL,
    ma20 REAL,
    ma50 REAL,
    vol20 REAL,
    PRIMARY KEY (ticker, date)
);
"#;

pub const RISK_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS risk (
    ticker TEXT NOT NULL,
    as_of_date TEXT NOT NULL,
    var_95_1d REAL,
    sharpe REAL,
    max_drawdown REAL,
    PRIMARY KEY (ticker, as_of_date)
);
"#;

/// The three tables the store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Prices,
    Analytics,
    Risk,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Prices, Table::Analytics, Table::Risk];

    pub fn name(self) -> &'static str {
        match self {
            Table::Prices => "prices",
            Table::Analytics => "analytics",
            Table::Risk => "risk",
        }
    }

    pub(crate) fn ddl(self) -> &'static str {
        match self {
            Table::Prices => PRICES_TABLE,
            Table::Analytics => ANALYTICS_TABLE,
            Table::Risk => RISK_TABLE,
        }
    }
}
