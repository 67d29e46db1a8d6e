//! On-disk store behavior: persistence across reopen, schema reuse, scoped release.

use chrono::NaiveDate;
use finpulse_core::domain::{AnalyticsRow, PriceRow, RiskRow};
use finpulse_core::store::{PriceRange, Store, Table};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

#[test]
fn rows_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.db");

    {
        let mut store = Store::open(&path).unwrap();
        store.init_schema().unwrap();
        store
            .upsert_prices(&[PriceRow::from_close("AAPL", d(1), 10.0)])
            .unwrap();
        store
            .upsert_analytics(&[AnalyticsRow {
                ticker: "AAPL".into(),
                date: d(1),
                daily_return: None,
                ma20: None,
                ma50: None,
                vol20: None,
            }])
            .unwrap();
        store
            .upsert_risk(&[RiskRow {
                ticker: "AAPL".into(),
                as_of_date: d(1),
                var_95_1d: Some(-0.03),
                sharpe: None,
                max_drawdown: -0.2,
            }])
            .unwrap();
        // dropped here
    }

    let store = Store::open(&path).unwrap();
    store.init_schema().unwrap();
    for table in Table::ALL {
        assert_eq!(store.count(table).unwrap(), 1, "{}", table.name());
    }
    let risk = store.latest_risk("AAPL").unwrap().unwrap();
    assert_eq!(risk.sharpe, None);
    assert_eq!(risk.var_95_1d, Some(-0.03));
    store.close().unwrap();
}

#[test]
fn second_batch_only_overwrites_matching_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(dir.path().join("market.db")).unwrap();
    store.init_schema().unwrap();

    let first: Vec<_> = (1..=5)
        .map(|day| PriceRow::from_close("MSFT", d(day), 1.0))
        .collect();
    store.upsert_prices(&first).unwrap();

    let second: Vec<_> = (4..=8)
        .map(|day| PriceRow::from_close("MSFT", d(day), 2.0))
        .collect();
    store.upsert_prices(&second).unwrap();

    let all = store.prices("MSFT", &PriceRange::default()).unwrap();
    assert_eq!(all.len(), 8);
    let closes: Vec<f64> = all.iter().filter_map(|r| r.close).collect();
    assert_eq!(closes, vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
}
