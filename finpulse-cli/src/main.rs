//! FinPulse CLI — run the ingest pipeline and read back what it stored.
//!
//! Commands:
//! - `run` (default) — fetch prices, compute analytics and risk, print a summary
//! - `tickers` — list tickers with stored prices
//! - `prices` — page through stored prices for one ticker as JSON lines
//! - `risk` — print the latest risk row for one ticker
//! - `export` — write prices/analytics/risk CSV files into a directory
//!
//! Configuration precedence: flags, then environment (and `.env`), then the
//! `--config` TOML file, then built-in defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use finpulse_core::data::{CircuitBreaker, YahooProvider};
use finpulse_core::store::Store;
use finpulse_runner::{
    export_csv, parse_tickers, run_pipeline, ConfigOverrides, PipelineConfig, PriceQuery,
    QueryService,
};

#[derive(Parser)]
#[command(
    name = "finpulse",
    about = "FinPulse — daily price ingest, analytics and risk metrics"
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Pipeline settings. Each flag falls back to its environment variable.
#[derive(Args)]
struct SettingsArgs {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data provider identifier. Only `yfinance` is supported.
    #[arg(long, env = "DATA_PROVIDER", global = true)]
    provider: Option<String>,

    /// SQLite database file.
    #[arg(long, env = "DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Comma-separated ticker list (e.g., AAPL,MSFT).
    #[arg(long, env = "TICKERS", global = true)]
    tickers: Option<String>,

    /// Lookback period: 1d 5d 1mo 3mo 6mo 1y 2y 5y 10y ytd max.
    #[arg(long, env = "PRICE_PERIOD", global = true)]
    period: Option<String>,

    /// Bar interval: 1d 1wk 1mo.
    #[arg(long, env = "PRICE_INTERVAL", global = true)]
    interval: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ingest pipeline (the default).
    Run,
    /// List tickers with stored prices.
    Tickers,
    /// Print stored prices for a ticker as JSON lines.
    Prices {
        ticker: String,

        /// First date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Page size, clamped to 1..=500. Defaults to 100.
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Rows to skip.
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<i64>,
    },
    /// Print the latest risk row for a ticker as JSON.
    Risk { ticker: String },
    /// Export stored rows as CSV files.
    Export {
        /// Output directory.
        #[arg(long)]
        out: PathBuf,

        /// Tickers to export. Defaults to every stored ticker.
        #[arg(value_name = "TICKER")]
        symbols: Vec<String>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.settings)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_cmd(&config),
        Commands::Tickers => tickers_cmd(&config),
        Commands::Prices {
            ticker,
            start,
            end,
            limit,
            offset,
        } => prices_cmd(&config, &ticker, start, end, limit, offset),
        Commands::Risk { ticker } => risk_cmd(&config, &ticker),
        Commands::Export { out, symbols } => export_cmd(&config, &symbols, out),
    }
}

fn resolve_config(args: SettingsArgs) -> Result<PipelineConfig> {
    let overrides = ConfigOverrides {
        provider: args.provider,
        store_location: args.db_path,
        tickers: args.tickers,
        period: args.period,
        interval: args.interval,
    };
    PipelineConfig::resolve(args.config.as_deref(), overrides).context("invalid configuration")
}

fn run_cmd(config: &PipelineConfig) -> Result<()> {
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(circuit_breaker).context("failed to build HTTP client")?;

    let summary = run_pipeline(config, &provider).context("pipeline run failed")?;
    println!("{summary}");

    let code = summary.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Open the store for a read command. A missing database file is an error.
fn open_store(config: &PipelineConfig) -> Result<Store> {
    let store = Store::open_existing(&config.store_location).with_context(|| {
        format!("failed to open store at {}", config.store_location.display())
    })?;
    store.init_schema()?;
    Ok(store)
}

fn tickers_cmd(config: &PipelineConfig) -> Result<()> {
    let store = open_store(config)?;
    for ticker in QueryService::new(&store).tickers()? {
        println!("{ticker}");
    }
    Ok(())
}

fn prices_cmd(
    config: &PipelineConfig,
    ticker: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<()> {
    let store = open_store(config)?;
    let mut query = PriceQuery::new(ticker).between(start, end);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    if let Some(offset) = offset {
        query = query.offset(offset);
    }

    for row in QueryService::new(&store).prices(&query)? {
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}

fn risk_cmd(config: &PipelineConfig, ticker: &str) -> Result<()> {
    let store = open_store(config)?;
    match QueryService::new(&store).latest_risk(ticker)? {
        Some(row) => println!("{}", serde_json::to_string_pretty(&row)?),
        None => println!("No risk metrics for {} (insufficient history)", ticker.to_uppercase()),
    }
    Ok(())
}

fn export_cmd(config: &PipelineConfig, tickers: &[String], out: PathBuf) -> Result<()> {
    let store = open_store(config)?;
    let tickers = parse_tickers(&tickers.join(","));
    for path in export_csv(&store, &tickers, &out)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
