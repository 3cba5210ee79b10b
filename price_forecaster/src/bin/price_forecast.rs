use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use market_data_ingestor::providers::{
    DataProvider, alpaca_rest::AlpacaProvider, csv_file::CsvFileProvider, fetch_daily_bars,
};
use price_forecaster::{
    config::ForecastConfig, export::export_forecast, pipeline, progress::SpinnerIndicator, report,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILTER: &str = "price_forecaster=info,market_data_ingestor=info";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProviderKind {
    /// Alpaca market data REST API (needs APCA_API_KEY_ID / APCA_API_SECRET_KEY).
    Alpaca,
    /// `<SYMBOL>.csv` files in --data-dir.
    Csv,
}

#[derive(Parser)]
#[command(version, about = "Forecast a stock's closing price for the next business days")]
struct Cli {
    /// Ticker symbol [default: MSFT, or the config file's]
    #[arg(long)]
    symbol: Option<String>,

    /// First day of history (inclusive) [default: `history_years` before --end]
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: Option<NaiveDate>,

    /// Last day of history (exclusive) [default: today]
    #[arg(long, value_name = "YYYY-MM-DD")]
    end: Option<NaiveDate>,

    /// Business days to forecast, 1-30 [default: 7]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=30))]
    days: Option<u8>,

    /// TOML config file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ProviderKind::Alpaca)]
    provider: ProviderKind,

    /// Directory holding CSV price files (with --provider csv)
    #[arg(long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Write the forecast as CSV to this file
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Seed for weight initialization
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn forecast_config(&self) -> Result<ForecastConfig> {
        let mut config = match &self.config {
            Some(path) => ForecastConfig::load(path)?,
            None => ForecastConfig::default(),
        };
        if let Some(symbol) = &self.symbol {
            config.symbol = symbol.to_ascii_uppercase();
        }
        if let Some(days) = self.days {
            config.horizon_days = usize::from(days);
        }
        if self.seed.is_some() {
            config.model.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }

    fn date_range(&self, history_years: u32) -> Result<(NaiveDate, NaiveDate)> {
        let end = self.end.unwrap_or_else(|| Utc::now().date_naive());
        let start = match self.start {
            Some(start) => start,
            None => end
                .checked_sub_months(Months::new(history_years.saturating_mul(12)))
                .context("history start date out of range")?,
        };
        Ok((start, end))
    }

    fn provider(&self) -> Result<Box<dyn DataProvider>> {
        let provider: Box<dyn DataProvider> = match self.provider {
            ProviderKind::Alpaca => Box::new(AlpacaProvider::new()?),
            ProviderKind::Csv => Box::new(CsvFileProvider::new(&self.data_dir)?),
        };
        Ok(provider)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.forecast_config()?;
    let (start, end) = cli.date_range(config.history_years)?;
    let provider = cli.provider()?;
    info!(
        symbol = %config.symbol,
        %start,
        %end,
        provider = ?cli.provider,
        "price-forecast starting"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let series = runtime
        .block_on(fetch_daily_bars(provider.as_ref(), &config.symbol, start, end))
        .with_context(|| format!("fetching {} prices from {start} to {end}", config.symbol))?;

    let spinner = SpinnerIndicator::new();
    let run = pipeline::run(&series, &config, &spinner)?;

    println!("{}", report::render(&series, &run));

    if let Some(path) = &cli.output {
        export_forecast(path, &run.forecast)?;
        println!("\nForecast saved to {}", path.display());
    }
    Ok(())
}
