//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching time-series bar data from any market data vendor.
//!
//! Each concrete provider implementation should implement [`DataProvider`] to
//! handle vendor-specific API logic and validation. Two ship with the crate:
//! [`alpaca_rest::AlpacaProvider`] (network) and [`csv_file::CsvFileProvider`]
//! (local files).
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{
//!     bar::BarSeries,
//!     request_params::BarsRequestParams,
//! };
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         _params: BarsRequestParams,
//!     ) -> Result<Vec<BarSeries>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod alpaca_rest;
pub mod csv_file;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu, ensure};
use tracing::{debug, info};

use crate::models::{bar::BarSeries, request_params::BarsRequestParams};

/// Trait for fetching time-series bar data from a market data provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches time-series bar data for the given request parameters.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BarSeries>)` - A vector of bar series, one per symbol that had data.
    /// * `Err(ProviderError)` - If the request fails.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// Local data directory is missing.
    #[snafu(display("Data directory {} does not exist", path.display()))]
    MissingDataDir {
        path: std::path::PathBuf,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message (e.g., invalid API key).
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// The requested range produced no bars for the symbol.
    #[snafu(display("No data found for {symbol} between {start} and {end}"))]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
        backtrace: Backtrace,
    },

    /// A local data file could not be read.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A local data file had a malformed row.
    #[snafu(display("Malformed CSV in {}: {source}", path.display()))]
    Csv {
        path: std::path::PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

/// Fetches the daily price series of one symbol over `[start, end)`.
///
/// One request, no retries. A range that yields no bars is an error rather
/// than an empty series, since nothing downstream can work with it.
pub async fn fetch_daily_bars(
    provider: &dyn DataProvider,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BarSeries, ProviderError> {
    ensure!(
        start < end,
        ValidationSnafu {
            message: format!("start date {start} must be before end date {end}"),
        }
    );

    info!(symbol, %start, %end, "fetching daily bars");
    let params = BarsRequestParams::daily(symbol, start, end);
    let series = provider.fetch_bars(params).await?;

    let found = series
        .into_iter()
        .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
        .filter(|s| !s.bars.is_empty());

    match found {
        Some(series) => {
            debug!(symbol, bars = series.len(), "daily bars received");
            Ok(series)
        }
        None => NoDataSnafu {
            symbol,
            start,
            end,
        }
        .fail(),
    }
}
