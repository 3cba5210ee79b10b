use std::path::PathBuf;

use market_data_ingestor::{models::bar::SeriesError, providers::ProviderError};
use shared_utils::config::ConfigError;
use thiserror::Error;

/// Everything that can stop a forecast run.
///
/// A run is all-or-nothing: any of these aborts it before a forecast is
/// produced or exported.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The market data source returned nothing for the requested range.
    #[error("no price data available for {symbol}")]
    NoData { symbol: String },

    /// Min-max scaling needs at least two distinct finite values.
    #[error("cannot fit scaler: {0}")]
    DegenerateRange(String),

    /// Too few points to form even one training window.
    #[error("insufficient data: at least {required} required, {available} available")]
    InsufficientData { required: usize, available: usize },

    /// A window's length disagrees with the model's input length.
    #[error("window has {actual} values but the model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid price series: {0}")]
    InvalidSeries(#[from] SeriesError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to export forecast to {}: {source}", path.display())]
    Export { path: PathBuf, source: csv::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("market data error: {0}")]
    Provider(#[from] ProviderError),
}

pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
