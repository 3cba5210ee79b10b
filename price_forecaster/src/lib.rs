//! Single-stock closing price forecaster.
//!
//! Turns a daily [`BarSeries`](market_data_ingestor::models::bar::BarSeries)
//! into RSI/MACD indicators, min-max scaled training windows, a trained
//! sequence regressor and an autoregressive multi-day forecast.
//!
//! - [`pipeline::run`] wires the stages together.
//! - [`model::SequenceRegressor`] is the seam for swapping models.
//! - [`export`] and [`report`] render a finished [`pipeline::ForecastRun`].

pub mod config;
pub mod errors;
pub mod evaluation;
pub mod export;
pub mod forecast;
pub mod indicators;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod scaling;
pub mod windowing;

pub use errors::{ForecastError, Result};
