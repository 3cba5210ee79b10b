//! Run configuration.
//!
//! Every field has a default, so an empty TOML file (or none at all) yields
//! the stock setup: MSFT, 60-day windows, an 80/20 split, a 7-day horizon and
//! a 50-unit bidirectional LSTM trained for 5 epochs in batches of 64.
//!
//! ```toml
//! symbol = "AAPL"
//! horizon_days = 10
//!
//! [model]
//! kind = "bilstm"
//! epochs = 8
//! seed = 42
//!
//! [indicators]
//! rsi_window = 14
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared_utils::config::load_toml;

use crate::errors::{ForecastError, Result};

/// Longest forecast horizon accepted, in business days.
pub const MAX_HORIZON_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub symbol: String,
    /// Number of past closes the model sees per prediction.
    pub window_length: usize,
    /// Share of windows used for training; the rest are held out for evaluation.
    pub train_ratio: f64,
    pub horizon_days: usize,
    /// History fetched when no explicit start date is given.
    pub history_years: u32,
    pub model: ModelConfig,
    pub indicators: IndicatorConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            symbol: "MSFT".to_string(),
            window_length: 60,
            train_ratio: 0.8,
            horizon_days: 7,
            history_years: 10,
            model: ModelConfig::default(),
            indicators: IndicatorConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Loads a config file. Missing keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return invalid("symbol must not be empty");
        }
        if self.window_length == 0 {
            return invalid("window_length must be positive");
        }
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return invalid(format!(
                "train_ratio must be in (0, 1), got {}",
                self.train_ratio
            ));
        }
        validate_horizon(self.horizon_days)?;
        self.model.validate()?;
        self.indicators.validate()
    }
}

pub(crate) fn validate_horizon(days: usize) -> Result<()> {
    if (1..=MAX_HORIZON_DAYS).contains(&days) {
        Ok(())
    } else {
        invalid(format!(
            "horizon must be between 1 and {MAX_HORIZON_DAYS} days, got {days}"
        ))
    }
}

fn invalid<T>(message: impl Into<String>) -> Result<T> {
    Err(ForecastError::InvalidConfig(message.into()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    Bilstm,
    /// Repeats the last value of the window. Useful as a baseline.
    Naive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub kind: ModelKind,
    /// Hidden units per direction.
    pub hidden_size: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Fixes weight initialization for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::Bilstm,
            hidden_size: 50,
            epochs: 5,
            batch_size: 64,
            learning_rate: 0.001,
            seed: None,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_size == 0 {
            return invalid("model.hidden_size must be positive");
        }
        if self.epochs == 0 {
            return invalid("model.epochs must be positive");
        }
        if self.batch_size == 0 {
            return invalid("model.batch_size must be positive");
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid("model.learning_rate must be a positive number");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorConfig {
    pub rsi_window: usize,
    pub macd_short: usize,
    pub macd_long: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_window: 14,
            macd_short: 12,
            macd_long: 26,
            macd_signal: 9,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<()> {
        let spans = [
            ("rsi_window", self.rsi_window),
            ("macd_short", self.macd_short),
            ("macd_long", self.macd_long),
            ("macd_signal", self.macd_signal),
        ];
        match spans.iter().find(|(_, v)| *v == 0) {
            Some((name, _)) => invalid(format!("indicators.{name} must be positive")),
            None => Ok(()),
        }
    }
}
