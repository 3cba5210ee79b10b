//! Sequence-to-one regressors.
//!
//! A regressor maps a window of scaled closes to the next scaled close. The
//! pipeline only talks to [`SequenceRegressor`], so the recurrent network can
//! be swapped for the persistence baseline (or a test double) from config.

mod adam;
mod bilstm;
mod lstm;
mod naive;

pub use adam::{Adam, Moments};
pub use bilstm::BiLstmRegressor;
pub use naive::NaiveRegressor;

use crate::{
    config::{ModelConfig, ModelKind},
    errors::{ForecastError, Result},
    windowing::Window,
};

/// Mini-batch schedule for one training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 5,
            batch_size: 64,
        }
    }
}

impl From<&ModelConfig> for TrainConfig {
    fn from(config: &ModelConfig) -> Self {
        Self {
            epochs: config.epochs,
            batch_size: config.batch_size,
        }
    }
}

/// Mean squared error (on scaled values) after each epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    pub epoch_losses: Vec<f64>,
}

impl TrainReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }
}

pub trait SequenceRegressor {
    /// Creates an untrained model reading windows of `input_len` values.
    fn build(config: &ModelConfig, input_len: usize) -> Result<Self>
    where
        Self: Sized;

    fn name(&self) -> &'static str;

    /// Window length the model was built for.
    fn input_len(&self) -> usize;

    fn train(&mut self, windows: &[Window], config: &TrainConfig) -> Result<TrainReport>;

    /// Predicts the value following `window`. Never changes the model.
    fn predict_one(&self, window: &[f64]) -> Result<f64>;
}

/// Builds the regressor selected by `config.kind`.
pub fn build_regressor(
    config: &ModelConfig,
    input_len: usize,
) -> Result<Box<dyn SequenceRegressor>> {
    Ok(match config.kind {
        ModelKind::Bilstm => Box::new(BiLstmRegressor::build(config, input_len)?),
        ModelKind::Naive => Box::new(NaiveRegressor::build(config, input_len)?),
    })
}

pub(crate) fn check_window(expected: usize, window: &[f64]) -> Result<()> {
    if window.len() == expected {
        Ok(())
    } else {
        Err(ForecastError::ShapeMismatch {
            expected,
            actual: window.len(),
        })
    }
}

pub(crate) fn check_training_set(
    input_len: usize,
    windows: &[Window],
    config: &TrainConfig,
) -> Result<()> {
    if config.epochs == 0 || config.batch_size == 0 {
        return Err(ForecastError::InvalidConfig(
            "epochs and batch_size must be positive".into(),
        ));
    }
    if windows.is_empty() {
        return Err(ForecastError::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    windows
        .iter()
        .try_for_each(|w| check_window(input_len, &w.input))
}
