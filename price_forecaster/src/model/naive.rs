use tracing::debug;

use super::{SequenceRegressor, TrainConfig, TrainReport, check_training_set, check_window};
use crate::{
    config::ModelConfig,
    errors::{ForecastError, Result},
    windowing::Window,
};

/// Persistence baseline: tomorrow looks like today.
///
/// Has nothing to learn, so training only measures how well that holds on the
/// training windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaiveRegressor {
    input_len: usize,
}

impl NaiveRegressor {
    pub fn new(input_len: usize) -> Self {
        Self { input_len }
    }
}

impl SequenceRegressor for NaiveRegressor {
    fn build(_config: &ModelConfig, input_len: usize) -> Result<Self> {
        if input_len == 0 {
            return Err(ForecastError::InvalidConfig(
                "input length must be positive".into(),
            ));
        }
        Ok(Self::new(input_len))
    }

    fn name(&self) -> &'static str {
        "naive persistence"
    }

    fn input_len(&self) -> usize {
        self.input_len
    }

    fn train(&mut self, windows: &[Window], config: &TrainConfig) -> Result<TrainReport> {
        check_training_set(self.input_len, windows, config)?;
        let loss = windows
            .iter()
            .map(|w| {
                let e = w.input[w.input.len() - 1] - w.target;
                e * e
            })
            .sum::<f64>()
            / windows.len() as f64;
        debug!(loss, "persistence baseline measured");
        Ok(TrainReport {
            epoch_losses: vec![loss],
        })
    }

    fn predict_one(&self, window: &[f64]) -> Result<f64> {
        check_window(self.input_len, window)?;
        window.last().copied().ok_or(ForecastError::ShapeMismatch {
            expected: self.input_len,
            actual: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicts_last_value() {
        let model = NaiveRegressor::new(3);
        assert_eq!(model.predict_one(&[0.1, 0.2, 0.7]).unwrap(), 0.7);
        assert!(model.predict_one(&[0.1]).is_err());
    }

    #[test]
    fn train_reports_persistence_error() {
        let mut model = NaiveRegressor::new(2);
        let windows = vec![
            Window {
                input: vec![0.0, 0.5],
                target: 1.0,
            },
            Window {
                input: vec![0.5, 1.0],
                target: 1.0,
            },
        ];
        let report = model.train(&windows, &TrainConfig::default()).unwrap();
        assert_eq!(report.epoch_losses, vec![0.125]);
    }
}
