//! Actual-vs-predicted comparison on the held-out windows.

use chrono::NaiveDate;
use market_data_ingestor::models::bar::BarSeries;
use ndarray::Array1;

use crate::{
    errors::{ForecastError, Result},
    model::SequenceRegressor,
    scaling::MinMaxScaler,
    windowing::Window,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingRow {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationRow {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// Error metrics in price units (MAPE in percent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    /// `None` when every actual is zero.
    pub mape: Option<f64>,
}

impl Metrics {
    /// `None` for empty input.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Option<Self> {
        if actual.is_empty() || actual.len() != predicted.len() {
            return None;
        }
        let actual = Array1::from_vec(actual.to_vec());
        let diff = &actual - &Array1::from_vec(predicted.to_vec());

        let mse = diff.mapv(|d| d * d).mean()?;
        let mae = diff.mapv(f64::abs).mean()?;

        let ratios: Vec<f64> = actual
            .iter()
            .zip(diff.iter())
            .filter(|(a, _)| **a != 0.0)
            .map(|(a, d)| (d / a).abs())
            .collect();
        let mape = (!ratios.is_empty())
            .then(|| ratios.iter().sum::<f64>() / ratios.len() as f64 * 100.0);

        Some(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            mape,
        })
    }
}

/// Closes the model trained on, followed by its predictions for the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSplit {
    pub training: Vec<TrainingRow>,
    pub evaluation: Vec<EvaluationRow>,
    pub metrics: Option<Metrics>,
}

/// Predicts every evaluation window and lines the results up with the last
/// `eval_windows.len()` trading days of `series`.
pub fn evaluate(
    model: &dyn SequenceRegressor,
    eval_windows: &[Window],
    scaler: &MinMaxScaler,
    series: &BarSeries,
) -> Result<EvaluationSplit> {
    let n = eval_windows.len();
    if n > series.len() {
        return Err(ForecastError::InsufficientData {
            required: n,
            available: series.len(),
        });
    }
    let cut = series.len() - n;

    let predicted = eval_windows
        .iter()
        .map(|w| model.predict_one(&w.input).map(|s| scaler.to_original(s)))
        .collect::<Result<Vec<f64>>>()?;

    let training = series.bars[..cut]
        .iter()
        .map(|b| TrainingRow {
            date: b.date(),
            close: b.close,
        })
        .collect();
    let evaluation: Vec<EvaluationRow> = series.bars[cut..]
        .iter()
        .zip(&predicted)
        .map(|(b, &predicted)| EvaluationRow {
            date: b.date(),
            actual: b.close,
            predicted,
        })
        .collect();

    let actual: Vec<f64> = evaluation.iter().map(|r| r.actual).collect();
    Ok(EvaluationSplit {
        training,
        metrics: Metrics::compute(&actual, &predicted),
        evaluation,
    })
}

#[cfg(test)]
mod tests {
    use market_data_ingestor::models::bar::Bar;

    use super::*;
    use crate::{model::NaiveRegressor, windowing::make_windows};

    #[test]
    fn metrics_by_hand() {
        let m = Metrics::compute(&[10.0, 20.0], &[12.0, 18.0]).unwrap();
        assert_eq!(m.mse, 4.0);
        assert_eq!(m.rmse, 2.0);
        assert_eq!(m.mae, 2.0);
        assert!((m.mape.unwrap() - 15.0).abs() < 1e-12);
        assert!(Metrics::compute(&[], &[]).is_none());
        assert_eq!(Metrics::compute(&[0.0], &[1.0]).unwrap().mape, None);
    }

    #[test]
    fn evaluation_rows_align_with_last_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::daily(start + chrono::Days::new(i as u64), c, c, c, c, 1.0))
            .collect();
        let series = BarSeries::daily("MSFT", bars);
        let scaler = MinMaxScaler::fit(&closes).unwrap();
        let windows = make_windows(&scaler.transform(&closes), 2).unwrap();

        let split = evaluate(&NaiveRegressor::new(2), &windows[2..], &scaler, &series).unwrap();

        assert_eq!(split.training.len(), 4);
        assert_eq!(split.evaluation.len(), 2);
        assert_eq!(split.evaluation[0].date, series.dates()[4]);
        assert_eq!(split.evaluation[0].actual, 14.0);
        assert!((split.evaluation[0].predicted - 13.0).abs() < 1e-9);
        assert!((split.metrics.unwrap().mae - 1.0).abs() < 1e-9);
    }
}
