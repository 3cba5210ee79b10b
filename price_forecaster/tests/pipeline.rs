mod common;

use chrono::{Datelike, Weekday};
use common::{RecordingIndicator, small_config, wavy_closes, weekday_series};
use market_data_ingestor::models::bar::BarSeries;
use price_forecaster::{
    ForecastError, Result,
    config::{ModelConfig, ModelKind},
    model::{SequenceRegressor, TrainConfig, TrainReport},
    pipeline::{run, run_with_model},
    progress::SilentIndicator,
    windowing::Window,
};

#[test]
fn naive_run_forecasts_business_days_after_last_close() {
    let closes = wavy_closes(60);
    let series = weekday_series(&closes);
    let config = small_config(ModelKind::Naive);

    let result = run(&series, &config, &SilentIndicator).unwrap();

    assert_eq!(result.forecast.len(), 5);
    let last = series.last_date().unwrap();
    let dates: Vec<_> = result.forecast.points().iter().map(|p| p.date).collect();
    assert!(dates[0] > last);
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    assert!(dates.iter().all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));

    // Persistence repeats the last close for every day.
    let last_close = *closes.last().unwrap();
    assert!(result.forecast.prices().iter().all(|p| (p - last_close).abs() < 1e-9));
    assert!((result.summary.high - last_close).abs() <= 0.005 + 1e-9);
    assert_eq!(result.summary.high, result.summary.low);

    // 50 windows, 40 for training, 10 evaluated against the last 10 closes.
    assert_eq!(result.evaluation.evaluation.len(), 10);
    assert_eq!(result.evaluation.training.len(), 50);
    assert_eq!(result.indicators.len(), 60);
}

#[test]
fn bilstm_run_is_reproducible_with_seed() {
    let series = weekday_series(&wavy_closes(80));
    let config = small_config(ModelKind::Bilstm);

    let first = run(&series, &config, &SilentIndicator).unwrap();
    let second = run(&series, &config, &SilentIndicator).unwrap();

    assert_eq!(first.model_name, "bidirectional LSTM");
    assert_eq!(first.train_report.epoch_losses.len(), 2);
    assert_eq!(first.forecast, second.forecast);
    assert!(first.forecast.prices().iter().all(|p| p.is_finite()));
}

#[test]
fn constant_prices_are_degenerate() {
    let series = weekday_series(&[5.0; 5]);
    let err = run(&series, &small_config(ModelKind::Naive), &SilentIndicator).unwrap_err();
    assert!(matches!(err, ForecastError::DegenerateRange(_)));
}

#[test]
fn five_points_cannot_fill_sixty_day_window() {
    let series = weekday_series(&[10.0, 11.0, 12.0, 11.5, 12.5]);
    let mut config = small_config(ModelKind::Naive);
    config.window_length = 60;

    let err = run(&series, &config, &SilentIndicator).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientData {
            available: 5,
            ..
        }
    ));
}

#[test]
fn one_window_leaves_nothing_to_train_on() {
    // Window 10 over 11 closes is one window; floor(1 * 0.8) trains on none.
    let config = small_config(ModelKind::Naive);
    let err = run(&weekday_series(&wavy_closes(11)), &config, &SilentIndicator).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientData {
            required: 12,
            available: 11,
        }
    ));
    assert_eq!(
        err.to_string(),
        "insufficient data: at least 12 required, 11 available"
    );

    assert!(run(&weekday_series(&wavy_closes(12)), &config, &SilentIndicator).is_ok());
}

#[test]
fn empty_series_is_no_data() {
    let series = BarSeries::daily("MSFT", vec![]);
    let err = run(&series, &small_config(ModelKind::Naive), &SilentIndicator).unwrap_err();
    assert!(matches!(err, ForecastError::NoData { ref symbol } if symbol == "MSFT"));
}

#[test]
fn out_of_order_series_is_invalid() {
    let mut series = weekday_series(&wavy_closes(30));
    series.bars.swap(3, 4);
    let err = run(&series, &small_config(ModelKind::Naive), &SilentIndicator).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidSeries(_)));
}

#[test]
fn horizon_above_thirty_is_rejected() {
    let series = weekday_series(&wavy_closes(40));
    let mut config = small_config(ModelKind::Naive);
    config.horizon_days = 31;
    let err = run(&series, &config, &SilentIndicator).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidConfig(_)));
}

/// Fails every training attempt.
struct Untrainable;

impl SequenceRegressor for Untrainable {
    fn build(_: &ModelConfig, _: usize) -> Result<Self> {
        Ok(Self)
    }
    fn name(&self) -> &'static str {
        "untrainable"
    }
    fn input_len(&self) -> usize {
        10
    }
    fn train(&mut self, _: &[Window], _: &TrainConfig) -> Result<TrainReport> {
        Err(ForecastError::InvalidConfig("refusing to train".into()))
    }
    fn predict_one(&self, _: &[f64]) -> Result<f64> {
        Ok(0.5)
    }
}

#[test]
fn progress_is_cleared_when_training_fails() {
    let series = weekday_series(&wavy_closes(40));
    let indicator = RecordingIndicator::default();

    let err = run_with_model(
        &series,
        &small_config(ModelKind::Naive),
        &mut Untrainable,
        &indicator,
    )
    .unwrap_err();

    assert!(matches!(err, ForecastError::InvalidConfig(_)));
    let events = indicator.events.borrow();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("begin Training untrainable"));
    assert_eq!(events[1], "end");
}

#[test]
fn progress_is_cleared_after_success() {
    let series = weekday_series(&wavy_closes(40));
    let indicator = RecordingIndicator::default();

    run(&series, &small_config(ModelKind::Naive), &indicator).unwrap();

    assert_eq!(indicator.events.borrow().last().map(String::as_str), Some("end"));
}

#[test]
fn injected_model_must_match_window_length() {
    let series = weekday_series(&wavy_closes(40));
    let mut config = small_config(ModelKind::Naive);
    config.window_length = 12;

    let err = run_with_model(&series, &config, &mut Untrainable, &SilentIndicator).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::ShapeMismatch {
            expected: 12,
            actual: 10
        }
    ));
}
