//! One forecast run, start to finish.
//!
//! ```text
//! bars -> indicators
//!      -> closes -> scaler -> windows -> train/eval split
//!      -> train -> evaluate -> autoregressive forecast
//! ```
//!
//! Every stage takes and returns plain values. Any failure aborts the run and
//! nothing partial is returned.

use market_data_ingestor::models::bar::BarSeries;
use tracing::info;

use crate::{
    config::ForecastConfig,
    errors::{ForecastError, Result},
    evaluation::{EvaluationSplit, evaluate},
    forecast::{ForecastSeries, ForecastSummary, forecast},
    indicators::IndicatorSeries,
    model::{SequenceRegressor, TrainConfig, TrainReport, build_regressor},
    progress::{InProgress, ProgressIndicator},
    scaling::MinMaxScaler,
    windowing::{make_windows, split_chronological},
};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub symbol: String,
    pub model_name: &'static str,
    pub indicators: IndicatorSeries,
    pub scaler: MinMaxScaler,
    pub train_report: TrainReport,
    pub evaluation: EvaluationSplit,
    pub forecast: ForecastSeries,
    pub summary: ForecastSummary,
}

/// Runs the pipeline with the regressor selected by `config.model.kind`.
pub fn run(
    series: &BarSeries,
    config: &ForecastConfig,
    progress: &dyn ProgressIndicator,
) -> Result<ForecastRun> {
    config.validate()?;
    let mut model = build_regressor(&config.model, config.window_length)?;
    run_with_model(series, config, model.as_mut(), progress)
}

/// Runs the pipeline with a caller-supplied, untrained regressor.
pub fn run_with_model(
    series: &BarSeries,
    config: &ForecastConfig,
    model: &mut dyn SequenceRegressor,
    progress: &dyn ProgressIndicator,
) -> Result<ForecastRun> {
    config.validate()?;
    let last_date = series.last_date().ok_or_else(|| ForecastError::NoData {
        symbol: series.symbol.clone(),
    })?;
    series.validate_daily()?;
    if model.input_len() != config.window_length {
        return Err(ForecastError::ShapeMismatch {
            expected: config.window_length,
            actual: model.input_len(),
        });
    }
    info!(
        symbol = %series.symbol,
        bars = series.len(),
        first = ?series.bars.first().map(|b| b.date()),
        %last_date,
        "starting forecast run"
    );

    let indicators = IndicatorSeries::compute(series, &config.indicators)?;

    let closes = series.closes();
    let scaler = MinMaxScaler::fit(&closes)?;
    let scaled = scaler.transform(&closes);
    let windows = make_windows(&scaled, config.window_length)?;
    let (train, eval) = split_chronological(&windows, config.train_ratio)?;
    if train.is_empty() {
        // Reported in closes: the smallest window count whose training share
        // is at least one, plus the first window's inputs.
        let windows_needed = (1usize..)
            .find(|&n| (n as f64 * config.train_ratio).floor() >= 1.0)
            .unwrap_or(1);
        return Err(ForecastError::InsufficientData {
            required: config.window_length + windows_needed,
            available: closes.len(),
        });
    }
    info!(
        train = train.len(),
        eval = eval.len(),
        window_length = config.window_length,
        "windows prepared"
    );

    let train_report = {
        let _progress = InProgress::start(
            progress,
            &format!("Training {} on {} windows", model.name(), train.len()),
        );
        model.train(train, &TrainConfig::from(&config.model))?
    };

    let evaluation = evaluate(model, eval, &scaler, series)?;

    let last_window = &scaled[scaled.len() - config.window_length..];
    let forecast = forecast(model, last_window, config.horizon_days, &scaler, last_date)?;
    let summary = forecast.summary();
    info!(
        horizon_days = forecast.len(),
        average = summary.average,
        high = summary.high,
        low = summary.low,
        "forecast ready"
    );

    Ok(ForecastRun {
        symbol: series.symbol.clone(),
        model_name: model.name(),
        indicators,
        scaler,
        train_report,
        evaluation,
        forecast,
        summary,
    })
}
