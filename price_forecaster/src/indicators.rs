//! Technical indicators over a close-price series.
//!
//! Indicators are informational: they are shown alongside the prices but are
//! not fed to the model.

use chrono::NaiveDate;
use market_data_ingestor::models::bar::BarSeries;

use crate::{
    config::IndicatorConfig,
    errors::{ForecastError, Result},
};

/// Relative Strength Index over a simple rolling mean of gains and losses.
///
/// The first delta is taken as zero, so every entry from `window - 1` onwards
/// is defined; earlier entries are `None`. A window without losses scores 100,
/// flat windows included.
pub fn compute_rsi(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(ForecastError::InvalidConfig(
            "RSI window must be positive".into(),
        ));
    }

    let deltas: Vec<f64> = std::iter::once(0.0)
        .chain(closes.windows(2).map(|w| w[1] - w[0]))
        .take(closes.len())
        .collect();

    let mut rsi = vec![None; closes.len()];
    for (i, window_deltas) in deltas.windows(window).enumerate() {
        let gain: f64 = window_deltas.iter().map(|d| d.max(0.0)).sum();
        let loss: f64 = window_deltas.iter().map(|d| (-d).max(0.0)).sum();
        rsi[i + window - 1] = Some(rsi_value(gain / window as f64, loss / window as f64));
    }
    Ok(rsi)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// Exponential moving average seeded with the first value,
/// `k = 2 / (span + 1)`.
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    if span == 0 {
        return Err(ForecastError::InvalidConfig(
            "EMA span must be positive".into(),
        ));
    }
    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            None => v,
            Some(p) => v * k + p * (1.0 - k),
        };
        out.push(next);
        prev = Some(next);
    }
    Ok(out)
}

/// MACD line and signal line, plus the two EMAs they derive from.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub ema_short: Vec<f64>,
    pub ema_long: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

pub fn compute_macd(closes: &[f64], short: usize, long: usize, signal: usize) -> Result<MacdSeries> {
    let ema_short = ema(closes, short)?;
    let ema_long = ema(closes, long)?;
    let macd: Vec<f64> = ema_short.iter().zip(&ema_long).map(|(s, l)| s - l).collect();
    let signal = ema(&macd, signal)?;
    Ok(MacdSeries {
        ema_short,
        ema_long,
        macd,
        signal,
    })
}

/// One trading day of indicator values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
    pub macd: f64,
    pub signal: f64,
}

/// Indicators aligned with the dates of the series they were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub rsi: Vec<Option<f64>>,
    pub macd: MacdSeries,
}

impl IndicatorSeries {
    pub fn compute(series: &BarSeries, config: &IndicatorConfig) -> Result<Self> {
        let closes = series.closes();
        let rsi = compute_rsi(&closes, config.rsi_window)?;
        let macd = compute_macd(
            &closes,
            config.macd_short,
            config.macd_long,
            config.macd_signal,
        )?;
        Ok(Self {
            dates: series.dates(),
            closes,
            rsi,
            macd,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<IndicatorRow> {
        Some(IndicatorRow {
            date: *self.dates.get(i)?,
            close: self.closes[i],
            rsi: self.rsi[i],
            macd: self.macd.macd[i],
            signal: self.macd.signal[i],
        })
    }

    /// The most recent `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> Vec<IndicatorRow> {
        (self.len().saturating_sub(n)..self.len())
            .filter_map(|i| self.row(i))
            .collect()
    }
}
