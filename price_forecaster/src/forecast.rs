//! Autoregressive multi-day forecasting.
//!
//! Each prediction is appended to the window the next prediction reads, as if
//! it were an observed close. Errors compound over the horizon; nothing
//! corrects or discounts them.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::{
    config::validate_horizon,
    errors::{ForecastError, Result},
    model::{SequenceRegressor, check_window},
    scaling::MinMaxScaler,
};

/// The `n` weekdays strictly after `last`. No holiday calendar.
pub fn business_days_after(last: NaiveDate, n: usize) -> Vec<NaiveDate> {
    std::iter::successors(last.succ_opt(), |d| d.succ_opt())
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(n)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Predicted closes for consecutive business days. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    points: Vec<ForecastPoint>,
}

/// Average, high and low of a forecast, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSummary {
    pub average: f64,
    pub high: f64,
    pub low: f64,
}

impl ForecastSeries {
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// `(YYYY-MM-DD, price)` pairs in date order.
    pub fn records(&self) -> Vec<(String, f64)> {
        self.points
            .iter()
            .map(|p| (p.date.format("%Y-%m-%d").to_string(), p.price))
            .collect()
    }

    pub fn summary(&self) -> ForecastSummary {
        let (sum, high, low) = self.points.iter().fold(
            (0.0, f64::NEG_INFINITY, f64::INFINITY),
            |(sum, high, low), p| (sum + p.price, high.max(p.price), low.min(p.price)),
        );
        ForecastSummary {
            average: round_cents(sum / self.points.len() as f64),
            high: round_cents(high),
            low: round_cents(low),
        }
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Projects `horizon_days` business days past `last_date`.
///
/// `last_window` holds the most recent scaled closes, oldest first, and must
/// match the model's input length. The result depends only on the model and
/// the window.
pub fn forecast(
    model: &dyn SequenceRegressor,
    last_window: &[f64],
    horizon_days: usize,
    scaler: &MinMaxScaler,
    last_date: NaiveDate,
) -> Result<ForecastSeries> {
    validate_horizon(horizon_days)?;
    check_window(model.input_len(), last_window)?;

    let dates = business_days_after(last_date, horizon_days);
    if dates.len() < horizon_days {
        return Err(ForecastError::InvalidConfig(format!(
            "cannot place {horizon_days} business days after {last_date}"
        )));
    }

    let (_, scaled) = (0..horizon_days).try_fold(
        (last_window.to_vec(), Vec::with_capacity(horizon_days)),
        |(window, mut predictions), _| {
            let next = model.predict_one(&window)?;
            predictions.push(next);
            let window: Vec<f64> = window[1..]
                .iter()
                .copied()
                .chain(std::iter::once(next))
                .collect();
            Ok::<_, ForecastError>((window, predictions))
        },
    )?;

    let points = dates
        .into_iter()
        .zip(scaled)
        .map(|(date, s)| ForecastPoint {
            date,
            price: scaler.to_original(s),
        })
        .collect();
    debug!(model = model.name(), horizon_days, "forecast produced");
    Ok(ForecastSeries { points })
}
