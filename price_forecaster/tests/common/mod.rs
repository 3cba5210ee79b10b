#![allow(dead_code)]

use std::cell::RefCell;

use chrono::{Datelike, NaiveDate, Weekday};
use market_data_ingestor::models::bar::{Bar, BarSeries};
use price_forecaster::{
    config::{ForecastConfig, ModelKind},
    progress::ProgressIndicator,
};

/// Daily bars on consecutive weekdays starting 2024-01-01 (a Monday).
pub fn weekday_series(closes: &[f64]) -> BarSeries {
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let mut bars = Vec::with_capacity(closes.len());
    for &close in closes {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date = date.succ_opt().expect("date in range");
        }
        bars.push(Bar::daily(date, close, close * 1.01, close * 0.99, close, 1_000_000.0));
        date = date.succ_opt().expect("date in range");
    }
    BarSeries::daily("MSFT", bars)
}

/// A wavy upward drift, long enough for small windows.
pub fn wavy_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.2 * t + 3.0 * (t * 0.35).sin()
        })
        .collect()
}

/// Small, fast, reproducible configuration.
pub fn small_config(kind: ModelKind) -> ForecastConfig {
    let mut config = ForecastConfig::default();
    config.window_length = 10;
    config.horizon_days = 5;
    config.model.kind = kind;
    config.model.hidden_size = 4;
    config.model.epochs = 2;
    config.model.batch_size = 16;
    config.model.seed = Some(42);
    config
}

/// Records begin/end calls.
#[derive(Default)]
pub struct RecordingIndicator {
    pub events: RefCell<Vec<String>>,
}

impl ProgressIndicator for RecordingIndicator {
    fn begin(&self, message: &str) {
        self.events.borrow_mut().push(format!("begin {message}"));
    }

    fn end(&self) {
        self.events.borrow_mut().push("end".to_string());
    }
}
