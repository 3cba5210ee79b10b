//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! This struct is used as the standard output for all [`DataProvider`](crate::providers::DataProvider)
//! implementations. For the forecaster a daily [`BarSeries`] is the price
//! series: one bar per trading day, strictly ascending.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::models::timeframe::TimeFrame;

/// A single time-series bar (OHLCV) for a given timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The timestamp for this bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: f64,

    /// Trade count for the bar. Not all providers supply this.
    pub trade_count: Option<u64>,

    /// Volume-weighted average price. Not all providers supply this.
    pub vwap: Option<f64>,
}

impl Bar {
    /// Builds a daily bar stamped at midnight UTC of `date`.
    pub fn daily(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp: date.and_time(NaiveTime::MIN).and_utc(),
            open,
            high,
            low,
            close,
            volume,
            trade_count: None,
            vwap: None,
        }
    }

    /// Trading date of the bar.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    fn first_invalid_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite() || *v < 0.0)
        .map(|(name, _)| name)
    }
}

/// Violations of the daily price series invariants.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("series for {symbol} contains no bars")]
    Empty { symbol: String },

    #[error("bar {index} ({date}) does not come strictly after the previous trading day")]
    NotIncreasing { index: usize, date: NaiveDate },

    #[error("bar {index} ({date}) has a negative or non-finite {field}")]
    InvalidValue {
        index: usize,
        date: NaiveDate,
        field: &'static str,
    },
}

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`TimeFrame`], making the data set self-describing.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "MSFT").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// The collection of OHLCV bars.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn daily(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: TimeFrame::day(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(Bar::date).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(Bar::date)
    }

    /// Checks the daily price series invariants: at least one bar, strictly
    /// increasing trading dates, and non-negative finite prices and volume.
    pub fn validate_daily(&self) -> Result<(), SeriesError> {
        if self.bars.is_empty() {
            return Err(SeriesError::Empty {
                symbol: self.symbol.clone(),
            });
        }

        let mut previous: Option<NaiveDate> = None;
        for (index, bar) in self.bars.iter().enumerate() {
            let date = bar.date();
            if let Some(field) = bar.first_invalid_field() {
                return Err(SeriesError::InvalidValue { index, date, field });
            }
            if previous.is_some_and(|p| date <= p) {
                return Err(SeriesError::NotIncreasing { index, date });
            }
            previous = Some(date);
        }
        Ok(())
    }
}
