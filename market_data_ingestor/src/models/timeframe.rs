use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TimeFrameError {
    #[error("Invalid amount for {:?}: {}", unit, message)]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

/// A bar interval: amount × unit (e.g. 5-Minute, 1-Day).
///
/// Construction never fails; each provider validates the combinations its
/// API accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Self {
        Self { amount, unit }
    }

    pub fn day() -> Self {
        Self::new(1, TimeFrameUnit::Day)
    }

    pub fn is_daily(&self) -> bool {
        self.amount == 1 && self.unit == TimeFrameUnit::Day
    }

    /// Checks the amount ranges common to the stock data APIs:
    /// minutes 1-59, hours 1-23, days and weeks 1, months 1/2/3/6/12.
    pub fn validate(&self) -> Result<(), TimeFrameError> {
        let unit = self.unit;
        let amount = self.amount;
        let message = match unit {
            TimeFrameUnit::Minute if !(1..=59).contains(&amount) => {
                "Minute units can only be used with amounts between 1-59."
            }
            TimeFrameUnit::Hour if !(1..=23).contains(&amount) => {
                "Hour units can only be used with amounts 1-23"
            }
            TimeFrameUnit::Day | TimeFrameUnit::Week if amount != 1 => {
                "Day and Week units can only be used with amount 1"
            }
            TimeFrameUnit::Month if ![1, 2, 3, 6, 12].contains(&amount) => {
                "Month units can only be used with amount 1, 2, 3, 6 and 12"
            }
            _ => return Ok(()),
        };
        Err(TimeFrameError::InvalidAmount {
            unit,
            message: message.into(),
        })
    }
}

/// Renders the interval in the `1Day` / `5Min` form used by the REST APIs.
impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TimeFrameUnit::Minute => "Min",
            TimeFrameUnit::Hour => "Hour",
            TimeFrameUnit::Day => "Day",
            TimeFrameUnit::Week => "Week",
            TimeFrameUnit::Month => "Month",
        };
        write!(f, "{}{}", self.amount, unit)
    }
}
