use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{models::timeframe::TimeFrame, providers::alpaca_rest::AlpacaBarsParams};

/// Universal parameters for requesting time-series bar data from any market data provider.
///
/// This is the standard input for all [`DataProvider`](crate::providers::DataProvider)
/// implementations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// List of symbols to request (e.g., `["MSFT"]`).
    pub symbols: Vec<String>,

    /// The time interval for each bar (e.g., 1 minute, 1 day).
    ///
    /// **Validation of allowed values is performed by each data provider
    /// implementation, according to their own API rules.**
    #[serde(skip, default = "TimeFrame::day")]
    pub timeframe: TimeFrame,

    /// Start of the requested time range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested time range (exclusive, UTC).
    ///
    /// Providers should return bars strictly before this timestamp.
    pub end: DateTime<Utc>,

    /// Optional, provider-specific parameters.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

impl BarsRequestParams {
    /// Daily bars for one symbol covering `start` (inclusive) up to `end`
    /// (exclusive), both taken at midnight UTC.
    pub fn daily(symbol: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbols: vec![symbol.to_string()],
            timeframe: TimeFrame::day(),
            start: start.and_time(NaiveTime::MIN).and_utc(),
            end: end.and_time(NaiveTime::MIN).and_utc(),
            provider_specific: ProviderParams::None,
        }
    }
}

/// Provider-specific request parameters.
///
/// Lets callers pass detailed, per-request options for a particular provider
/// without cluttering the universal [`BarsRequestParams`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ProviderParams {
    #[default]
    None,
    Alpaca(AlpacaBarsParams),
}
