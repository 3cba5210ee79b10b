use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::{
    models::{
        request_params::{BarsRequestParams, ProviderParams},
        timeframe::TimeFrame,
    },
    providers::{ProviderError, ValidationSnafu},
};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
    Otc,
}

/// Specifies the sort order for the bars.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    Asc,
    Desc,
}

/// Alpaca-specific parameters for a bars request.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

fn wire_name<T: Serialize>(value: &T) -> Option<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Rejects timeframes the bars endpoint does not accept.
pub fn validate_timeframe(timeframe: &TimeFrame) -> Result<(), ProviderError> {
    timeframe.validate().map_err(|e| {
        ValidationSnafu {
            message: e.to_string(),
        }
        .build()
    })
}

/// Builds the query string for one page of the bars endpoint.
///
/// `defaults` fills in Alpaca options the request itself leaves unset.
pub fn construct_params(
    params: &BarsRequestParams,
    defaults: &AlpacaBarsParams,
) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), params.symbols.join(",")),
        ("timeframe".to_string(), params.timeframe.to_string()),
        (
            "start".to_string(),
            params.start.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "end".to_string(),
            params.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
    ];

    let specific = match &params.provider_specific {
        ProviderParams::Alpaca(p) => p,
        ProviderParams::None => defaults,
    };

    if let Some(adjustment) = specific.adjustment.or(defaults.adjustment) {
        query.extend(wire_name(&adjustment).map(|v| ("adjustment".to_string(), v)));
    }
    if let Some(feed) = specific.feed.or(defaults.feed) {
        query.extend(wire_name(&feed).map(|v| ("feed".to_string(), v)));
    }
    if let Some(currency) = specific.currency.as_ref().or(defaults.currency.as_ref()) {
        query.push(("currency".to_string(), currency.clone()));
    }
    if let Some(limit) = specific.limit.or(defaults.limit) {
        query.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(sort) = specific.sort.or(defaults.sort) {
        query.extend(wire_name(&sort).map(|v| ("sort".to_string(), v)));
    }

    query
}
