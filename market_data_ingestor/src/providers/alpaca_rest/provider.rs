use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{bar::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu,
        MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu,
        alpaca_rest::{
            params::{AlpacaBarsParams, Adjustment, construct_params, validate_timeframe},
            response::{AlpacaBar, AlpacaResponse},
        },
    },
};

const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

pub struct AlpacaProvider {
    client: Client,
    defaults: AlpacaBarsParams,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables. Bars are split- and dividend-adjusted unless a
    /// request says otherwise.
    pub fn new() -> Result<Self, ProviderInitError> {
        let api_key =
            SecretString::new(get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?.into());
        let secret_key = SecretString::new(
            get_env_var("APCA_API_SECRET_KEY")
                .context(MissingEnvVarSnafu)?
                .into(),
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(secret_key.expose_secret())
                .context(InvalidApiKeySnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            defaults: AlpacaBarsParams {
                adjustment: Some(Adjustment::All),
                ..Default::default()
            },
        })
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        // Validate the timeframe before proceeding.
        validate_timeframe(&params.timeframe)?;

        let mut all_bars: IndexMap<String, Vec<AlpacaBar>> = IndexMap::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut query_params = construct_params(&params, &self.defaults);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }

            let response = self
                .client
                .get(BASE_URL)
                .query(&query_params)
                .send()
                .await
                .context(ReqwestSnafu)?;

            if !response.status().is_success() {
                let status = response.status();
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown API error".to_string());
                return ApiSnafu {
                    message: format!("{status}: {error_msg}"),
                }
                .fail();
            }

            let alpaca_response = response
                .json::<AlpacaResponse>()
                .await
                .context(ReqwestSnafu)?;
            pages += 1;

            // Merge the bars from the current page into our collection.
            for (symbol, bars) in alpaca_response.bars.unwrap_or_default() {
                all_bars.entry(symbol).or_default().extend(bars);
            }

            match alpaca_response.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }

        debug!(pages, symbols = all_bars.len(), "alpaca bars fetched");

        let result = all_bars
            .into_iter()
            .map(|(symbol, alpaca_bars)| BarSeries {
                symbol,
                timeframe: params.timeframe.clone(),
                bars: alpaca_bars.into_iter().map(Into::into).collect(),
            })
            .collect();

        Ok(result)
    }
}
