//! Local daily bars read from `<SYMBOL>.csv` files.
//!
//! Files carry a `Date,Open,High,Low,Close,Volume` header (extra columns such
//! as `Adj Close` are ignored) with dates in `YYYY-MM-DD` form. Only daily
//! requests are supported.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{
        CsvSnafu, DataProvider, IoSnafu, MissingDataDirSnafu, ProviderError, ProviderInitError,
        ValidationSnafu,
    },
};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar::daily(row.date, row.open, row.high, row.low, row.close, row.volume)
    }
}

/// Serves bars from a directory of per-symbol CSV files.
#[derive(Debug, Clone)]
pub struct CsvFileProvider {
    dir: PathBuf,
}

impl CsvFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ProviderInitError> {
        let dir = dir.into();
        ensure!(dir.is_dir(), MissingDataDirSnafu { path: dir });
        Ok(Self { dir })
    }

    /// Path of the file holding `symbol`'s bars.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_ascii_uppercase()))
    }

    fn read_bars(&self, path: &Path) -> Result<Vec<Bar>, ProviderError> {
        let file = std::fs::File::open(path).context(IoSnafu { path })?;
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

        reader
            .deserialize::<CsvRow>()
            .map(|row| row.map(Bar::from).context(CsvSnafu { path }))
            .collect()
    }
}

#[async_trait]
impl DataProvider for CsvFileProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        ensure!(
            params.timeframe.is_daily(),
            ValidationSnafu {
                message: format!("CSV files hold daily bars only, got {}", params.timeframe),
            }
        );

        let mut result = Vec::with_capacity(params.symbols.len());
        for symbol in &params.symbols {
            let path = self.path_for(symbol);
            if !path.exists() {
                debug!(symbol, path = %path.display(), "no CSV file for symbol");
                continue;
            }

            let mut bars: Vec<Bar> = self
                .read_bars(&path)?
                .into_iter()
                .filter(|b| b.timestamp >= params.start && b.timestamp < params.end)
                .collect();
            bars.sort_by_key(|b| b.timestamp);
            debug!(symbol, bars = bars.len(), "CSV bars loaded");

            result.push(BarSeries::daily(symbol.clone(), bars));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;
    use crate::models::timeframe::{TimeFrame, TimeFrameUnit};

    fn write_file(dir: &TempDir, name: &str, body: &str) {
        let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn missing_directory_is_init_error() {
        let err = CsvFileProvider::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, ProviderInitError::MissingDataDir { .. }));
    }

    #[tokio::test]
    async fn rows_are_sorted_and_extra_columns_ignored() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "MSFT.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-03,2,3,1,2.5,2.4,200\n\
             2024-01-02,1,2,0.5,1.5,1.4,100\n",
        );
        let provider = CsvFileProvider::new(dir.path()).unwrap();

        let series = provider
            .fetch_bars(BarsRequestParams::daily("msft", date(1, 1), date(2, 1)))
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].closes(), vec![1.5, 2.5]);
        assert_eq!(series[0].dates(), vec![date(1, 2), date(1, 3)]);
    }

    #[tokio::test]
    async fn intraday_request_is_rejected() {
        let dir = TempDir::new().unwrap();
        let provider = CsvFileProvider::new(dir.path()).unwrap();
        let mut params = BarsRequestParams::daily("MSFT", date(1, 1), date(2, 1));
        params.timeframe = TimeFrame::new(5, TimeFrameUnit::Minute);

        let err = provider.fetch_bars(params).await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }

    #[tokio::test]
    async fn malformed_row_names_the_file() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "BAD.csv", "Date,Open,High,Low,Close,Volume\nnot-a-date,1,1,1,1,1\n");
        let provider = CsvFileProvider::new(dir.path()).unwrap();

        let err = provider
            .fetch_bars(BarsRequestParams::daily("BAD", date(1, 1), date(2, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Csv { .. }));
        assert!(err.to_string().contains("BAD.csv"));
    }
}
