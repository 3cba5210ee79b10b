use std::fs;

use chrono::NaiveDate;
use market_data_ingestor::providers::{
    ProviderError, csv_file::CsvFileProvider, fetch_daily_bars,
};
use tempfile::TempDir;

const MSFT: &str = "\
Date,Open,High,Low,Close,Volume
2024-01-02,370.0,375.9,366.5,370.87,25258600
2024-01-03,369.0,373.2,368.5,370.60,23083500
2024-01-04,370.6,372.9,366.5,367.94,20901500
2024-01-05,368.9,370.9,365.1,367.75,20987000
2024-01-08,369.3,375.2,369.0,374.69,23134000
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn provider_with_msft() -> (TempDir, CsvFileProvider) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("MSFT.csv"), MSFT).unwrap();
    let provider = CsvFileProvider::new(dir.path()).unwrap();
    (dir, provider)
}

#[tokio::test]
async fn range_end_is_exclusive() {
    let (_dir, provider) = provider_with_msft();

    let series = fetch_daily_bars(&provider, "MSFT", date(2024, 1, 3), date(2024, 1, 5))
        .await
        .unwrap();

    assert_eq!(series.dates(), vec![date(2024, 1, 3), date(2024, 1, 4)]);
    assert!(series.validate_daily().is_ok());
}

#[tokio::test]
async fn range_without_bars_is_no_data() {
    let (_dir, provider) = provider_with_msft();

    let err = fetch_daily_bars(&provider, "MSFT", date(2023, 1, 1), date(2023, 6, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::NoData { .. }));
}

#[tokio::test]
async fn unknown_symbol_is_no_data() {
    let (_dir, provider) = provider_with_msft();

    let err = fetch_daily_bars(&provider, "ZZZZ", date(2024, 1, 1), date(2024, 2, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::NoData { ref symbol, .. } if symbol == "ZZZZ"));
}
