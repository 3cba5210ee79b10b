//! Terminal tables for a finished run.

use market_data_ingestor::models::bar::BarSeries;
use tabled::{Table, Tabled};

use crate::{
    evaluation::EvaluationSplit,
    forecast::{ForecastSeries, ForecastSummary},
    indicators::IndicatorSeries,
    pipeline::ForecastRun,
};

/// Rows shown from the end of each historical table.
pub const TAIL_ROWS: usize = 5;

#[derive(Tabled)]
struct PriceRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Open")]
    open: String,
    #[tabled(rename = "High")]
    high: String,
    #[tabled(rename = "Low")]
    low: String,
    #[tabled(rename = "Close")]
    close: String,
    #[tabled(rename = "Volume")]
    volume: String,
}

#[derive(Tabled)]
struct IndicatorTableRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Close")]
    close: String,
    #[tabled(rename = "RSI")]
    rsi: String,
    #[tabled(rename = "MACD")]
    macd: String,
    #[tabled(rename = "Signal")]
    signal: String,
}

#[derive(Tabled)]
struct EvaluationTableRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Predicted")]
    predicted: String,
}

#[derive(Tabled)]
struct ForecastTableRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Predicted")]
    predicted: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Average")]
    average: String,
    #[tabled(rename = "High")]
    high: String,
    #[tabled(rename = "Low")]
    low: String,
}

fn money(v: f64) -> String {
    format!("{v:.2}")
}

pub fn price_table(series: &BarSeries, rows: usize) -> String {
    let start = series.len().saturating_sub(rows);
    let rows = series.bars[start..].iter().map(|b| PriceRow {
        date: b.date().to_string(),
        open: money(b.open),
        high: money(b.high),
        low: money(b.low),
        close: money(b.close),
        volume: format!("{:.0}", b.volume),
    });
    Table::new(rows).to_string()
}

pub fn indicator_table(indicators: &IndicatorSeries, rows: usize) -> String {
    let rows = indicators.tail(rows).into_iter().map(|r| IndicatorTableRow {
        date: r.date.to_string(),
        close: money(r.close),
        rsi: r.rsi.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
        macd: format!("{:.4}", r.macd),
        signal: format!("{:.4}", r.signal),
    });
    Table::new(rows).to_string()
}

pub fn evaluation_table(split: &EvaluationSplit, rows: usize) -> String {
    let start = split.evaluation.len().saturating_sub(rows);
    let rows = split.evaluation[start..].iter().map(|r| EvaluationTableRow {
        date: r.date.to_string(),
        actual: money(r.actual),
        predicted: money(r.predicted),
    });
    let mut out = Table::new(rows).to_string();
    if let Some(m) = split.metrics {
        let mape = m.mape.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"));
        out.push_str(&format!(
            "\nRMSE {:.4}  MAE {:.4}  MAPE {mape}  ({} training days, {} evaluated)",
            m.rmse,
            m.mae,
            split.training.len(),
            split.evaluation.len()
        ));
    }
    out
}

pub fn forecast_table(forecast: &ForecastSeries) -> String {
    let rows = forecast
        .records()
        .into_iter()
        .map(|(date, price)| ForecastTableRow {
            date,
            predicted: money(price),
        });
    Table::new(rows).to_string()
}

pub fn summary_table(summary: &ForecastSummary) -> String {
    Table::new([SummaryRow {
        average: money(summary.average),
        high: money(summary.high),
        low: money(summary.low),
    }])
    .to_string()
}

/// The full report printed after a successful run.
pub fn render(series: &BarSeries, run: &ForecastRun) -> String {
    let loss = run
        .train_report
        .final_loss()
        .map_or_else(|| "n/a".to_string(), |l| format!("{l:.6}"));
    [
        format!("{} historical prices (last {TAIL_ROWS} days)", run.symbol),
        price_table(series, TAIL_ROWS),
        "Technical indicators".to_string(),
        indicator_table(&run.indicators, TAIL_ROWS),
        format!("{} fit (final training loss {loss})", run.model_name),
        evaluation_table(&run.evaluation, TAIL_ROWS),
        format!("{}-day forecast", run.forecast.len()),
        forecast_table(&run.forecast),
        "Forecast summary".to_string(),
        summary_table(&run.summary),
    ]
    .join("\n\n")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use market_data_ingestor::models::bar::Bar;

    use super::*;

    #[test]
    fn price_table_shows_tail_only() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..8)
            .map(|i| {
                let c = 100.0 + f64::from(i);
                Bar::daily(start + chrono::Days::new(i as u64), c, c, c, c, 1000.0)
            })
            .collect();
        let table = price_table(&BarSeries::daily("MSFT", bars), 5);

        assert!(table.contains("Close"));
        assert!(table.contains("107.00"));
        assert!(table.contains("103.00"));
        assert!(!table.contains("102.00"));
    }

    #[test]
    fn summary_table_has_two_decimals() {
        let table = summary_table(&ForecastSummary {
            average: 101.5,
            high: 103.0,
            low: 99.25,
        });
        assert!(table.contains("Average"));
        assert!(table.contains("101.50"));
        assert!(table.contains("99.25"));
    }
}
