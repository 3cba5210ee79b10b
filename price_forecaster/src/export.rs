//! Forecast CSV export: a `Date,Predicted` header and one row per day.

use std::{io, path::Path};

use serde::Serialize;
use tracing::info;

use crate::{
    errors::{ForecastError, Result},
    forecast::ForecastSeries,
};

#[derive(Serialize)]
struct ForecastRecord<'a> {
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Predicted")]
    predicted: f64,
}

/// Writes the forecast as CSV to any writer.
pub fn write_forecast<W: io::Write>(writer: W, forecast: &ForecastSeries) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (date, predicted) in forecast.records() {
        csv.serialize(ForecastRecord {
            date: &date,
            predicted,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the forecast to `path`, replacing any existing file.
pub fn export_forecast(path: impl AsRef<Path>, forecast: &ForecastSeries) -> Result<()> {
    let path = path.as_ref();
    let export_error = |source| ForecastError::Export {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(|e| export_error(csv::Error::from(e)))?;
    write_forecast(io::BufWriter::new(file), forecast).map_err(export_error)?;
    info!(path = %path.display(), rows = forecast.len(), "forecast exported");
    Ok(())
}
