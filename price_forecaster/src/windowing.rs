use crate::errors::{ForecastError, Result};

/// A fixed run of consecutive scaled closes and the value that followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub input: Vec<f64>,
    pub target: f64,
}

/// Slides a `window_length` cursor one step at a time over `scaled`.
///
/// A series of length `L` yields `L - window_length` windows; window `k`
/// covers `scaled[k..k + window_length]` and targets `scaled[k + window_length]`.
pub fn make_windows(scaled: &[f64], window_length: usize) -> Result<Vec<Window>> {
    if window_length == 0 {
        return Err(ForecastError::InvalidConfig(
            "window_length must be positive".into(),
        ));
    }
    if scaled.len() <= window_length {
        return Err(ForecastError::InsufficientData {
            required: window_length + 1,
            available: scaled.len(),
        });
    }

    Ok(scaled
        .windows(window_length + 1)
        .map(|w| Window {
            input: w[..window_length].to_vec(),
            target: w[window_length],
        })
        .collect())
}

/// Splits windows into a chronological training prefix and evaluation suffix.
///
/// The prefix holds `floor(len * train_ratio)` windows. Order is preserved.
pub fn split_chronological(windows: &[Window], train_ratio: f64) -> Result<(&[Window], &[Window])> {
    if !(train_ratio > 0.0 && train_ratio < 1.0) {
        return Err(ForecastError::InvalidConfig(format!(
            "train_ratio must be in (0, 1), got {train_ratio}"
        )));
    }
    let cut = (windows.len() as f64 * train_ratio).floor() as usize;
    Ok(windows.split_at(cut))
}
