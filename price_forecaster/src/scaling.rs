use crate::errors::{ForecastError, Result};

/// Linear map of a fitted `[min, max]` range onto `[0, 1]`.
///
/// Fit once per run on the full close series; the same instance then scales
/// the training windows and maps every prediction back to prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::DegenerateRange("no values to fit".into()));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ForecastError::DegenerateRange(format!(
                "non-finite value {bad}"
            )));
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if max == min {
            return Err(ForecastError::DegenerateRange(format!(
                "all values equal {min}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn to_scaled(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    pub fn to_original(&self, scaled: f64) -> f64 {
        scaled * (self.max - self.min) + self.min
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.to_scaled(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn maps_extremes_to_unit_interval() {
        let scaler = MinMaxScaler::fit(&[10.0, 12.0, 18.0, 9.0]).unwrap();
        assert_eq!(scaler.to_scaled(9.0), 0.0);
        assert_eq!(scaler.to_scaled(18.0), 1.0);
        assert_eq!(scaler.to_original(0.5), 13.5);
    }

    #[test]
    fn constant_series_is_degenerate() {
        let err = MinMaxScaler::fit(&[5.0; 5]).unwrap_err();
        assert!(matches!(err, ForecastError::DegenerateRange(_)));
    }

    #[test]
    fn empty_and_nan_inputs_are_degenerate() {
        assert!(matches!(
            MinMaxScaler::fit(&[]),
            Err(ForecastError::DegenerateRange(_))
        ));
        assert!(matches!(
            MinMaxScaler::fit(&[1.0, f64::NAN]),
            Err(ForecastError::DegenerateRange(_))
        ));
    }

    proptest! {
        #[test]
        fn round_trip_is_identity(
            values in prop::collection::vec(-1e4f64..1e4, 2..50),
            probe in -1e4f64..1e4,
        ) {
            prop_assume!(values.iter().any(|v| *v != values[0]));
            let scaler = MinMaxScaler::fit(&values).unwrap();
            let back = scaler.to_original(scaler.to_scaled(probe));
            prop_assert!((back - probe).abs() <= 1e-9 * probe.abs().max(1.0));
        }

        #[test]
        fn fitted_values_land_in_unit_interval(values in prop::collection::vec(0.0f64..1e3, 2..50)) {
            prop_assume!(values.iter().any(|v| *v != values[0]));
            let scaler = MinMaxScaler::fit(&values).unwrap();
            for s in scaler.transform(&values) {
                prop_assert!((0.0..=1.0).contains(&s));
            }
        }
    }
}
