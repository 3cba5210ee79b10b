//! Market data access for the forecaster.
//!
//! - [`models`] holds the vendor-agnostic bar types every provider produces.
//! - [`providers`] holds the [`DataProvider`](providers::DataProvider) trait, the
//!   concrete providers, and [`fetch_daily_bars`](providers::fetch_daily_bars),
//!   the single-symbol daily fetch the forecaster consumes.

pub mod models;
pub mod providers;
