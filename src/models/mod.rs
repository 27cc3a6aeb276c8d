//! Forecasting models.

mod holt_winters;
mod sarimax;
mod traits;

pub use holt_winters::{Component, HoltWinters};
pub use sarimax::{Sarimax, SarimaxSpec};
pub use traits::{BoxedForecaster, Forecaster};
