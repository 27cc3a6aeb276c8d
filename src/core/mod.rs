//! Core data structures.

mod forecast;
mod series;

pub use forecast::Forecast;
pub use series::{Frequency, TimeSeries};
