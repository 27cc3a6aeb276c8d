//! Train/test partitioning of a time series.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Partition a series into a contiguous train prefix and test suffix.
///
/// The cut index is `floor(n * (1 - test_fraction))`, so `train ++ test`
/// reconstructs the input in order. No shuffling: temporal order is what
/// makes the held-out evaluation meaningful.
///
/// Fractions outside (0, 1), or cuts that would leave either side empty,
/// are rejected.
pub fn split(series: &TimeSeries, test_fraction: f64) -> Result<(TimeSeries, TimeSeries)> {
    if !test_fraction.is_finite() || test_fraction <= 0.0 || test_fraction >= 1.0 {
        return Err(ForecastError::InvalidConfig(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let n = series.len();
    let cut = (n as f64 * (1.0 - test_fraction)).floor() as usize;
    if cut == 0 || cut == n {
        return Err(ForecastError::InvalidConfig(format!(
            "test fraction {test_fraction} leaves an empty train or test set for {n} observations"
        )));
    }

    Ok((series.slice(0, cut)?, series.slice(cut, n)?))
}
