//! Classical seasonal decomposition backing the decomposition panel.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Additive decomposition of a series into trend, seasonal, and residual
/// components. Trend and residual are NaN within half a window of each
/// edge, where the centered moving average is undefined.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// The input values.
    pub observed: Vec<f64>,
    /// Centered moving-average trend.
    pub trend: Vec<f64>,
    /// Repeating seasonal component, centered to mean zero.
    pub seasonal: Vec<f64>,
    /// What remains: observed - trend - seasonal.
    pub residual: Vec<f64>,
    /// Seasonal period used.
    pub period: usize,
}

/// Decompose a series at the given seasonal period.
///
/// Uses the classical procedure: a centered moving average of width
/// `period` estimates the trend (a 2x`period` weighted average when the
/// period is even), the phase-wise means of the detrended series give the
/// seasonal component, and the residual is the remainder. Requires two
/// full cycles.
pub fn decompose(series: &TimeSeries, period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(ForecastError::InvalidParameter(
            "decomposition requires a seasonal period of at least 2".to_string(),
        ));
    }
    let observed = series.values().to_vec();
    let n = observed.len();
    if n < 2 * period {
        return Err(ForecastError::InsufficientData {
            needed: 2 * period,
            got: n,
        });
    }
    if observed.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }

    let trend = centered_moving_average(&observed, period);

    // Phase-wise means of the detrended series, ignoring the NaN edges.
    let mut phase_sums = vec![0.0; period];
    let mut phase_counts = vec![0usize; period];
    for (i, (&y, &t)) in observed.iter().zip(&trend).enumerate() {
        if t.is_finite() {
            phase_sums[i % period] += y - t;
            phase_counts[i % period] += 1;
        }
    }
    let mut seasonal_cycle: Vec<f64> = phase_sums
        .iter()
        .zip(&phase_counts)
        .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect();

    // Center the cycle so the seasonal component carries no level.
    let cycle_mean = seasonal_cycle.iter().sum::<f64>() / period as f64;
    for s in seasonal_cycle.iter_mut() {
        *s -= cycle_mean;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| seasonal_cycle[i % period]).collect();
    let residual: Vec<f64> = observed
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((&y, &t), &s)| y - t - s)
        .collect();

    Ok(Decomposition {
        observed,
        trend,
        seasonal,
        residual,
        period,
    })
}

/// Centered moving average of width `period`; for even periods, the
/// 2x`period` average that weights the two endpoints by half.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![f64::NAN; n];

    if period % 2 == 1 {
        for i in half..n - half {
            let window = &values[i - half..=i + half];
            trend[i] = window.iter().sum::<f64>() / period as f64;
        }
    } else {
        for i in half..n - half {
            let window = &values[i - half..=i + half];
            let inner: f64 = window[1..period].iter().sum();
            trend[i] = (inner + 0.5 * (window[0] + window[period])) / period as f64;
        }
    }

    trend
}
