//! Accuracy KPIs comparing forecasts against the held-out test series.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};

/// Accuracy KPIs for one model.
#[derive(Debug, Clone)]
pub struct Kpi {
    /// Model display name.
    pub model: String,
    /// Mean absolute error.
    pub mae: f64,
    /// Mean absolute percentage error, as a fraction. Non-finite when the
    /// test series contains a zero.
    pub mape: f64,
    /// Coefficient of determination against the test mean.
    pub r_squared: f64,
}

/// KPI rows for the compared models, in the order they were evaluated.
#[derive(Debug, Clone, Default)]
pub struct KpiReport {
    rows: Vec<Kpi>,
}

impl KpiReport {
    /// All rows.
    pub fn rows(&self) -> &[Kpi] {
        &self.rows
    }

    /// Row for a model by name.
    pub fn get(&self, model: &str) -> Option<&Kpi> {
        self.rows.iter().find(|kpi| kpi.model == model)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the report has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Compute KPI rows for each named forecast against the test series.
///
/// Every forecast must cover the full test horizon. An empty forecast list
/// yields an empty report (all models may have failed upstream).
pub fn evaluate(test: &TimeSeries, forecasts: &[(&str, &Forecast)]) -> Result<KpiReport> {
    if test.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    let actual = test.values();
    let mut rows = Vec::with_capacity(forecasts.len());
    for (model, forecast) in forecasts {
        let predicted = forecast.point();
        if predicted.len() != actual.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: actual.len(),
                got: predicted.len(),
            });
        }
        rows.push(Kpi {
            model: (*model).to_string(),
            mae: mean_absolute_error(actual, predicted),
            mape: mean_absolute_percentage_error(actual, predicted),
            r_squared: r_squared(actual, predicted),
        });
    }

    Ok(KpiReport { rows })
}

/// Mean of absolute differences.
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Mean of absolute relative differences, as a fraction.
///
/// A zero actual value makes the result non-finite; that is deliberate and
/// must reach the caller unmasked.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / a).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination against the mean of the actual values.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    }
}
