//! Seasonal ARIMA forecasting model.
//!
//! The model differences the series (seasonally, then regularly), fits
//! AR/MA terms at both regular and seasonal lags by minimizing the
//! conditional sum of squares, and integrates forecasts back to the
//! original scale. Exogenous regressors are accepted by the name only:
//! the pipeline models the univariate series alone.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// SARIMAX model specification: non-seasonal order (p, d, q) and seasonal
/// order (P, D, Q) at period `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaxSpec {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub seasonal_p: usize,
    /// Seasonal differencing order.
    pub seasonal_d: usize,
    /// Seasonal MA order.
    pub seasonal_q: usize,
    /// Seasonal period (m >= 1).
    pub period: usize,
}

impl SarimaxSpec {
    /// Build a spec from `(p, d, q)` and `(P, D, Q, m)` tuples.
    pub fn new(order: (usize, usize, usize), seasonal_order: (usize, usize, usize, usize)) -> Self {
        Self {
            p: order.0,
            d: order.1,
            q: order.2,
            seasonal_p: seasonal_order.0,
            seasonal_d: seasonal_order.1,
            seasonal_q: seasonal_order.2,
            period: seasonal_order.3,
        }
    }

    /// A purely non-seasonal specification.
    pub fn nonseasonal(p: usize, d: usize, q: usize) -> Self {
        Self::new((p, d, q), (0, 0, 0, 1))
    }

    /// Total number of estimated parameters (coefficients + intercept).
    pub fn num_params(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q + 1
    }

    /// First index of the differenced series with a full lag history.
    fn start_offset(&self) -> usize {
        self.p
            .max(self.q)
            .max(self.seasonal_p * self.period)
            .max(self.seasonal_q * self.period)
    }

    /// Observations consumed by differencing.
    fn diff_loss(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }
}

impl Default for SarimaxSpec {
    fn default() -> Self {
        Self::new((1, 1, 1), (1, 1, 1, 12))
    }
}

/// SARIMAX forecaster.
#[derive(Debug, Clone)]
pub struct Sarimax {
    spec: SarimaxSpec,
    /// Non-seasonal AR coefficients.
    ar: Vec<f64>,
    /// Non-seasonal MA coefficients.
    ma: Vec<f64>,
    /// Seasonal AR coefficients (lags m, 2m, ...).
    seasonal_ar: Vec<f64>,
    /// Seasonal MA coefficients (lags m, 2m, ...).
    seasonal_ma: Vec<f64>,
    /// Mean of the fully differenced series.
    intercept: f64,
    /// Original training values.
    original: Option<Vec<f64>>,
    /// Series after seasonal differencing only.
    seasonal_leveled: Option<Vec<f64>>,
    /// Series after seasonal and regular differencing.
    transformed: Option<Vec<f64>>,
    /// Fitted values on the differenced scale (NaN before the lag window).
    fitted: Option<Vec<f64>>,
    /// Residuals on the differenced scale.
    residuals: Option<Vec<f64>>,
    /// Residual variance.
    residual_variance: Option<f64>,
    n: usize,
}

impl Sarimax {
    /// Create a model for the given specification.
    pub fn new(spec: SarimaxSpec) -> Self {
        Self {
            spec,
            ar: vec![],
            ma: vec![],
            seasonal_ar: vec![],
            seasonal_ma: vec![],
            intercept: 0.0,
            original: None,
            seasonal_leveled: None,
            transformed: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            n: 0,
        }
    }

    /// Get the model specification.
    pub fn spec(&self) -> SarimaxSpec {
        self.spec
    }

    /// Non-seasonal AR coefficients.
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    /// Non-seasonal MA coefficients.
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Seasonal AR coefficients.
    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar
    }

    /// Seasonal MA coefficients.
    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Estimated intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// One-step prediction of `w[t]` from coefficients and history.
    fn predict_one(
        spec: &SarimaxSpec,
        w: &[f64],
        residuals: &[f64],
        t: usize,
        ar: &[f64],
        ma: &[f64],
        sar: &[f64],
        sma: &[f64],
        intercept: f64,
    ) -> f64 {
        let s = spec.period;
        let mut pred = intercept;
        for (i, &coef) in ar.iter().enumerate() {
            pred += coef * (w[t - 1 - i] - intercept);
        }
        for (j, &coef) in sar.iter().enumerate() {
            pred += coef * (w[t - (j + 1) * s] - intercept);
        }
        for (i, &coef) in ma.iter().enumerate() {
            pred += coef * residuals[t - 1 - i];
        }
        for (j, &coef) in sma.iter().enumerate() {
            pred += coef * residuals[t - (j + 1) * s];
        }
        pred
    }

    /// Conditional sum of squares over the differenced series.
    fn calculate_css(
        spec: &SarimaxSpec,
        w: &[f64],
        ar: &[f64],
        ma: &[f64],
        sar: &[f64],
        sma: &[f64],
        intercept: f64,
    ) -> f64 {
        let start = spec.start_offset();
        if w.len() <= start {
            return f64::MAX;
        }

        let mut residuals = vec![0.0; w.len()];
        let mut css = 0.0;
        for t in start..w.len() {
            let pred = Self::predict_one(spec, w, &residuals, t, ar, ma, sar, sma, intercept);
            let error = w[t] - pred;
            residuals[t] = error;
            css += error * error;
        }

        if css.is_finite() {
            css
        } else {
            f64::MAX
        }
    }

    /// Estimate coefficients by CSS minimization.
    fn estimate_parameters(&mut self, w: &[f64]) {
        let spec = self.spec;
        let (p, q, cap_p, cap_q) = (spec.p, spec.q, spec.seasonal_p, spec.seasonal_q);
        let mean = w.iter().sum::<f64>() / w.len() as f64;

        if p + q + cap_p + cap_q == 0 {
            self.intercept = mean;
            return;
        }

        let mut initial = vec![mean];
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        for i in 0..p + q + cap_p + cap_q {
            initial.push(0.1 / (i % 4 + 1) as f64);
            bounds.push((-0.99, 0.99));
        }

        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };
        let result = nelder_mead(
            |params| {
                let intercept = params[0];
                let ar = &params[1..1 + p];
                let ma = &params[1 + p..1 + p + q];
                let sar = &params[1 + p + q..1 + p + q + cap_p];
                let sma = &params[1 + p + q + cap_p..];
                Self::calculate_css(&spec, w, ar, ma, sar, sma, intercept)
            },
            &initial,
            Some(&bounds),
            config,
        );

        let point = result.optimal_point;
        self.intercept = point[0];
        self.ar = point[1..1 + p].to_vec();
        self.ma = point[1 + p..1 + p + q].to_vec();
        self.seasonal_ar = point[1 + p + q..1 + p + q + cap_p].to_vec();
        self.seasonal_ma = point[1 + p + q + cap_p..].to_vec();
    }

    /// Fitted values and residuals on the differenced scale.
    fn calculate_fitted(&mut self, w: &[f64]) {
        let start = self.spec.start_offset();
        let mut fitted = vec![f64::NAN; w.len()];
        let mut residuals = vec![0.0; w.len()];

        for t in start..w.len() {
            let pred = Self::predict_one(
                &self.spec,
                w,
                &residuals,
                t,
                &self.ar,
                &self.ma,
                &self.seasonal_ar,
                &self.seasonal_ma,
                self.intercept,
            );
            fitted[t] = pred;
            residuals[t] = w[t] - pred;
        }

        let valid = &residuals[start..];
        if !valid.is_empty() {
            let variance = valid.iter().map(|r| r * r).sum::<f64>() / valid.len() as f64;
            self.residual_variance = Some(variance);
        }

        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
    }
}

impl Default for Sarimax {
    fn default() -> Self {
        Self::new(SarimaxSpec::default())
    }
}

impl Forecaster for Sarimax {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let spec = self.spec;
        if spec.period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 1".to_string(),
            ));
        }

        let values = series.values();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }

        let needed = spec.diff_loss() + spec.start_offset() + 2;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        self.n = values.len();
        self.original = Some(values.to_vec());

        let seasonal_leveled = seasonal_difference(values, spec.seasonal_d, spec.period);
        let w = difference(&seasonal_leveled, spec.d);
        self.seasonal_leveled = Some(seasonal_leveled);

        self.estimate_parameters(&w);
        self.calculate_fitted(&w);
        self.transformed = Some(w);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let original = self.original.as_ref().ok_or(ForecastError::FitRequired)?;
        let seasonal_leveled = self
            .seasonal_leveled
            .as_ref()
            .ok_or(ForecastError::FitRequired)?;
        let w = self.transformed.as_ref().ok_or(ForecastError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let spec = self.spec;
        let mut extended = w.clone();
        let mut extended_residuals = residuals.clone();
        for _ in 0..horizon {
            let t = extended.len();
            let pred = Self::predict_one(
                &spec,
                &extended,
                &extended_residuals,
                t,
                &self.ar,
                &self.ma,
                &self.seasonal_ar,
                &self.seasonal_ma,
                self.intercept,
            );
            extended.push(pred);
            // Future shocks are their expectation: zero.
            extended_residuals.push(0.0);
        }
        let forecast_w = &extended[w.len()..];

        // Undo regular differencing against the seasonally differenced
        // series, then seasonal differencing against the original.
        let forecast_leveled = if spec.d > 0 {
            integrate(forecast_w, seasonal_leveled, spec.d)
        } else {
            forecast_w.to_vec()
        };
        let predictions = if spec.seasonal_d > 0 {
            seasonal_integrate(&forecast_leveled, original, spec.seasonal_d, spec.period)
        } else {
            forecast_leveled
        };

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SARIMAX"
    }
}

/// Apply `d` rounds of first differencing.
fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply `d` rounds of lag-`period` differencing.
fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            break;
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Reverse `d` rounds of first differencing on a forecast, seeded from the
/// tail of the training series at each level.
fn integrate(forecast: &[f64], base: &[f64], d: usize) -> Vec<f64> {
    let mut result = forecast.to_vec();
    for level in (0..d).rev() {
        let leveled = difference(base, level);
        let mut cumulative = leveled.last().copied().unwrap_or(0.0);
        for value in result.iter_mut() {
            cumulative += *value;
            *value = cumulative;
        }
    }
    result
}

/// Reverse `d` rounds of seasonal differencing: each forecast step adds
/// the value one period earlier, observed or already forecast.
fn seasonal_integrate(forecast: &[f64], base: &[f64], d: usize, period: usize) -> Vec<f64> {
    let mut result = forecast.to_vec();
    for level in (0..d).rev() {
        let leveled = seasonal_difference(base, level, period);
        let mut integrated: Vec<f64> = Vec::with_capacity(result.len());
        for (h, &value) in result.iter().enumerate() {
            let prior = if h < period {
                leveled
                    .get(leveled.len().wrapping_sub(period - h))
                    .copied()
                    .unwrap_or(0.0)
            } else {
                integrated[h - period]
            };
            integrated.push(value + prior);
        }
        result = integrated;
    }
    result
}
