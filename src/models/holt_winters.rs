//! Holt-Winters exponential smoothing.
//!
//! Covers the whole family: simple exponential smoothing (no trend, no
//! seasonality) up to triple exponential smoothing with additive or
//! multiplicative trend and seasonal components. Smoothing weights are
//! estimated by SSE minimization unless fixed explicitly.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// A trend or seasonal component choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Component {
    /// Component absent.
    #[default]
    None,
    /// Component combines additively: `y = base + component`.
    Additive,
    /// Component combines multiplicatively: `y = base * component`.
    Multiplicative,
}

impl Component {
    /// Whether the component is present.
    pub fn is_some(&self) -> bool {
        !matches!(self, Component::None)
    }
}

/// Holt-Winters forecaster.
///
/// For additive trend and additive seasonality the recursions are:
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + h·b_t + s_{t+h-m}`
///
/// Multiplicative variants replace the subtraction/addition with division
/// and multiplication, and a multiplicative trend compounds as `b_t^h`.
#[derive(Debug, Clone)]
pub struct HoltWinters {
    trend: Component,
    seasonal: Component,
    seasonal_periods: usize,
    /// Level smoothing weight.
    alpha: Option<f64>,
    /// Trend smoothing weight.
    beta: Option<f64>,
    /// Seasonal smoothing weight.
    gamma: Option<f64>,
    optimize: bool,
    level: Option<f64>,
    growth: Option<f64>,
    seasonals: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    n: usize,
}

/// Smoothing state threaded through the recursion.
struct SmoothState {
    level: f64,
    growth: f64,
    seasonals: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

impl HoltWinters {
    /// Create a model whose smoothing weights are estimated at fit time.
    pub fn new(trend: Component, seasonal: Component, seasonal_periods: usize) -> Self {
        Self {
            trend,
            seasonal,
            seasonal_periods,
            alpha: None,
            beta: None,
            gamma: None,
            optimize: true,
            level: None,
            growth: None,
            seasonals: None,
            fitted: None,
            residuals: None,
            n: 0,
        }
    }

    /// Create a model with fixed smoothing weights.
    pub fn with_params(
        trend: Component,
        seasonal: Component,
        seasonal_periods: usize,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Self {
        Self {
            alpha: Some(alpha.clamp(0.0001, 0.9999)),
            beta: Some(beta.clamp(0.0001, 0.9999)),
            gamma: Some(gamma.clamp(0.0001, 0.9999)),
            optimize: false,
            ..Self::new(trend, seasonal, seasonal_periods)
        }
    }

    /// Level smoothing weight, once fitted or fixed.
    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    /// Trend smoothing weight.
    pub fn beta(&self) -> Option<f64> {
        self.beta
    }

    /// Seasonal smoothing weight.
    pub fn gamma(&self) -> Option<f64> {
        self.gamma
    }

    /// Trend component choice.
    pub fn trend(&self) -> Component {
        self.trend
    }

    /// Seasonal component choice.
    pub fn seasonal(&self) -> Component {
        self.seasonal
    }

    /// Configured seasonal period.
    pub fn seasonal_periods(&self) -> usize {
        self.seasonal_periods
    }

    fn validate(&self, values: &[f64]) -> Result<()> {
        if self.seasonal_periods == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 1".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }
        let needed = if self.seasonal.is_some() {
            2 * self.seasonal_periods
        } else {
            2
        };
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }
        if (self.trend == Component::Multiplicative || self.seasonal == Component::Multiplicative)
            && values.iter().any(|&v| v <= 0.0)
        {
            return Err(ForecastError::InvalidParameter(
                "multiplicative components require strictly positive values".to_string(),
            ));
        }
        Ok(())
    }

    /// Index of the first smoothed observation; everything before it seeds
    /// the initial state.
    fn smoothing_start(seasonal: Component, period: usize) -> usize {
        if seasonal.is_some() {
            period
        } else {
            1
        }
    }

    /// Initial level, growth, and seasonal indices.
    fn initialize_state(
        values: &[f64],
        trend: Component,
        seasonal: Component,
        period: usize,
    ) -> (f64, f64, Vec<f64>) {
        if seasonal.is_some() {
            let first_season = &values[..period];
            let level = first_season.iter().sum::<f64>() / period as f64;

            let growth = match trend {
                Component::None => 0.0,
                Component::Additive => {
                    if values.len() >= 2 * period {
                        (0..period)
                            .map(|i| (values[period + i] - values[i]) / period as f64)
                            .sum::<f64>()
                            / period as f64
                    } else {
                        0.0
                    }
                }
                Component::Multiplicative => {
                    if values.len() >= 2 * period && level.abs() > 1e-10 {
                        let second = values[period..2 * period].iter().sum::<f64>() / period as f64;
                        let ratio = second / level;
                        if ratio > 0.0 {
                            ratio.powf(1.0 / period as f64)
                        } else {
                            1.0
                        }
                    } else {
                        1.0
                    }
                }
            };

            let mut seasonals: Vec<f64> = match seasonal {
                Component::Multiplicative => first_season
                    .iter()
                    .map(|y| if level.abs() > 1e-10 { y / level } else { 1.0 })
                    .collect(),
                _ => first_season.iter().map(|y| y - level).collect(),
            };
            normalize_seasonals(&mut seasonals, seasonal);

            (level, growth, seasonals)
        } else {
            let level = values[0];
            let growth = match trend {
                Component::None => 0.0,
                Component::Additive => values[1] - values[0],
                Component::Multiplicative => {
                    if values[0].abs() > 1e-10 {
                        values[1] / values[0]
                    } else {
                        1.0
                    }
                }
            };
            (level, growth, vec![])
        }
    }

    /// Run the smoothing recursion over the full series.
    fn smooth(
        values: &[f64],
        trend: Component,
        seasonal: Component,
        period: usize,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> SmoothState {
        let start = Self::smoothing_start(seasonal, period);
        let (mut level, mut growth, mut seasonals) =
            Self::initialize_state(values, trend, seasonal, period);

        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());
        // The warm-up span seeds the state and has no one-step forecast.
        for &y in &values[..start] {
            fitted.push(y);
            residuals.push(0.0);
        }

        for (t, &y) in values.iter().enumerate().skip(start) {
            let base = match trend {
                Component::None => level,
                Component::Additive => level + growth,
                Component::Multiplicative => level * growth,
            };
            let season_idx = if seasonal.is_some() { t % period } else { 0 };
            let prediction = match seasonal {
                Component::None => base,
                Component::Additive => base + seasonals[season_idx],
                Component::Multiplicative => base * seasonals[season_idx],
            };
            fitted.push(prediction);
            residuals.push(y - prediction);

            let s = if seasonal.is_some() {
                seasonals[season_idx]
            } else {
                0.0
            };
            let deseasonalized = match seasonal {
                Component::None => y,
                Component::Additive => y - s,
                Component::Multiplicative => {
                    if s.abs() > 1e-10 {
                        y / s
                    } else {
                        y
                    }
                }
            };

            let level_prev = level;
            level = alpha * deseasonalized + (1.0 - alpha) * base;

            match trend {
                Component::None => {}
                Component::Additive => {
                    growth = beta * (level - level_prev) + (1.0 - beta) * growth;
                }
                Component::Multiplicative => {
                    if level_prev.abs() > 1e-10 {
                        growth = beta * (level / level_prev) + (1.0 - beta) * growth;
                    }
                }
            }

            match seasonal {
                Component::None => {}
                Component::Additive => {
                    seasonals[season_idx] = gamma * (y - level) + (1.0 - gamma) * s;
                }
                Component::Multiplicative => {
                    if level.abs() > 1e-10 {
                        seasonals[season_idx] = gamma * (y / level) + (1.0 - gamma) * s;
                    }
                }
            }
        }

        SmoothState {
            level,
            growth,
            seasonals,
            fitted,
            residuals,
        }
    }

    /// Sum of squared one-step errors for the given weights.
    fn calculate_sse(
        values: &[f64],
        trend: Component,
        seasonal: Component,
        period: usize,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> f64 {
        let start = Self::smoothing_start(seasonal, period);
        let state = Self::smooth(values, trend, seasonal, period, alpha, beta, gamma);
        let sse: f64 = state.residuals[start..].iter().map(|r| r * r).sum();
        if sse.is_finite() {
            sse
        } else {
            f64::MAX
        }
    }

    /// Estimate the active smoothing weights by SSE minimization.
    fn optimize_params(&self, values: &[f64]) -> (f64, f64, f64) {
        let (trend, seasonal, period) = (self.trend, self.seasonal, self.seasonal_periods);

        // Only the weights of present components enter the search.
        let mut initial = vec![0.3];
        if trend.is_some() {
            initial.push(0.1);
        }
        if seasonal.is_some() {
            initial.push(0.1);
        }
        let bounds = vec![(0.0001, 0.9999); initial.len()];

        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };
        let result = nelder_mead(
            |params| {
                let (alpha, beta, gamma) = unpack_weights(params, trend, seasonal);
                Self::calculate_sse(values, trend, seasonal, period, alpha, beta, gamma)
            },
            &initial,
            Some(&bounds),
            config,
        );

        let (alpha, beta, gamma) = unpack_weights(&result.optimal_point, trend, seasonal);
        (
            alpha.clamp(0.0001, 0.9999),
            beta.clamp(0.0001, 0.9999),
            gamma.clamp(0.0001, 0.9999),
        )
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::new(Component::Additive, Component::Additive, 12)
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        self.validate(values)?;
        self.n = values.len();

        if self.optimize {
            let (alpha, beta, gamma) = self.optimize_params(values);
            self.alpha = Some(alpha);
            self.beta = Some(beta);
            self.gamma = Some(gamma);
        }

        let alpha = self.alpha.ok_or(ForecastError::FitRequired)?;
        let beta = self.beta.ok_or(ForecastError::FitRequired)?;
        let gamma = self.gamma.ok_or(ForecastError::FitRequired)?;

        let state = Self::smooth(
            values,
            self.trend,
            self.seasonal,
            self.seasonal_periods,
            alpha,
            beta,
            gamma,
        );
        self.level = Some(state.level);
        self.growth = Some(state.growth);
        self.seasonals = Some(state.seasonals);
        self.fitted = Some(state.fitted);
        self.residuals = Some(state.residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.level.ok_or(ForecastError::FitRequired)?;
        let growth = self.growth.ok_or(ForecastError::FitRequired)?;
        let seasonals = self.seasonals.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let period = self.seasonal_periods;
        let predictions: Vec<f64> = (1..=horizon)
            .map(|h| {
                let base = match self.trend {
                    Component::None => level,
                    Component::Additive => level + h as f64 * growth,
                    Component::Multiplicative => level * growth.powi(h as i32),
                };
                match self.seasonal {
                    Component::None => base,
                    Component::Additive => base + seasonals[(self.n + h - 1) % period],
                    Component::Multiplicative => base * seasonals[(self.n + h - 1) % period],
                }
            })
            .collect();

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "Holt-Winters"
    }
}

/// Split an optimizer point into (alpha, beta, gamma), defaulting the
/// weights of absent components.
fn unpack_weights(params: &[f64], trend: Component, seasonal: Component) -> (f64, f64, f64) {
    let alpha = params.first().copied().unwrap_or(0.3);
    let mut next = 1;
    let beta = if trend.is_some() {
        let b = params.get(next).copied().unwrap_or(0.1);
        next += 1;
        b
    } else {
        0.0001
    };
    let gamma = if seasonal.is_some() {
        params.get(next).copied().unwrap_or(0.1)
    } else {
        0.0001
    };
    (alpha, beta, gamma)
}

/// Constrain seasonal indices: additive indices sum to zero,
/// multiplicative indices average to one.
fn normalize_seasonals(seasonals: &mut [f64], seasonal: Component) {
    let period = seasonals.len();
    if period == 0 {
        return;
    }
    match seasonal {
        Component::Multiplicative => {
            let mean = seasonals.iter().sum::<f64>() / period as f64;
            if mean.abs() > 1e-10 {
                for s in seasonals.iter_mut() {
                    *s /= mean;
                }
            }
        }
        _ => {
            let adjustment = seasonals.iter().sum::<f64>() / period as f64;
            for s in seasonals.iter_mut() {
                *s -= adjustment;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| base + Duration::days(i as i64))
            .collect();
        TimeSeries::new(dates, values).unwrap()
    }

    fn seasonal_data(n: usize, period: usize, slope: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                50.0 + slope * t + amplitude * (std::f64::consts::TAU * t / period as f64).sin()
            })
            .collect()
    }

    #[test]
    fn additive_seasonal_fit_and_forecast() {
        let series = make_series(seasonal_data(48, 12, 0.2, 8.0));
        let mut model = HoltWinters::new(Component::Additive, Component::Additive, 12);
        model.fit(&series).unwrap();

        assert!(model.alpha().unwrap() > 0.0);
        let forecast = model.predict(12).unwrap();
        assert_eq!(forecast.horizon(), 12);
        assert!(forecast.point().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn captures_a_square_seasonal_pattern() {
        let values: Vec<f64> = (0..40)
            .map(|i| if i % 4 < 2 { 20.0 } else { 10.0 })
            .collect();
        let series = make_series(values);

        let mut model =
            HoltWinters::with_params(Component::None, Component::Additive, 4, 0.5, 0.1, 0.5);
        model.fit(&series).unwrap();

        let forecast = model.predict(4).unwrap();
        let point = forecast.point();
        // The high-low alternation should survive into the forecast.
        assert!(point[0].max(point[1]) > point[2].min(point[3]));
    }

    #[test]
    fn no_trend_no_seasonal_is_flat() {
        let series = make_series(vec![10.0, 12.0, 11.0, 13.0, 12.0, 11.5, 12.5, 12.0]);
        let mut model = HoltWinters::new(Component::None, Component::None, 1);
        model.fit(&series).unwrap();

        let forecast = model.predict(5).unwrap();
        let first = forecast.point()[0];
        for value in forecast.point() {
            assert_relative_eq!(*value, first, epsilon = 1e-12);
        }
    }

    #[test]
    fn additive_trend_extends_linearly() {
        let series = make_series((0..30).map(|i| 5.0 + 2.0 * i as f64).collect());
        let mut model = HoltWinters::new(Component::Additive, Component::None, 1);
        model.fit(&series).unwrap();

        let forecast = model.predict(3).unwrap();
        let point = forecast.point();
        // A perfectly linear series forecasts on the same line.
        assert_relative_eq!(point[1] - point[0], 2.0, epsilon = 0.2);
        assert_relative_eq!(point[0], 65.0, epsilon = 2.0);
    }

    #[test]
    fn multiplicative_seasonal_on_positive_data() {
        let values: Vec<f64> = (0..48)
            .map(|i| {
                let t = i as f64;
                let base = 100.0 + 0.5 * t;
                base * (1.0 + 0.2 * (std::f64::consts::TAU * t / 12.0).sin())
            })
            .collect();
        let series = make_series(values);

        let mut model = HoltWinters::new(Component::Additive, Component::Multiplicative, 12);
        model.fit(&series).unwrap();

        let forecast = model.predict(12).unwrap();
        assert!(forecast.point().iter().all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn multiplicative_rejects_nonpositive_values() {
        let series = make_series(vec![1.0, 2.0, 0.0, 2.0, 1.0, 2.0, 1.5, 2.0]);
        let mut model = HoltWinters::new(Component::None, Component::Multiplicative, 2);
        assert!(matches!(
            model.fit(&series),
            Err(ForecastError::InvalidParameter(_))
        ));

        let series = make_series(vec![1.0, -2.0, 1.0, 2.0]);
        let mut model = HoltWinters::new(Component::Multiplicative, Component::None, 1);
        assert!(matches!(
            model.fit(&series),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn seasonal_model_requires_two_cycles() {
        let series = make_series(seasonal_data(20, 12, 0.0, 5.0));
        let mut model = HoltWinters::new(Component::Additive, Component::Additive, 12);
        assert!(matches!(
            model.fit(&series),
            Err(ForecastError::InsufficientData { needed: 24, got: 20 })
        ));
    }

    #[test]
    fn zero_seasonal_period_is_invalid() {
        let series = make_series(seasonal_data(24, 12, 0.0, 5.0));
        let mut model = HoltWinters::new(Component::None, Component::None, 0);
        assert!(matches!(
            model.fit(&series),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn predict_requires_fit() {
        let model = HoltWinters::default();
        assert!(matches!(model.predict(4), Err(ForecastError::FitRequired)));
    }

    #[test]
    fn zero_horizon_is_empty() {
        let series = make_series(seasonal_data(36, 12, 0.1, 4.0));
        let mut model = HoltWinters::default();
        model.fit(&series).unwrap();
        assert_eq!(model.predict(0).unwrap().horizon(), 0);
    }

    #[test]
    fn fitted_and_residuals_cover_the_series() {
        let values = seasonal_data(36, 6, 0.1, 3.0);
        let series = make_series(values.clone());
        let mut model =
            HoltWinters::with_params(Component::Additive, Component::Additive, 6, 0.3, 0.1, 0.1);
        model.fit(&series).unwrap();

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();
        assert_eq!(fitted.len(), 36);
        assert_eq!(residuals.len(), 36);
        for i in 6..36 {
            assert_relative_eq!(residuals[i], values[i] - fitted[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn normalization_constraints_hold() {
        let mut additive = vec![3.0, -1.0, 2.0, 4.0];
        normalize_seasonals(&mut additive, Component::Additive);
        assert_relative_eq!(additive.iter().sum::<f64>(), 0.0, epsilon = 1e-12);

        let mut multiplicative = vec![0.5, 1.5, 2.0, 1.0];
        normalize_seasonals(&mut multiplicative, Component::Multiplicative);
        assert_relative_eq!(
            multiplicative.iter().sum::<f64>() / 4.0,
            1.0,
            epsilon = 1e-12
        );
    }
}
