//! The end-to-end pipeline: Load -> Preprocess -> Split -> Forecast(x2)
//! -> Evaluate.
//!
//! Everything a caller configures lives in [`PipelineConfig`]; everything
//! derived lives in the returned [`PipelineOutcome`] or in an explicit
//! [`Session`]. No stage touches ambient state.

use crate::core::{Forecast, TimeSeries};
use crate::data::{preprocess, split, PreprocessConfig, RawTable};
use crate::error::{ForecastError, Result};
use crate::evaluate::{evaluate, KpiReport};
use crate::models::{Component, Forecaster, HoltWinters, Sarimax, SarimaxSpec};
use log::{debug, warn};

/// Report key for the SARIMAX strategy.
pub const SARIMAX_MODEL: &str = "SARIMAX";
/// Report key for the Holt-Winters strategy.
pub const HOLT_WINTERS_MODEL: &str = "Holt-Winters";

/// Widget-facing bound on SARIMAX order terms.
const MAX_ORDER: usize = 10;
/// Widget-facing bound on seasonal periods.
const MAX_SEASONAL_PERIOD: usize = 365;

/// Holt-Winters configuration: component choices plus the seasonal period.
#[derive(Debug, Clone, Copy)]
pub struct HoltWintersConfig {
    /// Trend component.
    pub trend: Component,
    /// Seasonal component.
    pub seasonal: Component,
    /// Seasonal period (1..=365).
    pub seasonal_periods: usize,
}

impl Default for HoltWintersConfig {
    fn default() -> Self {
        Self {
            trend: Component::None,
            seasonal: Component::None,
            seasonal_periods: 12,
        }
    }
}

/// Everything the user configures for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Column selection, date format, and resampling frequency.
    pub data: PreprocessConfig,
    /// Share of the series held out for evaluation.
    pub test_fraction: f64,
    /// SARIMAX orders.
    pub sarimax: SarimaxSpec,
    /// Holt-Winters components and period.
    pub holt_winters: HoltWintersConfig,
}

impl PipelineConfig {
    /// Check the documented parameter bounds before running anything.
    pub fn validate(&self) -> Result<()> {
        if !self.test_fraction.is_finite()
            || self.test_fraction <= 0.0
            || self.test_fraction >= 1.0
        {
            return Err(ForecastError::InvalidConfig(format!(
                "test fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        let spec = &self.sarimax;
        let orders = [
            spec.p,
            spec.d,
            spec.q,
            spec.seasonal_p,
            spec.seasonal_d,
            spec.seasonal_q,
        ];
        if orders.iter().any(|&o| o > MAX_ORDER) {
            return Err(ForecastError::InvalidConfig(format!(
                "SARIMAX orders must not exceed {MAX_ORDER}"
            )));
        }
        if spec.period == 0 || spec.period > MAX_SEASONAL_PERIOD {
            return Err(ForecastError::InvalidConfig(format!(
                "SARIMAX seasonal period must be in 1..={MAX_SEASONAL_PERIOD}, got {}",
                spec.period
            )));
        }
        let hw = &self.holt_winters;
        if hw.seasonal_periods == 0 || hw.seasonal_periods > MAX_SEASONAL_PERIOD {
            return Err(ForecastError::InvalidConfig(format!(
                "Holt-Winters seasonal period must be in 1..={MAX_SEASONAL_PERIOD}, got {}",
                hw.seasonal_periods
            )));
        }
        Ok(())
    }
}

/// The outcome of one model within a run. A failed fit is captured here
/// so the other model's results survive.
#[derive(Debug)]
pub struct ModelRun {
    /// Report key of the model.
    pub model: &'static str,
    /// Forecast, or the structured failure naming the model.
    pub outcome: Result<Forecast>,
}

impl ModelRun {
    /// The forecast, if the model succeeded.
    pub fn forecast(&self) -> Option<&Forecast> {
        self.outcome.as_ref().ok()
    }
}

/// Everything a run produces.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// The full cleaned series.
    pub series: TimeSeries,
    /// Training prefix.
    pub train: TimeSeries,
    /// Held-out suffix.
    pub test: TimeSeries,
    /// Per-model outcomes, in report order.
    pub runs: Vec<ModelRun>,
    /// KPI rows for the models that succeeded.
    pub report: KpiReport,
}

/// Run the full pipeline on an uploaded table.
pub fn run(table: &RawTable, config: &PipelineConfig) -> Result<PipelineOutcome> {
    config.validate()?;
    let series = preprocess(table, &config.data)?;
    run_series(series, config)
}

/// Run the pipeline stages downstream of preprocessing.
pub fn run_series(series: TimeSeries, config: &PipelineConfig) -> Result<PipelineOutcome> {
    config.validate()?;
    let (train, test) = split(&series, config.test_fraction)?;
    let horizon = test.len();
    debug!(
        "split {} observations into {} train / {} test",
        series.len(),
        train.len(),
        horizon
    );

    let sarimax = Sarimax::new(config.sarimax);
    let holt_winters = HoltWinters::new(
        config.holt_winters.trend,
        config.holt_winters.seasonal,
        config.holt_winters.seasonal_periods,
    );
    let runs = vec![
        fit_and_forecast(SARIMAX_MODEL, Box::new(sarimax), &train, horizon),
        fit_and_forecast(HOLT_WINTERS_MODEL, Box::new(holt_winters), &train, horizon),
    ];

    let succeeded: Vec<(&str, &Forecast)> = runs
        .iter()
        .filter_map(|r| r.forecast().map(|f| (r.model, f)))
        .collect();
    let report = evaluate(&test, &succeeded)?;

    Ok(PipelineOutcome {
        series,
        train,
        test,
        runs,
        report,
    })
}

/// Fit one strategy and forecast the horizon, converting any failure into
/// a captured, model-naming error.
fn fit_and_forecast(
    model: &'static str,
    mut forecaster: Box<dyn Forecaster>,
    train: &TimeSeries,
    horizon: usize,
) -> ModelRun {
    let outcome = forecaster
        .fit(train)
        .and_then(|_| forecaster.predict(horizon))
        .map_err(|source| {
            warn!("{model} failed on {} training observations: {source}", train.len());
            ForecastError::ModelFit {
                model: model.to_string(),
                reason: source.to_string(),
            }
        });
    ModelRun { model, outcome }
}

/// An interactive session: the configuration plus the series derived from
/// the last upload.
///
/// This replaces ambient per-session state: the caller owns the session,
/// each pipeline stage stays a pure function of its inputs. The derived
/// series is kept so parameter changes re-split and re-fit without
/// re-reading the upload.
#[derive(Debug)]
pub struct Session {
    config: PipelineConfig,
    series: Option<TimeSeries>,
}

impl Session {
    /// Start a session with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            series: None,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The cleaned series from the last upload, if any.
    pub fn series(&self) -> Option<&TimeSeries> {
        self.series.as_ref()
    }

    /// Preprocess an uploaded table and keep the result for later runs.
    pub fn load(&mut self, table: &RawTable) -> Result<&TimeSeries> {
        self.config.validate()?;
        let series = preprocess(table, &self.config.data)?;
        Ok(self.series.insert(series))
    }

    /// Change the held-out share; takes effect on the next run.
    pub fn set_test_fraction(&mut self, test_fraction: f64) {
        self.config.test_fraction = test_fraction;
    }

    /// Change the SARIMAX orders; takes effect on the next run.
    pub fn set_sarimax(&mut self, spec: SarimaxSpec) {
        self.config.sarimax = spec;
    }

    /// Change the Holt-Winters setup; takes effect on the next run.
    pub fn set_holt_winters(&mut self, config: HoltWintersConfig) {
        self.config.holt_winters = config;
    }

    /// Run the pipeline on the loaded series.
    pub fn run(&self) -> Result<PipelineOutcome> {
        let series = self.series.clone().ok_or(ForecastError::EmptyData)?;
        run_series(series, &self.config)
    }
}
