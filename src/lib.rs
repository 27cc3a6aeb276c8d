//! # forecast-compare
//!
//! The reproducible core of a forecasting comparison dashboard: load a
//! time-series CSV, preprocess it into a clean, regularly spaced series,
//! split off a held-out suffix, fit SARIMAX and Holt-Winters strategies,
//! and compare their accuracy (MAE, MAPE, R²) side by side.
//!
//! The flow is strictly linear and synchronous:
//! Load -> Preprocess -> Split -> Forecast(x2) -> Evaluate.
//!
//! ```no_run
//! use forecast_compare::data::{PreprocessConfig, RawTable};
//! use forecast_compare::core::Frequency;
//! use forecast_compare::models::{Component, SarimaxSpec};
//! use forecast_compare::pipeline::{run, HoltWintersConfig, PipelineConfig};
//!
//! # fn main() -> forecast_compare::Result<()> {
//! let table = RawTable::from_path("sales.csv")?;
//! let config = PipelineConfig {
//!     data: PreprocessConfig {
//!         date_column: "date".into(),
//!         target_column: "sales".into(),
//!         date_format: "%Y-%m-%d".into(),
//!         frequency: Frequency::Daily,
//!     },
//!     test_fraction: 0.2,
//!     sarimax: SarimaxSpec::new((1, 1, 1), (1, 1, 1, 12)),
//!     holt_winters: HoltWintersConfig {
//!         trend: Component::Additive,
//!         seasonal: Component::Additive,
//!         seasonal_periods: 12,
//!     },
//! };
//! let outcome = run(&table, &config)?;
//! for kpi in outcome.report.rows() {
//!     println!("{}: MAE {:.3}, MAPE {:.3}, R² {:.3}", kpi.model, kpi.mae, kpi.mape, kpi.r_squared);
//! }
//! # Ok(())
//! # }
//! ```

#![allow(clippy::too_many_arguments)]

pub mod core;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod evaluate;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, Frequency, TimeSeries};
    pub use crate::data::{preprocess, split, PreprocessConfig, RawTable};
    pub use crate::error::{ForecastError, Result};
    pub use crate::evaluate::{evaluate, Kpi, KpiReport};
    pub use crate::models::{Component, Forecaster, HoltWinters, Sarimax, SarimaxSpec};
    pub use crate::pipeline::{run, HoltWintersConfig, PipelineConfig, Session};
}
