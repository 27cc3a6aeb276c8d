//! Numerical utilities shared by the forecasting models.

pub mod optimization;

pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
