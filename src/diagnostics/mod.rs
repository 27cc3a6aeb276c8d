//! Series diagnostics: the numbers behind the ACF/PACF and decomposition
//! panels.

mod autocorrelation;
mod decompose;

pub use autocorrelation::{acf, pacf};
pub use decompose::{decompose, Decomposition};
