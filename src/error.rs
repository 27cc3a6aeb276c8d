//! Error types for the forecast-compare library.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while loading, preparing, or forecasting data.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Input data is empty (or no rows survived parsing).
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid pipeline configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Named column is not present in the table.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// CSV parsing failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure while reading input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A forecasting model failed to fit or predict.
    #[error("model {model} failed: {reason}")]
    ModelFit { model: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = ForecastError::InsufficientData { needed: 24, got: 10 };
        assert_eq!(err.to_string(), "insufficient data: need at least 24, got 10");

        let err = ForecastError::ColumnNotFound("sales".to_string());
        assert_eq!(err.to_string(), "column not found: sales");

        let err = ForecastError::ModelFit {
            model: "SARIMAX".to_string(),
            reason: "seasonal period exceeds series length".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "model SARIMAX failed: seasonal period exceeds series length"
        );
    }
}
