//! Forecast result structure for holding predictions.

/// Point predictions produced by a forecasting model.
///
/// Predictions are aligned positionally to the evaluation horizon: the
/// value at index `h` is the prediction `h + 1` steps past the end of the
/// training series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(point: Vec<f64>) -> Self {
        Self { point }
    }

    /// The point predictions.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Whether the forecast holds no predictions.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_from_values() {
        let forecast = Forecast::from_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(forecast.horizon(), 3);
        assert!(!forecast.is_empty());
        assert_eq!(forecast.point(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_forecast() {
        let forecast = Forecast::new();
        assert_eq!(forecast.horizon(), 0);
        assert!(forecast.is_empty());
    }
}
