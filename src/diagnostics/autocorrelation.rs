//! Autocorrelation diagnostics backing the ACF/PACF panels.

/// Autocorrelation for lags `0..=max_lag`.
///
/// Lags at or beyond the series length come back as NaN; a constant series
/// has zero autocorrelation at every positive lag.
pub fn acf(series: &[f64], max_lag: usize) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return vec![f64::NAN; max_lag + 1];
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    let denominator: f64 = series.iter().map(|x| (x - mean).powi(2)).sum();

    (0..=max_lag)
        .map(|lag| {
            if lag >= n {
                return f64::NAN;
            }
            if denominator < 1e-10 {
                return if lag == 0 { 1.0 } else { 0.0 };
            }
            let numerator: f64 = series
                .iter()
                .skip(lag)
                .zip(series.iter())
                .map(|(x, x_lagged)| (x - mean) * (x_lagged - mean))
                .sum();
            numerator / denominator
        })
        .collect()
}

/// Partial autocorrelation for lags `0..=max_lag` via Durbin-Levinson.
///
/// Lag 0 is 1 by convention. Lags the series cannot support, or steps where
/// the recursion degenerates, come back as NaN.
pub fn pacf(series: &[f64], max_lag: usize) -> Vec<f64> {
    let autocorr = acf(series, max_lag);
    let mut result = vec![f64::NAN; max_lag + 1];
    result[0] = 1.0;
    if max_lag == 0 {
        return result;
    }

    // phi[k][j]: coefficient j of the order-k autoregression.
    let mut phi = vec![vec![0.0; max_lag + 1]; max_lag + 1];

    if autocorr.len() > 1 && autocorr[1].is_finite() {
        phi[1][1] = autocorr[1];
        result[1] = autocorr[1];
    } else {
        return result;
    }

    for k in 2..=max_lag {
        if !autocorr.get(k).is_some_and(|r| r.is_finite()) {
            break;
        }

        let mut numerator = autocorr[k];
        let mut denominator = 1.0;
        for j in 1..k {
            numerator -= phi[k - 1][j] * autocorr[k - j];
            denominator -= phi[k - 1][j] * autocorr[j];
        }
        if denominator.abs() < 1e-10 {
            break;
        }

        phi[k][k] = numerator / denominator;
        for j in 1..k {
            phi[k][j] = phi[k - 1][j] - phi[k][k] * phi[k - 1][k - j];
        }
        result[k] = phi[k][k];
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn acf_lag_zero_is_one() {
        let series: Vec<f64> = (0..50).map(|i| (i as f64 * 0.7).sin()).collect();
        let result = acf(&series, 10);
        assert_relative_eq!(result[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn acf_detects_periodicity() {
        let period = 8;
        let series: Vec<f64> = (0..96)
            .map(|i| (std::f64::consts::TAU * i as f64 / period as f64).sin())
            .collect();
        let result = acf(&series, 16);

        // Strong positive correlation one full period out, negative at the
        // half period.
        assert!(result[period] > 0.7);
        assert!(result[period / 2] < -0.7);
    }

    #[test]
    fn acf_of_constant_series() {
        let series = vec![5.0; 20];
        let result = acf(&series, 5);
        assert_relative_eq!(result[0], 1.0);
        for lag in 1..=5 {
            assert_relative_eq!(result[lag], 0.0);
        }
    }

    #[test]
    fn acf_lags_beyond_length_are_nan() {
        let series = vec![1.0, 2.0, 3.0];
        let result = acf(&series, 5);
        assert!(result[3].is_nan());
        assert!(result[5].is_nan());
    }

    #[test]
    fn pacf_lag_one_matches_acf() {
        let mut series = vec![10.0];
        for i in 1..200 {
            let prev = series[i - 1];
            series.push(0.6 * prev + (i as f64 * 0.43).sin());
        }
        let autocorr = acf(&series, 5);
        let partial = pacf(&series, 5);

        assert_relative_eq!(partial[0], 1.0);
        assert_relative_eq!(partial[1], autocorr[1], epsilon = 1e-12);
    }

    #[test]
    fn pacf_of_ar1_cuts_off_after_lag_one() {
        // AR(1) process: PACF should be large at lag 1, near zero beyond.
        let mut series = vec![1.0];
        for i in 1..400 {
            let prev = series[i - 1];
            series.push(0.7 * prev + (i as f64 * 1.7).sin());
        }
        let partial = pacf(&series, 6);

        assert!(partial[1] > 0.4);
        for lag in 3..=6 {
            assert!(partial[lag].abs() < 0.3, "lag {lag}: {}", partial[lag]);
        }
    }
}
