//! Derivative-free minimization for model parameter estimation.

use std::cmp::Ordering;

/// Configuration for the Nelder-Mead simplex search.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the simplex value spread.
    pub tolerance: f64,
    /// Relative step used to build the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.05,
        }
    }
}

/// Result of a Nelder-Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at the best point.
    pub optimal_value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the value spread fell below tolerance.
    pub converged: bool,
}

/// Minimize `objective` with the Nelder-Mead simplex method.
///
/// `bounds`, when given, clamps every candidate point coordinate-wise; the
/// CSS/SSE objectives optimized here are all box-constrained. Standard
/// coefficients: reflection 1, expansion 2, contraction 0.5, shrink 0.5.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |point: Vec<f64>| -> Vec<f64> {
        match bounds {
            Some(bounds) => point
                .iter()
                .zip(bounds)
                .map(|(&x, &(lo, hi))| x.clamp(lo, hi))
                .collect(),
            None => point,
        }
    };

    // Initial simplex: the starting point plus one perturbed vertex per
    // dimension.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(clamp(initial.to_vec()));
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        simplex.push(clamp(vertex));
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        // Order vertices best-to-worst.
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
        let simplex_sorted: Vec<Vec<f64>> = order.iter().map(|&i| simplex[i].clone()).collect();
        let values_sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        simplex = simplex_sorted;
        values = values_sorted;

        if values[n] - values[0] < config.tolerance {
            converged = true;
            break;
        }

        // Centroid of all vertices but the worst.
        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|v| v[j]).sum::<f64>() / n as f64)
            .collect();

        let reflected = clamp(
            centroid
                .iter()
                .zip(&simplex[n])
                .map(|(c, w)| c + (c - w))
                .collect(),
        );
        let reflected_value = objective(&reflected);

        if reflected_value < values[0] {
            // Try expanding past the reflection.
            let expanded = clamp(
                centroid
                    .iter()
                    .zip(&simplex[n])
                    .map(|(c, w)| c + 2.0 * (c - w))
                    .collect(),
            );
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[n] = expanded;
                values[n] = expanded_value;
            } else {
                simplex[n] = reflected;
                values[n] = reflected_value;
            }
        } else if reflected_value < values[n - 1] {
            simplex[n] = reflected;
            values[n] = reflected_value;
        } else {
            // Contract: outside when the reflection beats the worst
            // vertex, inside otherwise.
            let contracted = if reflected_value < values[n] {
                clamp(
                    centroid
                        .iter()
                        .zip(&reflected)
                        .map(|(c, r)| c + 0.5 * (r - c))
                        .collect(),
                )
            } else {
                clamp(
                    centroid
                        .iter()
                        .zip(&simplex[n])
                        .map(|(c, w)| c + 0.5 * (w - c))
                        .collect(),
                )
            };
            let contracted_value = objective(&contracted);

            if contracted_value < reflected_value.min(values[n]) {
                simplex[n] = contracted;
                values[n] = contracted_value;
            } else {
                // Shrink everything toward the best vertex.
                let best = simplex[0].clone();
                for i in 1..=n {
                    let shrunk = clamp(
                        best.iter()
                            .zip(&simplex[i])
                            .map(|(b, v)| b + 0.5 * (v - b))
                            .collect(),
                    );
                    values[i] = objective(&shrunk);
                    simplex[i] = shrunk;
                }
            }
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    NelderMeadResult {
        optimal_point: simplex[best].clone(),
        optimal_value: values[best],
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn minimizes_a_quadratic_bowl() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] + 3.0).powi(2),
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], -3.0, epsilon = 1e-3);
    }

    #[test]
    fn respects_bounds() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2),
            &[0.5],
            Some(&[(0.0, 1.0)]),
            NelderMeadConfig::default(),
        );

        // Unconstrained optimum is 2; the bound pins it at 1.
        assert!(result.optimal_point[0] <= 1.0);
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let result = nelder_mead(|_| 0.0, &[], None, NelderMeadConfig::default());
        assert!(result.optimal_point.is_empty());
        assert!(!result.converged);
    }

    #[test]
    fn one_dimensional_minimum() {
        let result = nelder_mead(
            |x| (x[0] - 0.3).powi(2) + 1.0,
            &[0.9],
            Some(&[(0.0001, 0.9999)]),
            NelderMeadConfig::default(),
        );

        assert_relative_eq!(result.optimal_point[0], 0.3, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_value, 1.0, epsilon = 1e-6);
    }
}
