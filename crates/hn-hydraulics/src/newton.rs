//! Damped Newton iteration with a pressure floor.

use nalgebra::{DMatrix, DVector};

use crate::error::{SolverError, SolverResult};
use crate::settings::SolverSettings;

/// Newton solver configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonConfig {
    pub max_iterations: usize,
    /// Absolute tolerance for the residual norm.
    pub abs_tol: f64,
    /// Lowest admissible value of any unknown.
    pub lower_bound: f64,
    /// Line search backtracking factor.
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self::from(&SolverSettings::default())
    }
}

impl From<&SolverSettings> for NewtonConfig {
    fn from(s: &SolverSettings) -> Self {
        Self {
            max_iterations: s.max_iterations,
            abs_tol: s.tolerance,
            lower_bound: s.min_pressure,
            line_search_beta: s.line_search_beta,
            max_line_search_iters: s.max_line_search_iters,
        }
    }
}

/// Newton iteration result.
#[derive(Debug, Clone)]
pub struct NewtonResult {
    pub x: DVector<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

/// Accepted point of one line search.
struct Trial {
    x: DVector<f64>,
    r: DVector<f64>,
    norm: f64,
    alpha: f64,
}

/// Shorten `dx` until the point stays above the floor and the residual
/// norm drops below `r_norm`, or the iteration budget is spent.
fn backtrack<F>(
    x: &DVector<f64>,
    dx: &DVector<f64>,
    r_norm: f64,
    residual_fn: &F,
    config: &NewtonConfig,
) -> SolverResult<Trial>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let mut alpha = 1.0;
    let mut trial_x = x + dx;
    let mut trial_r = residual_fn(&trial_x)?;
    for _ in 0..config.max_line_search_iters {
        let above_floor = trial_x.iter().all(|&p| p >= config.lower_bound);
        if above_floor && trial_r.norm() < r_norm {
            break;
        }
        alpha *= config.line_search_beta;
        trial_x = x + alpha * dx;
        trial_r = residual_fn(&trial_x)?;
    }
    let norm = trial_r.norm();
    Ok(Trial {
        x: trial_x,
        r: trial_r,
        norm,
        alpha,
    })
}

/// Solve `residual(x) = 0` by Newton's method with backtracking.
///
/// Returns after zero iterations when `x0` already satisfies the tolerance,
/// which is the common case for a warm-started solve with unchanged demand.
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();
    let mut iterations = 0;

    while r_norm >= config.abs_tol {
        if iterations == config.max_iterations {
            return Err(SolverError::ConvergenceFailed {
                what: format!(
                    "maximum iterations {} reached, residual = {r_norm:e}",
                    config.max_iterations
                ),
            });
        }

        let dx = jacobian_fn(&x)?
            .lu()
            .solve(&(-r.clone()))
            .ok_or_else(|| SolverError::Numeric {
                what: format!("singular Jacobian at iteration {iterations}"),
            })?;
        let trial = backtrack(&x, &dx, r_norm, &residual_fn, config)?;
        if !trial.norm.is_finite() {
            return Err(SolverError::Numeric {
                what: format!("non-finite residual at iteration {iterations}"),
            });
        }
        if trial.alpha < 1e-10 {
            return Err(SolverError::ConvergenceFailed {
                what: format!(
                    "line search stagnated at iteration {iterations}, residual = {:e}",
                    trial.norm
                ),
            });
        }

        x = trial.x;
        r = trial.r;
        r_norm = trial.norm;
        iterations += 1;
    }

    Ok(NewtonResult {
        x,
        residual_norm: r_norm,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // x^2 - 4 = 0 with x > 0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let config = NewtonConfig {
            abs_tol: 1e-10,
            lower_bound: 0.0,
            ..NewtonConfig::default()
        };
        let result =
            newton_solve(DVector::from_element(1, 3.0), residual, jacobian, &config).unwrap();
        assert!((result.x[0] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn iteration_limit_reports_convergence_failure() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0].exp()))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, x[0].exp()))
        };
        let config = NewtonConfig {
            max_iterations: 3,
            abs_tol: 1e-30,
            lower_bound: f64::NEG_INFINITY,
            ..NewtonConfig::default()
        };
        let err = newton_solve(DVector::from_element(1, 0.0), residual, jacobian, &config)
            .unwrap_err();
        assert!(matches!(err, SolverError::ConvergenceFailed { .. }));
    }
}
