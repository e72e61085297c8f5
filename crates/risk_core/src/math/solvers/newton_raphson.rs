//! Newton-Raphson root-finding solver.

use super::{SolverConfig, SolverError};

/// Newton-Raphson root finder.
///
/// Uses Newton's method: `x_{n+1} = x_n - f(x_n) / f'(x_n)` for quadratic
/// convergence once the iterate is close to the root.
///
/// # Examples
///
/// ```
/// use risk_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
///
/// let solver = NewtonRaphsonSolver::new(SolverConfig::default());
/// let f = |x: f64| x * x - 2.0;
/// let f_prime = |x: f64| 2.0 * x;
///
/// let root = solver.find_root(f, f_prime, 1.0).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NewtonRaphsonSolver {
    config: SolverConfig,
}

impl NewtonRaphsonSolver {
    /// Create a new Newton-Raphson solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Find a root of `f` using explicit derivative `f_prime`, starting from `x0`.
    ///
    /// # Errors
    /// `SolverError::DerivativeNearZero` if `f'(x)` underflows during an
    /// iteration; `SolverError::MaxIterationsExceeded` if convergence is not
    /// reached within the configured budget.
    pub fn find_root<F, G>(&self, f: F, f_prime: G, x0: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
        G: Fn(f64) -> f64,
    {
        let mut x = x0;
        const EPSILON: f64 = 1e-30;

        for _iteration in 0..self.config.max_iterations {
            let f_val = f(x);

            if f_val.abs() < self.config.tolerance {
                return Ok(x);
            }

            let f_prime_val = f_prime(x);
            if f_prime_val.abs() < EPSILON {
                return Err(SolverError::DerivativeNearZero { x });
            }

            x -= f_val / f_prime_val;

            if !x.is_finite() {
                return Err(SolverError::NumericalInstability(
                    "Newton iteration produced a non-finite value".to_string(),
                ));
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}
