//! Bracketed bisection root finder.
//!
//! Used to establish a safe starting bracket before handing off to
//! [`super::newton_raphson::NewtonRaphsonSolver`] for quadratic refinement,
//! matching the YTM solving procedure of §4.3: "bracketed bisection in
//! [-0.5, 1.0], then Newton refine".

use super::{SolverConfig, SolverError};

/// Bisection root finder.
///
/// Bisection always converges given a valid bracket (`f(a)` and `f(b)` of
/// opposite sign) but only linearly; it exists here purely to narrow a wide
/// bracket before Newton-Raphson takes over.
#[derive(Debug, Clone, Copy)]
pub struct BisectionSolver {
    config: SolverConfig,
}

impl BisectionSolver {
    /// Create a new bisection solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Find a root of `f` in the bracket `[a, b]`.
    ///
    /// # Errors
    /// `SolverError::NoBracket` if `f(a)` and `f(b)` share a sign.
    /// `SolverError::MaxIterationsExceeded` if convergence is not reached
    /// within `config.max_iterations`.
    pub fn find_root<F>(&self, f: F, mut a: f64, mut b: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        let mut fa = f(a);
        let fb = f(b);

        if fa * fb > 0.0 {
            return Err(SolverError::NoBracket { a, b });
        }

        for _ in 0..self.config.max_iterations {
            let mid = 0.5 * (a + b);
            let fmid = f(mid);

            if !fmid.is_finite() {
                return Err(SolverError::NumericalInstability(
                    "bisection produced a non-finite value".to_string(),
                ));
            }

            if fmid.abs() < self.config.tolerance || (b - a).abs() < self.config.tolerance {
                return Ok(mid);
            }

            if fa * fmid <= 0.0 {
                b = mid;
            } else {
                a = mid;
                fa = fmid;
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}
