//! Solver configuration shared across root finders.

/// Configuration for root-finding algorithms.
///
/// # Examples
///
/// ```
/// use risk_core::math::solvers::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert!(config.tolerance < 1e-8);
/// assert!(config.max_iterations >= 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Convergence tolerance. The solver stops when `|f(x)| < tolerance`.
    pub tolerance: f64,
    /// Maximum number of iterations before giving up.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    /// `tolerance = 1e-10`, `max_iterations = 50`, matching the yield-solving
    /// budget (§4.3: tolerance 1e-10 in yield, cap iterations at 50).
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 50,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with specified values.
    ///
    /// # Panics
    /// Panics if `tolerance <= 0` or `max_iterations == 0`.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        assert!(tolerance > 0.0, "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            tolerance,
            max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert!((config.tolerance - 1e-10).abs() < 1e-15);
        assert_eq!(config.max_iterations, 50);
    }

    #[test]
    #[should_panic(expected = "tolerance must be positive")]
    fn test_zero_tolerance_panics() {
        SolverConfig::new(0.0, 10);
    }

    #[test]
    #[should_panic(expected = "max_iterations must be > 0")]
    fn test_zero_iterations_panics() {
        SolverConfig::new(1e-8, 0);
    }
}
