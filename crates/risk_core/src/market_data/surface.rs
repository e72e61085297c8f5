//! Implied volatility surfaces.

use crate::error::RiskEngineError;
use crate::math::interpolators::BilinearInterpolator;

/// An implied volatility surface, gridded on `(log-moneyness, sqrt(tenor))`
/// and bilinearly interpolated between grid points, flat beyond the grid.
///
/// Querying by `(tenor, strike, forward)` rather than raw grid coordinates
/// keeps the log-moneyness transform internal to the surface, so every
/// caller (cap/floor pricer, swaption pricer, FX option pricer) gets the
/// same interpolation behaviour.
///
/// # Examples
///
/// ```
/// use risk_core::market_data::VolSurface;
///
/// let tenors = [0.5, 1.0];
/// let log_moneyness = [-0.1, 0.0, 0.1];
/// let vols = [
///     vec![0.22, 0.20, 0.21],
///     vec![0.24, 0.22, 0.23],
/// ];
/// let surface = VolSurface::new(&tenors, &log_moneyness, &vols).unwrap();
/// let vol = surface.vol(0.75, 100.0, 100.0);
/// assert!(vol > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct VolSurface {
    interpolator: BilinearInterpolator,
}

impl VolSurface {
    /// Build a surface from tenor (years) and log-moneyness axes plus a
    /// `tenors.len() x log_moneyness.len()` grid of implied vols.
    ///
    /// # Errors
    /// `RiskEngineError::InputValidation` if tenors or log-moneyness are not
    /// strictly increasing, or the grid shape doesn't match the axes.
    pub fn new(
        tenors: &[f64],
        log_moneyness: &[f64],
        vols: &[Vec<f64>],
    ) -> Result<Self, RiskEngineError> {
        for w in tenors.windows(2) {
            if w[1] <= w[0] {
                return Err(RiskEngineError::InputValidation(
                    "vol surface tenors must be strictly increasing".to_string(),
                ));
            }
        }
        for w in log_moneyness.windows(2) {
            if w[1] <= w[0] {
                return Err(RiskEngineError::InputValidation(
                    "vol surface log-moneyness axis must be strictly increasing".to_string(),
                ));
            }
        }
        if tenors.iter().any(|t| *t <= 0.0) {
            return Err(RiskEngineError::InputValidation(
                "vol surface tenors must be positive".to_string(),
            ));
        }

        let sqrt_tenors: Vec<f64> = tenors.iter().map(|t| t.sqrt()).collect();

        Ok(Self {
            interpolator: BilinearInterpolator::new(&sqrt_tenors, log_moneyness, vols)?,
        })
    }

    /// Implied volatility for `tenor` years and `strike` against `forward`,
    /// interpolated at `(sqrt(tenor), ln(strike / forward))`.
    ///
    /// # Panics
    /// Panics if `forward <= 0.0` or `strike <= 0.0`; the caller is expected
    /// to have already rejected non-positive forwards/strikes upstream.
    pub fn vol(&self, tenor: f64, strike: f64, forward: f64) -> f64 {
        assert!(forward > 0.0, "forward must be positive");
        assert!(strike > 0.0, "strike must be positive");
        let log_moneyness = (strike / forward).ln();
        self.interpolator.interpolate(tenor.max(0.0).sqrt(), log_moneyness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_surface() -> VolSurface {
        let tenors = [0.5, 1.0];
        let log_moneyness = [-0.1, 0.0, 0.1];
        let vols = vec![vec![0.22, 0.20, 0.21], vec![0.24, 0.22, 0.23]];
        VolSurface::new(&tenors, &log_moneyness, &vols).unwrap()
    }

    #[test]
    fn test_at_the_money_grid_point() {
        let surface = sample_surface();
        assert_relative_eq!(surface.vol(0.5, 100.0, 100.0), 0.20, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolates_between_tenors() {
        let surface = sample_surface();
        // sqrt(0.5) ~ 0.7071, sqrt(1.0) = 1.0; query a tenor in between.
        let vol = surface.vol(0.75, 100.0, 100.0);
        assert!(vol > 0.20 && vol < 0.22);
    }

    #[test]
    fn test_rejects_non_increasing_axis() {
        let tenors = [1.0, 1.0];
        let log_moneyness = [-0.1, 0.0];
        let vols = vec![vec![0.2, 0.2], vec![0.2, 0.2]];
        assert!(VolSurface::new(&tenors, &log_moneyness, &vols).is_err());
    }

    #[test]
    #[should_panic(expected = "forward must be positive")]
    fn test_rejects_non_positive_forward() {
        let surface = sample_surface();
        surface.vol(0.5, 100.0, 0.0);
    }
}
