//! Zero-coupon yield curves.

use crate::error::RiskEngineError;
use crate::math::interpolators::LinearInterpolator;

/// A zero-coupon yield curve: an ordered sequence of `(tenor_years,
/// zero_rate)` points, linearly interpolated in zero rate with flat
/// extrapolation beyond the observed tenors.
///
/// Discount factors use annual compounding, `DF(t) = (1 + z(t))^-t`, to stay
/// consistent with the bond pricer's compounding convention.
///
/// # Examples
///
/// ```
/// use risk_core::market_data::YieldCurve;
///
/// let curve = YieldCurve::new(&[0.5, 1.0, 5.0], &[0.04, 0.045, 0.05]).unwrap();
/// let z = curve.zero_rate(2.0);
/// assert!((z - 0.04625).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct YieldCurve {
    interpolator: LinearInterpolator,
}

impl YieldCurve {
    /// Construct a yield curve from tenors (years) and matching zero rates.
    ///
    /// # Errors
    /// `RiskEngineError::InputValidation` if tenors are not strictly
    /// increasing, or fewer than 2 points are supplied.
    pub fn new(tenors: &[f64], zero_rates: &[f64]) -> Result<Self, RiskEngineError> {
        for w in tenors.windows(2) {
            if w[1] <= w[0] {
                return Err(RiskEngineError::InputValidation(
                    "yield curve tenors must be strictly increasing".to_string(),
                ));
            }
        }
        if tenors.iter().any(|t| *t <= 0.0) {
            return Err(RiskEngineError::InputValidation(
                "yield curve tenors must be positive".to_string(),
            ));
        }

        Ok(Self {
            interpolator: LinearInterpolator::new(tenors, zero_rates)?,
        })
    }

    /// Interpolated zero rate at tenor `t` (years), flat beyond the curve's
    /// observed domain.
    pub fn zero_rate(&self, t: f64) -> f64 {
        self.interpolator.interpolate(t)
    }

    /// Discount factor at tenor `t`, `(1 + z(t))^-t`.
    pub fn discount_factor(&self, t: f64) -> f64 {
        (1.0 + self.zero_rate(t)).powf(-t)
    }

    /// The `(min, max)` tenor range with observed data.
    pub fn domain(&self) -> (f64, f64) {
        self.interpolator.domain()
    }

    /// Build a new curve with every zero rate shifted by `shift_bps` basis
    /// points, used for parallel-shift stress scenarios and the swap DV01
    /// bump-and-revalue.
    pub fn parallel_shift_bps(&self, shift_bps: f64) -> Self {
        let (lo, hi) = self.domain();
        let shift = shift_bps / 10_000.0;
        let sample_points = [lo, hi];
        let shocked_rates: Vec<f64> = sample_points
            .iter()
            .map(|t| self.zero_rate(*t) + shift)
            .collect();
        Self {
            interpolator: LinearInterpolator::new(&sample_points, &shocked_rates)
                .expect("two distinct sample points always form a valid curve"),
        }
    }
}
