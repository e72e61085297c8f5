//! Piecewise linear interpolation over sorted (x, y) data.

use crate::error::RiskEngineError;

/// Piecewise linear interpolator over sorted `(x, y)` points.
///
/// Used for zero-rate curve interpolation (§3: "Interpolation: linear in
/// zero rate") with flat extrapolation outside the observed tenor range.
///
/// # Examples
///
/// ```
/// use risk_core::math::interpolators::LinearInterpolator;
///
/// let interp = LinearInterpolator::new(&[0.0, 1.0, 2.0], &[0.0, 2.0, 4.0]).unwrap();
/// assert_eq!(interp.interpolate(0.5), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolator {
    /// Construct an interpolator from data points, sorting by `x` if needed.
    ///
    /// # Errors
    /// `RiskEngineError::InputValidation` if `xs`/`ys` differ in length or
    /// fewer than 2 points are supplied.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, RiskEngineError> {
        if xs.len() != ys.len() {
            return Err(RiskEngineError::InputValidation(format!(
                "xs and ys must have equal length: got {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(RiskEngineError::InputValidation(format!(
                "need at least 2 points, got {}",
                xs.len()
            )));
        }

        let mut pairs: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("non-finite x coordinate"));

        Ok(Self {
            xs: pairs.iter().map(|p| p.0).collect(),
            ys: pairs.iter().map(|p| p.1).collect(),
        })
    }

    /// The `(min, max)` range of observed x-coordinates.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Interpolate at `x`, flat-extrapolating beyond the observed domain.
    pub fn interpolate(&self, x: f64) -> f64 {
        let (lo, hi) = self.domain();
        if x <= lo {
            return self.ys[0];
        }
        if x >= hi {
            return self.ys[self.ys.len() - 1];
        }

        // Binary search for the bracketing segment.
        let idx = match self
            .xs
            .binary_search_by(|probe| probe.partial_cmp(&x).expect("non-finite query point"))
        {
            Ok(i) => return self.ys[i],
            Err(i) => i,
        };

        let (x0, x1) = (self.xs[idx - 1], self.xs[idx]);
        let (y0, y1) = (self.ys[idx - 1], self.ys[idx]);
        let t = (x - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_midpoint_interpolation() {
        let interp = LinearInterpolator::new(&[0.0, 1.0, 2.0], &[0.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(interp.interpolate(0.5), 1.0);
        assert_relative_eq!(interp.interpolate(1.5), 3.0);
    }

    #[test]
    fn test_flat_extrapolation() {
        let interp = LinearInterpolator::new(&[1.0, 2.0], &[0.05, 0.06]).unwrap();
        assert_relative_eq!(interp.interpolate(0.1), 0.05);
        assert_relative_eq!(interp.interpolate(10.0), 0.06);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let interp = LinearInterpolator::new(&[2.0, 0.0, 1.0], &[4.0, 0.0, 2.0]).unwrap();
        assert_relative_eq!(interp.interpolate(0.5), 1.0);
    }

    #[test]
    fn test_insufficient_data_rejected() {
        let result = LinearInterpolator::new(&[1.0], &[1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let result = LinearInterpolator::new(&[1.0, 2.0], &[1.0]);
        assert!(result.is_err());
    }
}
