//! Bilinear 2D interpolation, used for the volatility surface grid.

use crate::error::RiskEngineError;

/// Bilinear interpolator over a 2D grid `zs[i][j] = z(xs[i], ys[j])`.
///
/// Used for the implied volatility surface (§4.4: "bilinear interpolation
/// on (log-moneyness, sqrt(tenor))"), with flat extrapolation beyond the
/// grid boundary on each axis.
///
/// # Examples
///
/// ```
/// use risk_core::math::interpolators::BilinearInterpolator;
///
/// let xs = [0.0, 1.0];
/// let ys = [0.0, 1.0];
/// let zs = [vec![0.0, 1.0], vec![2.0, 3.0]];
/// let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
/// assert_eq!(interp.interpolate(0.5, 0.5), 1.5);
/// ```
#[derive(Debug, Clone)]
pub struct BilinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    zs: Vec<Vec<f64>>,
}

impl BilinearInterpolator {
    /// Construct a bilinear interpolator from sorted grid axes and values.
    ///
    /// # Errors
    /// `RiskEngineError::InputValidation` if either axis has fewer than 2
    /// points, or the grid dimensions don't match the axis lengths.
    pub fn new(xs: &[f64], ys: &[f64], zs: &[Vec<f64>]) -> Result<Self, RiskEngineError> {
        if xs.len() < 2 || ys.len() < 2 {
            return Err(RiskEngineError::InputValidation(format!(
                "need at least 2 points per axis, got {} x-points and {} y-points",
                xs.len(),
                ys.len()
            )));
        }
        if zs.len() != xs.len() {
            return Err(RiskEngineError::InputValidation(format!(
                "grid rows ({}) must match x-axis length ({})",
                zs.len(),
                xs.len()
            )));
        }
        for (i, row) in zs.iter().enumerate() {
            if row.len() != ys.len() {
                return Err(RiskEngineError::InputValidation(format!(
                    "grid row {i} length ({}) must match y-axis length ({})",
                    row.len(),
                    ys.len()
                )));
            }
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: zs.to_vec(),
        })
    }

    /// Interpolate `z(x, y)`, flat-extrapolating beyond the grid on each axis.
    pub fn interpolate(&self, x: f64, y: f64) -> f64 {
        let (xi, xt) = Self::locate(&self.xs, x);
        let (yi, yt) = Self::locate(&self.ys, y);

        let z00 = self.zs[xi][yi];
        let z01 = self.zs[xi][yi + 1];
        let z10 = self.zs[xi + 1][yi];
        let z11 = self.zs[xi + 1][yi + 1];

        let z0 = z00 + xt * (z10 - z00);
        let z1 = z01 + xt * (z11 - z01);
        z0 + yt * (z1 - z0)
    }

    /// Find the lower grid index and fractional position for `v` on `axis`,
    /// clamping `v` into range so callers get flat extrapolation.
    fn locate(axis: &[f64], v: f64) -> (usize, f64) {
        let lo = axis[0];
        let hi = axis[axis.len() - 1];
        let clamped = v.clamp(lo, hi);

        if clamped <= lo {
            return (0, 0.0);
        }
        if clamped >= hi {
            return (axis.len() - 2, 1.0);
        }

        let idx = match axis
            .binary_search_by(|probe| probe.partial_cmp(&clamped).expect("non-finite grid axis"))
        {
            Ok(i) if i == axis.len() - 1 => axis.len() - 2,
            Ok(i) => i,
            Err(i) => i - 1,
        };

        let t = (clamped - axis[idx]) / (axis[idx + 1] - axis[idx]);
        (idx, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_center_interpolation() {
        let xs = [0.0, 1.0];
        let ys = [0.0, 1.0];
        let zs = [vec![0.0, 1.0], vec![2.0, 3.0]];
        let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
        assert_relative_eq!(interp.interpolate(0.5, 0.5), 1.5);
    }

    #[test]
    fn test_corner_values_exact() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0];
        let zs = [vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]];
        let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
        assert_relative_eq!(interp.interpolate(2.0, 1.0), 5.0);
        assert_relative_eq!(interp.interpolate(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_flat_extrapolation_outside_grid() {
        let xs = [0.0, 1.0];
        let ys = [0.0, 1.0];
        let zs = [vec![0.0, 1.0], vec![2.0, 3.0]];
        let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
        assert_relative_eq!(interp.interpolate(-5.0, -5.0), 0.0);
        assert_relative_eq!(interp.interpolate(10.0, 10.0), 3.0);
    }

    #[test]
    fn test_mismatched_grid_rejected() {
        let xs = [0.0, 1.0];
        let ys = [0.0, 1.0];
        let zs = [vec![0.0, 1.0]];
        assert!(BilinearInterpolator::new(&xs, &ys, &zs).is_err());
    }
}
