//! Limits: thresholds the limit/alert evaluator (C11) checks metrics against.

use serde::{Deserialize, Serialize};

use crate::ids::PortfolioId;

/// A configured limit on a single metric for a single portfolio.
///
/// `usage = current / limit_value` is compared against `warning_threshold`
/// and `critical_threshold` to derive an [`crate::AlertSeverity`] per §4.11.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    /// Portfolio this limit applies to.
    pub portfolio_id: PortfolioId,
    /// Machine-readable metric identifier, e.g. `"var_1d_95"`, `"dv01_total"`.
    pub metric_code: String,
    /// The limit value the metric is measured against.
    pub limit_value: f64,
    /// Usage fraction in `(0, 1]` above which a Yellow alert is raised.
    pub warning_threshold: f64,
    /// Usage fraction in `(warning_threshold, 1]` above which a Red alert is
    /// raised.
    pub critical_threshold: f64,
}

impl Limit {
    /// Construct a limit.
    ///
    /// # Panics
    /// Panics if the thresholds are not ordered `0 < warning < critical <= 1`.
    pub fn new(
        portfolio_id: impl Into<PortfolioId>,
        metric_code: impl Into<String>,
        limit_value: f64,
        warning_threshold: f64,
        critical_threshold: f64,
    ) -> Self {
        assert!(
            warning_threshold > 0.0 && warning_threshold <= 1.0,
            "warning_threshold must be in (0, 1]"
        );
        assert!(
            critical_threshold > warning_threshold && critical_threshold <= 1.0,
            "critical_threshold must be in (warning_threshold, 1]"
        );
        Self {
            portfolio_id: portfolio_id.into(),
            metric_code: metric_code.into(),
            limit_value,
            warning_threshold,
            critical_threshold,
        }
    }
}
