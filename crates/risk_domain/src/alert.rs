//! Alerts: severity-classified breaches raised by the limit evaluator (C11).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::PortfolioId;

/// Alert severity, monotone in usage (§8 invariant 8).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    /// Usage below the warning threshold; no alert is actually emitted at
    /// this severity (§4.11), but it is a valid classification result.
    Green,
    /// Usage at or above the warning threshold.
    Yellow,
    /// Usage at or above the critical threshold.
    Red,
    /// Usage at or above 1.0 (breach), or a regulatory floor override.
    Critical,
}

/// A breach of a configured [`crate::Limit`] or a regulatory floor, raised
/// by the limit/alert evaluator (C11).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Portfolio the alert concerns.
    pub portfolio_id: PortfolioId,
    /// Metric code the alert was raised against.
    pub metric: String,
    /// The metric's value at evaluation time.
    pub current_value: f64,
    /// The configured limit value (or regulatory floor) being measured
    /// against.
    pub limit_value: f64,
    /// Classified severity.
    pub severity: AlertSeverity,
    /// When the alert was raised.
    pub created_at: DateTime<Utc>,
    /// Whether a downstream collaborator has acknowledged the alert. The
    /// engine never sets this; it is always `false` on creation.
    pub acknowledged: bool,
}

impl Alert {
    /// Construct a freshly raised, unacknowledged alert.
    pub fn new(
        portfolio_id: impl Into<PortfolioId>,
        metric: impl Into<String>,
        current_value: f64,
        limit_value: f64,
        severity: AlertSeverity,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            metric: metric.into(),
            current_value,
            limit_value,
            severity,
            created_at,
            acknowledged: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering_is_monotone() {
        assert!(AlertSeverity::Green < AlertSeverity::Yellow);
        assert!(AlertSeverity::Yellow < AlertSeverity::Red);
        assert!(AlertSeverity::Red < AlertSeverity::Critical);
    }

    #[test]
    fn test_new_alert_is_unacknowledged() {
        let alert = Alert::new(
            "PORT-1",
            "var_1d_95",
            120_000.0,
            100_000.0,
            AlertSeverity::Critical,
            Utc::now(),
        );
        assert!(!alert.acknowledged);
    }
}
