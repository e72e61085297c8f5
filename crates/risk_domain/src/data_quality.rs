//! Data-quality issues emitted by the data-quality evaluator (C2).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a data-quality issue. Unlike [`crate::AlertSeverity`], this
/// does not feed the limit evaluator directly; only `Error` issues that
/// touch a position's price path downgrade that position to `Unpriced`
/// (§4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DqSeverity {
    /// Informational; does not affect pricing or snapshot status.
    Info,
    /// Notable but does not block pricing.
    Warning,
    /// Blocks pricing of any position whose price path it touches.
    Error,
}

/// Where a data-quality issue was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DqSource {
    /// A position-level field (trade/maturity date, notional, ...).
    Position,
    /// A market price or FX quote.
    Market,
    /// A yield curve or vol surface.
    Curve,
}

/// A single data-quality rule violation, identified by its rule code (e.g.
/// `"DQ-01"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    /// Rule code, e.g. `"DQ-01"` .. `"DQ-41"`.
    pub code: String,
    /// Severity of the violation.
    pub severity: DqSeverity,
    /// Which part of the input the issue was detected in.
    pub source: DqSource,
    /// Instrument id or snapshot id the issue references.
    pub reference: String,
    /// When the issue was detected.
    pub detected_at: DateTime<Utc>,
}

impl DataQualityIssue {
    /// Construct a data-quality issue.
    pub fn new(
        code: impl Into<String>,
        severity: DqSeverity,
        source: DqSource,
        reference: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            source,
            reference: reference.into(),
            detected_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(DqSeverity::Info < DqSeverity::Warning);
        assert!(DqSeverity::Warning < DqSeverity::Error);
    }

    #[test]
    fn test_construct_issue() {
        let issue = DataQualityIssue::new(
            "DQ-03",
            DqSeverity::Error,
            DqSource::Market,
            "US0000000001",
            Utc::now(),
        );
        assert_eq!(issue.code, "DQ-03");
    }
}
