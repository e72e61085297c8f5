//! C11: Limit/Alert Evaluator.
//!
//! Classifies each metric's usage against its configured [`Limit`] (§4.11:
//! `usage = current / limit_value`, Yellow at the warning threshold, Red at
//! the critical threshold, Critical at a full breach), plus two regulatory
//! floor overrides — capital ratio and LCR — that raise an alert even with
//! no limit configured for the metric, since those two are hard regulatory
//! minimums rather than internal risk appetite.

use chrono::{DateTime, Utc};
use risk_domain::{Alert, AlertSeverity, Limit, PortfolioId};

/// Capital ratio below this is always `Critical`, independent of any
/// configured limit.
pub const CAPITAL_RATIO_CRITICAL_FLOOR: f64 = 1.00;
/// LCR below this is always `Critical`.
pub const LCR_CRITICAL_FLOOR: f64 = 1.00;
/// LCR below this (and at/above the critical floor) is `Red`.
pub const LCR_RED_FLOOR: f64 = 1.05;
/// LCR below this (and at/above the red floor) is `Yellow`.
pub const LCR_YELLOW_FLOOR: f64 = 1.10;

/// Metric code used for the capital-ratio floor alert.
pub const METRIC_CAPITAL_RATIO: &str = "capital_ratio";
/// Metric code used for the LCR floor alert.
pub const METRIC_LCR: &str = "lcr_ratio";

/// Classify one metric's current value against a configured limit.
pub fn classify_against_limit(current_value: f64, limit: &Limit) -> AlertSeverity {
    if limit.limit_value <= 0.0 {
        return AlertSeverity::Green;
    }
    let usage = current_value / limit.limit_value;
    if usage >= 1.0 {
        AlertSeverity::Critical
    } else if usage >= limit.critical_threshold {
        AlertSeverity::Red
    } else if usage >= limit.warning_threshold {
        AlertSeverity::Yellow
    } else {
        AlertSeverity::Green
    }
}

/// Regulatory floor override for capital ratio.
pub fn classify_capital_ratio_floor(capital_ratio: f64) -> AlertSeverity {
    if capital_ratio < CAPITAL_RATIO_CRITICAL_FLOOR {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Green
    }
}

/// Regulatory floor override for LCR.
pub fn classify_lcr_floor(lcr_ratio: f64) -> AlertSeverity {
    if lcr_ratio < LCR_CRITICAL_FLOOR {
        AlertSeverity::Critical
    } else if lcr_ratio < LCR_RED_FLOOR {
        AlertSeverity::Red
    } else if lcr_ratio < LCR_YELLOW_FLOOR {
        AlertSeverity::Yellow
    } else {
        AlertSeverity::Green
    }
}

/// Evaluate every configured limit plus the two regulatory floor overrides
/// for one portfolio's metric values, returning every non-`Green`
/// classification as an [`Alert`] (§4.11: Green is a valid classification
/// but is never itself emitted as an alert).
pub fn evaluate(
    portfolio_id: &PortfolioId,
    metrics: &[(String, f64)],
    limits: &[Limit],
    capital_ratio: Option<f64>,
    lcr_ratio: Option<f64>,
    created_at: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for (metric_code, value) in metrics {
        if let Some(limit) = limits.iter().find(|l| &l.metric_code == metric_code) {
            let severity = classify_against_limit(*value, limit);
            if severity > AlertSeverity::Green {
                alerts.push(Alert::new(
                    portfolio_id.clone(),
                    metric_code.clone(),
                    *value,
                    limit.limit_value,
                    severity,
                    created_at,
                ));
            }
        }
    }

    if let Some(ratio) = capital_ratio {
        let severity = classify_capital_ratio_floor(ratio);
        if severity > AlertSeverity::Green {
            alerts.push(Alert::new(
                portfolio_id.clone(),
                METRIC_CAPITAL_RATIO,
                ratio,
                CAPITAL_RATIO_CRITICAL_FLOOR,
                severity,
                created_at,
            ));
        }
    }

    if let Some(ratio) = lcr_ratio {
        let severity = classify_lcr_floor(ratio);
        if severity > AlertSeverity::Green {
            alerts.push(Alert::new(
                portfolio_id.clone(),
                METRIC_LCR,
                ratio,
                LCR_YELLOW_FLOOR,
                severity,
                created_at,
            ));
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(metric: &str, value: f64, warn: f64, crit: f64) -> Limit {
        Limit::new("PORT-1", metric, value, warn, crit)
    }

    #[test]
    fn test_classify_against_limit_bands() {
        let l = limit("var_1d_95", 100_000.0, 0.7, 0.9);
        assert_eq!(classify_against_limit(50_000.0, &l), AlertSeverity::Green);
        assert_eq!(classify_against_limit(75_000.0, &l), AlertSeverity::Yellow);
        assert_eq!(classify_against_limit(95_000.0, &l), AlertSeverity::Red);
        assert_eq!(classify_against_limit(120_000.0, &l), AlertSeverity::Critical);
    }

    #[test]
    fn test_capital_ratio_floor_independent_of_limits() {
        assert_eq!(classify_capital_ratio_floor(1.125), AlertSeverity::Green);
        assert_eq!(classify_capital_ratio_floor(0.625), AlertSeverity::Critical);
    }

    #[test]
    fn test_lcr_floor_bands() {
        assert_eq!(classify_lcr_floor(1.20), AlertSeverity::Green);
        assert_eq!(classify_lcr_floor(1.08), AlertSeverity::Yellow);
        assert_eq!(classify_lcr_floor(1.02), AlertSeverity::Red);
        assert_eq!(classify_lcr_floor(0.90), AlertSeverity::Critical);
    }

    #[test]
    fn test_evaluate_emits_floor_alert_with_no_configured_limit() {
        let portfolio_id: PortfolioId = "PORT-1".into();
        let alerts = evaluate(&portfolio_id, &[], &[], Some(0.625), None, Utc::now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].metric, METRIC_CAPITAL_RATIO);
    }

    #[test]
    fn test_evaluate_skips_green_metrics() {
        let portfolio_id: PortfolioId = "PORT-1".into();
        let l = limit("var_1d_95", 100_000.0, 0.7, 0.9);
        let alerts = evaluate(
            &portfolio_id,
            &[("var_1d_95".to_string(), 10_000.0)],
            &[l],
            Some(1.2),
            Some(1.5),
            Utc::now(),
        );
        assert!(alerts.is_empty());
    }
}
