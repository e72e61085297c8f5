//! VaR backtesting: rolling exception counts and the Kupiec unconditional
//! coverage test (§4.12).

use risk_domain::backtesting::{classify_exceptions, BacktestingRecord, TrafficLight};

use crate::error::AnalyticsError;

/// Width of the rolling exception-count window.
pub const ROLLING_WINDOW: usize = 250;

/// Expected exception rate for a 95% 1-day VaR forecast.
const EXPECTED_EXCEPTION_RATE: f64 = 0.05;

/// Rolling-250 backtesting summary for a single portfolio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BacktestSummary {
    /// Number of observations considered (`min(records.len(), ROLLING_WINDOW)`).
    pub window_size: usize,
    /// Count of exceptions within the window.
    pub exception_count: usize,
    /// Traffic-light classification of `exception_count`.
    pub traffic_light: TrafficLight,
    /// Kupiec unconditional-coverage test p-value, if the window is large
    /// enough to evaluate (informational only — never gates a snapshot).
    pub kupiec_p_value: Option<f64>,
}

/// Summarize a portfolio's trailing backtesting records: rolling exception
/// count, traffic-light zone, and (when the window is non-empty) the
/// Kupiec p-value.
pub fn summarize(records: &[BacktestingRecord]) -> BacktestSummary {
    let window_start = records.len().saturating_sub(ROLLING_WINDOW);
    let window = &records[window_start..];

    let exception_count = window.iter().filter(|r| r.is_exception).count();
    let traffic_light = classify_exceptions(exception_count);
    let kupiec_p_value = if window.is_empty() {
        None
    } else {
        Some(kupiec_p_value(window.len(), exception_count))
    };

    BacktestSummary {
        window_size: window.len(),
        exception_count,
        traffic_light,
        kupiec_p_value,
    }
}

/// Kupiec (1995) proportion-of-failures likelihood-ratio test, returning
/// the p-value against the null that the true exception rate equals
/// [`EXPECTED_EXCEPTION_RATE`]. The statistic is asymptotically
/// chi-squared with 1 degree of freedom.
fn kupiec_p_value(n: usize, exceptions: usize) -> f64 {
    let n = n as f64;
    let x = exceptions as f64;
    let p = EXPECTED_EXCEPTION_RATE;
    let observed_rate = x / n;

    if observed_rate <= 0.0 || observed_rate >= 1.0 {
        // All-pass or all-fail windows degenerate the likelihood ratio;
        // treat as maximally inconsistent with the null only when the
        // expected rate itself would predict otherwise.
        let lr = -2.0 * (n * (1.0 - p).ln());
        return chi_sq_1_survival(lr.max(0.0));
    }

    let log_likelihood_null = (n - x) * (1.0 - p).ln() + x * p.ln();
    let log_likelihood_alt = (n - x) * (1.0 - observed_rate).ln() + x * observed_rate.ln();
    let lr = -2.0 * (log_likelihood_null - log_likelihood_alt);

    chi_sq_1_survival(lr.max(0.0))
}

/// Survival function of a chi-squared distribution with 1 degree of
/// freedom: `P(X > x) = erfc(sqrt(x/2))`.
fn chi_sq_1_survival(x: f64) -> f64 {
    erfc_approx((x / 2.0).sqrt())
}

/// Abramowitz & Stegun 7.1.26 approximation to the complementary error
/// function, accurate to ~1.5e-7.
fn erfc_approx(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    if sign > 0.0 {
        1.0 - y
    } else {
        1.0 + y
    }
}

/// Validates that a trailing series of backtesting records is strictly
/// date-ordered, a precondition `summarize` assumes but does not itself
/// re-check per call (callers assemble the window once per snapshot).
///
/// # Errors
/// `AnalyticsError::NumericInstability` if the records are not
/// non-decreasing in date.
pub fn validate_chronological(records: &[BacktestingRecord]) -> Result<(), AnalyticsError> {
    for pair in records.windows(2) {
        if pair[1].date < pair[0].date {
            return Err(AnalyticsError::NumericInstability(
                "backtesting records must be in non-decreasing date order".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::time::Date;

    fn record(day: u32, var_forecast: f64, pnl: f64) -> BacktestingRecord {
        BacktestingRecord::new("PORT-1", Date::from_ymd(2024, 1, day).unwrap(), var_forecast, pnl)
    }

    #[test]
    fn test_summarize_empty_window() {
        let summary = summarize(&[]);
        assert_eq!(summary.window_size, 0);
        assert_eq!(summary.exception_count, 0);
        assert_eq!(summary.traffic_light, TrafficLight::Green);
        assert!(summary.kupiec_p_value.is_none());
    }

    #[test]
    fn test_summarize_counts_exceptions() {
        let records: Vec<BacktestingRecord> = (1..=28)
            .map(|d| {
                if d <= 6 {
                    record(d, 100.0, -150.0)
                } else {
                    record(d, 100.0, -10.0)
                }
            })
            .collect();
        let summary = summarize(&records);
        assert_eq!(summary.exception_count, 6);
        assert_eq!(summary.traffic_light, TrafficLight::Yellow);
        assert!(summary.kupiec_p_value.is_some());
    }

    #[test]
    fn test_kupiec_p_value_low_when_exception_rate_far_from_expected() {
        // 50 exceptions out of 250 is far above the 5% expected rate.
        let p = kupiec_p_value(250, 50);
        assert!(p < 0.01);
    }

    #[test]
    fn test_kupiec_p_value_high_when_rate_matches_expected() {
        let p = kupiec_p_value(250, 13);
        assert!(p > 0.5);
    }

    #[test]
    fn test_validate_chronological_rejects_out_of_order() {
        let records = vec![record(10, 100.0, -10.0), record(5, 100.0, -10.0)];
        assert!(validate_chronological(&records).is_err());
    }
}
