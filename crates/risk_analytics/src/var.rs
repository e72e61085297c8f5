//! Historical VaR and stressed VaR (§4.5).

use risk_core::time::Date;

use crate::error::AnalyticsError;

/// Minimum number of P&L observations required to compute VaR. This is a
/// regulatory floor, not an operator-configurable value.
pub const MIN_WINDOW: usize = 60;

/// One day's realized portfolio P&L.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PnlObservation {
    /// The date this P&L was realized.
    pub date: Date,
    /// Realized P&L for the day (positive: gain, negative: loss).
    pub pnl: f64,
}

/// 1-day historical VaR at `confidence`, non-negative, computed on the
/// trailing `min(series.len(), window_days)` most recent observations.
///
/// # Errors
/// `AnalyticsError::InsufficientHistory` if fewer than [`MIN_WINDOW`]
/// observations are supplied.
pub fn historical_var_95(
    series: &[PnlObservation],
    window_days: usize,
    confidence: f64,
) -> Result<f64, AnalyticsError> {
    if series.len() < MIN_WINDOW {
        return Err(AnalyticsError::InsufficientHistory {
            got: series.len(),
            need: MIN_WINDOW,
        });
    }

    let window_start = series.len().saturating_sub(window_days);
    let window = &series[window_start..];

    let mut pnls: Vec<f64> = window.iter().map(|o| o.pnl).collect();
    pnls.sort_by(|a, b| a.partial_cmp(b).expect("P&L values must be finite"));

    let k = ((1.0 - confidence) * pnls.len() as f64).floor() as usize;
    let k = k.min(pnls.len() - 1);

    Ok((-pnls[k]).max(0.0))
}

/// Stressed VaR: historical VaR restricted to a fixed crisis window,
/// `[window_start, window_end]` inclusive.
///
/// Returns `NaN` and logs a `StressWindowTooShort` cause when the window
/// contains fewer than [`MIN_WINDOW`] observations, rather than failing —
/// this metric alone is unavailable, the rest of the market block is not.
pub fn stressed_var(
    series: &[PnlObservation],
    window_start: Date,
    window_end: Date,
    window_days: usize,
    confidence: f64,
) -> f64 {
    let windowed: Vec<PnlObservation> = series
        .iter()
        .copied()
        .filter(|o| o.date >= window_start && o.date <= window_end)
        .collect();

    if windowed.len() < MIN_WINDOW {
        let cause = AnalyticsError::StressWindowTooShort {
            got: windowed.len(),
            need: MIN_WINDOW,
        };
        tracing::warn!(cause = %cause, "stressed_var unavailable, returning NaN");
        return f64::NAN;
    }

    historical_var_95(&windowed, window_days, confidence).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date_plus_days(base: Date, days: i64) -> Date {
        let shifted = base.into_inner() + chrono::Duration::days(days);
        Date::from_ymd(
            chrono::Datelike::year(&shifted),
            chrono::Datelike::month(&shifted),
            chrono::Datelike::day(&shifted),
        )
        .unwrap()
    }

    #[test]
    fn test_insufficient_history_rejected() {
        let base = Date::from_ymd(2024, 1, 1).unwrap();
        let series: Vec<PnlObservation> = (0..10)
            .map(|i| PnlObservation {
                date: date_plus_days(base, i),
                pnl: i as f64,
            })
            .collect();
        assert!(historical_var_95(&series, 250, 0.95).is_err());
    }

    #[test]
    fn test_var_is_non_negative_and_uses_fifth_percentile() {
        let base = Date::from_ymd(2024, 1, 1).unwrap();
        let mut pnls: Vec<f64> = (0..100).map(|i| (i as f64) - 50.0).collect();
        pnls.reverse();
        let series: Vec<PnlObservation> = pnls
            .into_iter()
            .enumerate()
            .map(|(i, pnl)| PnlObservation {
                date: date_plus_days(base, i as i64),
                pnl,
            })
            .collect();
        let var = historical_var_95(&series, 250, 0.95).unwrap();
        // Sorted ascending pnls run -50..49; k = floor(0.05*100) = 5 -> pnl_sorted[5] = -45.
        assert_relative_eq!(var, 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_var_never_negative_when_all_pnls_positive() {
        let base = Date::from_ymd(2024, 1, 1).unwrap();
        let series: Vec<PnlObservation> = (0..100)
            .map(|i| PnlObservation {
                date: date_plus_days(base, i),
                pnl: i as f64 + 1.0,
            })
            .collect();
        let var = historical_var_95(&series, 250, 0.95).unwrap();
        assert!(var >= 0.0);
    }

    #[test]
    fn test_stress_window_too_short() {
        let base = Date::from_ymd(2024, 1, 1).unwrap();
        let series: Vec<PnlObservation> = (0..100)
            .map(|i| PnlObservation {
                date: date_plus_days(base, i),
                pnl: i as f64,
            })
            .collect();
        let result = stressed_var(
            &series,
            Date::from_ymd(2030, 1, 1).unwrap(),
            Date::from_ymd(2030, 12, 31).unwrap(),
            250,
            0.95,
        );
        assert!(result.is_nan());
    }
}
