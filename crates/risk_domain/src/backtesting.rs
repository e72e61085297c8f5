//! Backtesting records: realized P&L paired against prior VaR forecasts.

use risk_core::time::Date;
use serde::{Deserialize, Serialize};

use crate::ids::PortfolioId;

/// Traffic-light classification of a rolling-250 exception count, per
/// §4.12: 0-4 Green, 5-9 Yellow, >=10 Red.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrafficLight {
    /// 0-4 exceptions in the trailing 250 observations.
    Green,
    /// 5-9 exceptions in the trailing 250 observations.
    Yellow,
    /// 10+ exceptions in the trailing 250 observations.
    Red,
}

/// Classify a rolling exception count into a traffic-light zone.
pub fn classify_exceptions(exception_count: usize) -> TrafficLight {
    match exception_count {
        0..=4 => TrafficLight::Green,
        5..=9 => TrafficLight::Yellow,
        _ => TrafficLight::Red,
    }
}

/// One day's backtesting observation: the previous day's VaR forecast
/// compared against the realized P&L. Append-only (§3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BacktestingRecord {
    /// Portfolio the record belongs to.
    pub portfolio_id: PortfolioId,
    /// The date the realized P&L was observed on.
    pub date: Date,
    /// VaR forecast made on the prior day.
    pub var_forecast_prev: f64,
    /// Realized P&L for `date`.
    pub pnl_actual: f64,
    /// Whether the realized loss exceeded the forecast (`-pnl_actual >
    /// var_forecast_prev`).
    pub is_exception: bool,
}

impl BacktestingRecord {
    /// Construct a record, deriving `is_exception` from the forecast and
    /// realized P&L.
    pub fn new(
        portfolio_id: impl Into<PortfolioId>,
        date: Date,
        var_forecast_prev: f64,
        pnl_actual: f64,
    ) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            date,
            var_forecast_prev,
            pnl_actual,
            is_exception: -pnl_actual > var_forecast_prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_exceptions_bands() {
        assert_eq!(classify_exceptions(0), TrafficLight::Green);
        assert_eq!(classify_exceptions(4), TrafficLight::Green);
        assert_eq!(classify_exceptions(5), TrafficLight::Yellow);
        assert_eq!(classify_exceptions(9), TrafficLight::Yellow);
        assert_eq!(classify_exceptions(10), TrafficLight::Red);
        assert_eq!(classify_exceptions(250), TrafficLight::Red);
    }

    #[test]
    fn test_exception_detection() {
        let date = Date::from_ymd(2024, 6, 30).unwrap();
        let record = BacktestingRecord::new("PORT-1", date, 100.0, -150.0);
        assert!(record.is_exception);

        let record_ok = BacktestingRecord::new("PORT-1", date, 100.0, -50.0);
        assert!(!record_ok.is_exception);
    }
}
