//! Date type and day-count conventions shared across the pricing and
//! analytics layers.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use crate::error::RiskEngineError;

/// Type-safe date wrapper around `chrono::NaiveDate`.
///
/// # Examples
///
/// ```
/// use risk_core::time::Date;
///
/// let start = Date::from_ymd(2024, 1, 1).unwrap();
/// let end = Date::from_ymd(2024, 1, 11).unwrap();
/// assert_eq!(end - start, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Construct a `Date` from year/month/day components.
    ///
    /// # Errors
    /// `RiskEngineError::InputValidation` if the components don't form a
    /// valid calendar date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, RiskEngineError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| {
                RiskEngineError::InputValidation(format!(
                    "invalid date: {year:04}-{month:02}-{day:02}"
                ))
            })
    }

    /// Parse a date from an ISO 8601 (`YYYY-MM-DD`) string.
    ///
    /// # Errors
    /// `RiskEngineError::InputValidation` if the string does not parse.
    pub fn parse(s: &str) -> Result<Self, RiskEngineError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|e| RiskEngineError::InputValidation(format!("invalid date '{s}': {e}")))
    }

    /// The underlying `chrono::NaiveDate`.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// The month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The day-of-month component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl Sub for Date {
    type Output = i64;

    /// Number of days between two dates; positive if `self` is after `other`.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = RiskEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Day-count convention used to turn a date span into a year fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DayCountConvention {
    /// Actual/365 Fixed: `actual_days / 365.0`.
    #[serde(rename = "ACT/365")]
    Actual365,
    /// Actual/360: `actual_days / 360.0`.
    #[serde(rename = "ACT/360")]
    Actual360,
    /// 30/360 US Bond Basis.
    #[serde(rename = "30/360")]
    Thirty360,
}

impl DayCountConvention {
    /// Industry-standard convention name.
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Actual365 => "ACT/365",
            DayCountConvention::Actual360 => "ACT/360",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Year fraction between `start` and `end`, signed (negative if
    /// `start > end`), per the convention's day-count rule.
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        match self {
            DayCountConvention::Actual365 => (end - start) as f64 / 365.0,
            DayCountConvention::Actual360 => (end - start) as f64 / 360.0,
            DayCountConvention::Thirty360 => {
                let (s, e, sign) = if start <= end {
                    (start.into_inner(), end.into_inner(), 1.0)
                } else {
                    (end.into_inner(), start.into_inner(), -1.0)
                };

                let d1_adj = if s.day() == 31 { 30 } else { s.day() };
                let d2_adj = if e.day() == 31 && d1_adj == 30 {
                    30
                } else {
                    e.day()
                };

                let days_30_360 = 360 * (e.year() - s.year())
                    + 30 * (e.month() as i32 - s.month() as i32)
                    + (d2_adj as i32 - d1_adj as i32);
                sign * days_30_360 as f64 / 360.0
            }
        }
    }
}

impl FromStr for DayCountConvention {
    type Err = RiskEngineError;

    /// Parse a convention name, case-insensitively, accepting common aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['/', ' '], "").as_str() {
            "ACT365" | "ACTUAL365" | "A365" => Ok(DayCountConvention::Actual365),
            "ACT360" | "ACTUAL360" | "A360" => Ok(DayCountConvention::Actual360),
            "30360" | "THIRTY360" => Ok(DayCountConvention::Thirty360),
            other => Err(RiskEngineError::InputValidation(format!(
                "unknown day-count convention: {other}"
            ))),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Year fraction between `as_of_date` and `maturity_date` under `convention`,
/// clamped to be non-negative (a matured instrument has zero time to expiry).
pub fn time_to_maturity(as_of_date: Date, maturity_date: Date, convention: DayCountConvention) -> f64 {
    convention.year_fraction(as_of_date, maturity_date).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_act_365_year_fraction() {
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        let end = Date::from_ymd(2024, 7, 1).unwrap();
        let yf = DayCountConvention::Actual365.year_fraction(start, end);
        assert_relative_eq!(yf, 0.4986, epsilon = 1e-3);
    }

    #[test]
    fn test_act_360_year_fraction() {
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        let end = Date::from_ymd(2024, 7, 1).unwrap();
        let yf = DayCountConvention::Actual360.year_fraction(start, end);
        assert_relative_eq!(yf, 0.5056, epsilon = 1e-3);
    }

    #[test]
    fn test_thirty_360_full_year() {
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        let end = Date::from_ymd(2025, 1, 1).unwrap();
        let yf = DayCountConvention::Thirty360.year_fraction(start, end);
        assert_relative_eq!(yf, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_year_fraction_sign_reverses() {
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        let end = Date::from_ymd(2024, 7, 1).unwrap();
        let fwd = DayCountConvention::Actual365.year_fraction(start, end);
        let bwd = DayCountConvention::Actual365.year_fraction(end, start);
        assert_relative_eq!(fwd, -bwd);
    }

    #[test]
    fn test_time_to_maturity_clamps_at_zero() {
        let as_of = Date::from_ymd(2024, 7, 1).unwrap();
        let matured = Date::from_ymd(2024, 1, 1).unwrap();
        assert_relative_eq!(
            time_to_maturity(as_of, matured, DayCountConvention::Actual365),
            0.0
        );
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(Date::from_ymd(2024, 2, 30).is_err());
    }

    #[test]
    fn test_convention_from_str_aliases() {
        assert_eq!(
            "Actual/365".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Actual365
        );
        assert_eq!(
            "30360".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Thirty360
        );
    }

    proptest::proptest! {
        #[test]
        fn prop_year_fraction_additive_act365(days_a in 0i64..3000, days_b in 0i64..3000) {
            let base = Date::from_ymd(2020, 1, 1).unwrap();
            let mid = Date::from_ymd(2020, 1, 1).unwrap().into_inner() + chrono::Duration::days(days_a);
            let end = mid + chrono::Duration::days(days_b);
            let mid = Date(mid);
            let end = Date(end);
            let yf_total = DayCountConvention::Actual365.year_fraction(base, end);
            let yf_a = DayCountConvention::Actual365.year_fraction(base, mid);
            let yf_b = DayCountConvention::Actual365.year_fraction(mid, end);
            approx::assert_relative_eq!(yf_total, yf_a + yf_b, epsilon = 1e-9);
        }
    }
}
