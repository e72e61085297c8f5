//! Periodic payment schedule reconstruction.
//!
//! Nothing in the data model carries an explicit cashflow schedule (§
//! data model positions carry only `trade_date`/`maturity_date` and, for
//! bonds, `coupon_frequency`): every accrual-bearing instrument's schedule
//! is reconstructed here by stepping back from `maturity_date` in fixed
//! month increments until `trade_date` is reached. Stub periods are not
//! modelled.

use chrono::{Datelike, Months};

use risk_core::error::RiskEngineError;
use risk_core::time::Date;

/// Payment/reset dates from `trade_date` to `maturity_date` (inclusive),
/// spaced `months_per_period` months apart, stepping backward from
/// `maturity_date`.
///
/// # Errors
/// `RiskEngineError::InputValidation` if `months_per_period` is zero or
/// `trade_date >= maturity_date`.
pub fn periodic_dates(
    trade_date: Date,
    maturity_date: Date,
    months_per_period: u32,
) -> Result<Vec<Date>, RiskEngineError> {
    if months_per_period == 0 {
        return Err(RiskEngineError::InputValidation(
            "schedule period must be at least one month".to_string(),
        ));
    }
    if trade_date >= maturity_date {
        return Err(RiskEngineError::InputValidation(
            "trade_date must precede maturity_date".to_string(),
        ));
    }

    let trade_raw = trade_date.into_inner();
    let mut raw_dates = vec![maturity_date.into_inner()];
    loop {
        let prev = *raw_dates.last().expect("raw_dates is never empty");
        let Some(stepped) = prev.checked_sub_months(Months::new(months_per_period)) else {
            break;
        };
        if stepped <= trade_raw {
            break;
        }
        raw_dates.push(stepped);
    }
    raw_dates.reverse();

    raw_dates
        .into_iter()
        .map(|d| Date::from_ymd(d.year(), d.month(), d.day()))
        .collect()
}

/// Add `years` years to `date`, calendar-month accurate (used to derive a
/// swaption's underlying swap maturity from its expiry).
///
/// # Errors
/// `RiskEngineError::InputValidation` if the shifted date overflows the
/// representable calendar range.
pub fn add_years(date: Date, years: u32) -> Result<Date, RiskEngineError> {
    let shifted = date
        .into_inner()
        .checked_add_months(Months::new(years * 12))
        .ok_or_else(|| RiskEngineError::InputValidation("date shift overflowed calendar range".to_string()))?;
    Date::from_ymd(shifted.year(), shifted.month(), shifted.day())
}

/// Split `dates` into those at or before `as_of_date` (the last of which is
/// the accrual-period start) and those strictly after (the remaining
/// future cashflow dates).
pub fn split_at_valuation_date(dates: &[Date], as_of_date: Date, fallback_start: Date) -> (Date, Vec<Date>) {
    let mut accrual_start = fallback_start;
    let mut future = Vec::with_capacity(dates.len());
    for date in dates {
        if *date <= as_of_date {
            accrual_start = *date;
        } else {
            future.push(*date);
        }
    }
    (accrual_start, future)
}
