//! Interest-rate swap pricer (§4.4): `MtM = floating leg PV − fixed leg PV`
//! on the provided zero curve; DV01 by numeric bump-and-revalue.
//!
//! The data model carries no explicit fixed-leg payment frequency for
//! derivative positions (only bonds carry `coupon_frequency`), so the
//! fixed leg is scheduled semi-annually and accrued Actual/365 — a fixed
//! convention rather than a configurable one.

use risk_core::market_data::YieldCurve;
use risk_core::time::{DayCountConvention, Date};
use risk_domain::Direction;

use crate::error::PricingError;
use crate::schedule;

const FIXED_LEG_MONTHS_PER_PERIOD: u32 = 6;
const FIXED_LEG_DAY_COUNT: DayCountConvention = DayCountConvention::Actual365;
const DV01_BUMP_BPS: f64 = 1.0;

/// Mark-to-market and DV01 of an interest-rate swap position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IrSwapResult {
    /// Mark-to-market value, signed for the position's direction.
    pub mtm: f64,
    /// DV01: P&L for a 1bp parallel curve shift, via central bump-and-revalue.
    pub dv01: f64,
}

fn valuation(
    notional: f64,
    fixed_rate: f64,
    trade_date: Date,
    maturity_date: Date,
    as_of_date: Date,
    curve: &YieldCurve,
) -> Result<f64, PricingError> {
    let dates = schedule::periodic_dates(trade_date, maturity_date, FIXED_LEG_MONTHS_PER_PERIOD)
        .map_err(|e| PricingError::InvalidPosition(e.to_string()))?;
    let (_, future_dates) = schedule::split_at_valuation_date(&dates, as_of_date, trade_date);
    if future_dates.is_empty() {
        return Err(PricingError::InvalidPosition(
            "swap has no remaining fixed-leg cashflows as of the valuation date".to_string(),
        ));
    }

    let mut fixed_leg_pv = 0.0;
    let mut accrual_start = as_of_date;
    for date in &future_dates {
        let accrual = FIXED_LEG_DAY_COUNT.year_fraction(accrual_start, *date);
        let t = FIXED_LEG_DAY_COUNT.year_fraction(as_of_date, *date);
        fixed_leg_pv += notional * fixed_rate * accrual * curve.discount_factor(t);
        accrual_start = *date;
    }

    let t_final = FIXED_LEG_DAY_COUNT.year_fraction(as_of_date, maturity_date);
    let floating_leg_pv = notional * (1.0 - curve.discount_factor(t_final));

    Ok(floating_leg_pv - fixed_leg_pv)
}

/// Price an interest-rate swap and its DV01.
///
/// `direction` is the payer's perspective: `Long` pays fixed and receives
/// floating; `Short` receives fixed and pays floating.
///
/// # Errors
/// `PricingError::InvalidPosition` if the swap has no remaining fixed-leg
/// cashflows as of `as_of_date`, or `notional` is non-positive.
pub fn price(
    notional: f64,
    direction: Direction,
    fixed_rate: f64,
    trade_date: Date,
    maturity_date: Date,
    as_of_date: Date,
    curve: &YieldCurve,
) -> Result<IrSwapResult, PricingError> {
    if notional <= 0.0 {
        return Err(PricingError::InvalidPosition(
            "swap notional must be positive".to_string(),
        ));
    }

    let payer_mtm = valuation(notional, fixed_rate, trade_date, maturity_date, as_of_date, curve)?;
    let mtm = match direction {
        Direction::Long => payer_mtm,
        Direction::Short => -payer_mtm,
    };

    let curve_up = curve.parallel_shift_bps(DV01_BUMP_BPS);
    let curve_down = curve.parallel_shift_bps(-DV01_BUMP_BPS);
    let payer_up = valuation(notional, fixed_rate, trade_date, maturity_date, as_of_date, &curve_up)?;
    let payer_down = valuation(notional, fixed_rate, trade_date, maturity_date, as_of_date, &curve_down)?;
    let sign = match direction {
        Direction::Long => 1.0,
        Direction::Short => -1.0,
    };
    let dv01 = sign * (payer_up - payer_down) / 2.0;

    Ok(IrSwapResult { mtm, dv01 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_curve(rate: f64) -> YieldCurve {
        YieldCurve::new(&[0.5, 30.0], &[rate, rate]).unwrap()
    }

    #[test]
    fn test_payer_swap_at_par_has_near_zero_mtm() {
        let as_of = Date::from_ymd(2024, 1, 1).unwrap();
        let trade_date = Date::from_ymd(2024, 1, 1).unwrap();
        let maturity = Date::from_ymd(2029, 1, 1).unwrap();
        let curve = flat_curve(0.04);

        let result = price(
            1_000_000.0,
            Direction::Long,
            0.04,
            trade_date,
            maturity,
            as_of,
            &curve,
        )
        .unwrap();

        assert!(result.mtm.abs() < 5_000.0);
    }

    #[test]
    fn test_receiver_swap_mirrors_payer_swap() {
        let as_of = Date::from_ymd(2024, 1, 1).unwrap();
        let trade_date = Date::from_ymd(2024, 1, 1).unwrap();
        let maturity = Date::from_ymd(2029, 1, 1).unwrap();
        let curve = flat_curve(0.03);

        let payer = price(
            1_000_000.0,
            Direction::Long,
            0.04,
            trade_date,
            maturity,
            as_of,
            &curve,
        )
        .unwrap();
        let receiver = price(
            1_000_000.0,
            Direction::Short,
            0.04,
            trade_date,
            maturity,
            as_of,
            &curve,
        )
        .unwrap();

        assert!((payer.mtm + receiver.mtm).abs() < 1e-6);
        assert!((payer.dv01 + receiver.dv01).abs() < 1e-6);
    }
}
