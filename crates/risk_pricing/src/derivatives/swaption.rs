//! European swaption pricer (§4.4): Black-76 on the forward swap rate with
//! an annuity discount factor.
//!
//! Positions carry only the option's expiry (`maturity_date`); the data
//! model has no field for the underlying swap's own tenor, so the
//! underlying swap is assumed to run for [`UNDERLYING_SWAP_TENOR_YEARS`]
//! from expiry, with a semi-annual fixed leg accrued Actual/365.

use risk_core::market_data::{VolSurface, YieldCurve};
use risk_core::time::{DayCountConvention, Date};
use risk_domain::{Direction, OptionType};

use crate::black76::{self, CallPut};
use crate::error::PricingError;
use crate::schedule;

const UNDERLYING_SWAP_TENOR_YEARS: u32 = 5;
const FIXED_LEG_MONTHS_PER_PERIOD: u32 = 6;
const FIXED_LEG_DAY_COUNT: DayCountConvention = DayCountConvention::Actual365;

/// Mark-to-market and delta of a European swaption position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwaptionResult {
    /// Mark-to-market value, signed for the position's direction.
    pub mtm: f64,
    /// `d(mtm)/d(forward swap rate)`.
    pub delta: f64,
}

/// Price a European swaption. `option_type = Call` is a payer swaption
/// (the right to pay fixed), `Put` a receiver swaption (the right to
/// receive fixed).
///
/// # Errors
/// `PricingError::InvalidPosition` if `notional` is non-positive, the
/// option has already expired, or the underlying swap has no cashflow
/// periods. Propagates errors from the underlying Black-76 valuation.
pub fn price(
    notional: f64,
    direction: Direction,
    option_type: OptionType,
    strike: f64,
    as_of_date: Date,
    expiry_date: Date,
    curve: &YieldCurve,
    vol_surface: &VolSurface,
) -> Result<SwaptionResult, PricingError> {
    if notional <= 0.0 {
        return Err(PricingError::InvalidPosition(
            "swaption notional must be positive".to_string(),
        ));
    }

    let expiry = FIXED_LEG_DAY_COUNT.year_fraction(as_of_date, expiry_date);
    if expiry <= 0.0 {
        return Err(PricingError::InvalidPosition(
            "swaption has already expired as of the valuation date".to_string(),
        ));
    }

    let swap_maturity = schedule::add_years(expiry_date, UNDERLYING_SWAP_TENOR_YEARS)
        .map_err(|e| PricingError::InvalidPosition(e.to_string()))?;
    let fixed_leg_dates = schedule::periodic_dates(expiry_date, swap_maturity, FIXED_LEG_MONTHS_PER_PERIOD)
        .map_err(|e| PricingError::InvalidPosition(e.to_string()))?;
    if fixed_leg_dates.is_empty() {
        return Err(PricingError::InvalidPosition(
            "swaption's underlying swap has no fixed-leg periods".to_string(),
        ));
    }

    let mut annuity = 0.0;
    let mut period_start = expiry_date;
    for period_end in &fixed_leg_dates {
        let accrual = FIXED_LEG_DAY_COUNT.year_fraction(period_start, *period_end);
        let t_end = FIXED_LEG_DAY_COUNT.year_fraction(as_of_date, *period_end);
        annuity += accrual * curve.discount_factor(t_end);
        period_start = *period_end;
    }
    if annuity <= 0.0 {
        return Err(PricingError::NumericInstability {
            instrument: "swaption".to_string(),
            detail: "non-positive annuity".to_string(),
        });
    }

    let t_expiry = FIXED_LEG_DAY_COUNT.year_fraction(as_of_date, expiry_date);
    let t_swap_maturity = FIXED_LEG_DAY_COUNT.year_fraction(as_of_date, swap_maturity);
    let forward_swap_rate =
        (curve.discount_factor(t_expiry) - curve.discount_factor(t_swap_maturity)) / annuity;

    let call_put = match option_type {
        OptionType::Call => CallPut::Call,
        OptionType::Put => CallPut::Put,
    };
    let vol = vol_surface.vol(expiry, strike, forward_swap_rate);
    let result = black76::price(forward_swap_rate, strike, vol, expiry, annuity, call_put)?;

    let signed_notional = match direction {
        Direction::Long => notional,
        Direction::Short => -notional,
    };

    Ok(SwaptionResult {
        mtm: signed_notional * result.price,
        delta: signed_notional * result.delta,
    })
}
