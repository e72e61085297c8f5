//! Interest-rate cap/floor pricer (§4.4): sum of Black-76 caplets/floorlets
//! using forward rates from the curve and volatility from the surface.
//!
//! As with the swap pricer, the data model carries no explicit reset
//! frequency for derivative positions, so caplets are scheduled quarterly
//! and accrued Actual/365.

use risk_core::market_data::{VolSurface, YieldCurve};
use risk_core::time::{DayCountConvention, Date};
use risk_domain::{Direction, OptionType};

use crate::black76::{self, CallPut};
use crate::error::PricingError;
use crate::schedule;

const CAPLET_MONTHS_PER_PERIOD: u32 = 3;
const CAPLET_DAY_COUNT: DayCountConvention = DayCountConvention::Actual365;

/// Mark-to-market and delta of a cap or floor position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapFloorResult {
    /// Mark-to-market value, signed for the position's direction.
    pub mtm: f64,
    /// Aggregate delta with respect to the underlying forward curve.
    pub delta: f64,
}

/// Price an interest-rate cap (`option_type = Call`) or floor (`Put`).
///
/// # Errors
/// `PricingError::InvalidPosition` if there are no remaining caplet periods
/// or `notional` is non-positive. Propagates pricing errors from the
/// underlying Black-76 caplet valuation.
pub fn price(
    notional: f64,
    direction: Direction,
    option_type: OptionType,
    strike: f64,
    trade_date: Date,
    maturity_date: Date,
    as_of_date: Date,
    curve: &YieldCurve,
    vol_surface: &VolSurface,
    underlying: &str,
) -> Result<CapFloorResult, PricingError> {
    if notional <= 0.0 {
        return Err(PricingError::InvalidPosition(
            "cap/floor notional must be positive".to_string(),
        ));
    }

    let dates = schedule::periodic_dates(trade_date, maturity_date, CAPLET_MONTHS_PER_PERIOD)
        .map_err(|e| PricingError::InvalidPosition(e.to_string()))?;
    let (_, future_dates) = schedule::split_at_valuation_date(&dates, as_of_date, trade_date);
    if future_dates.is_empty() {
        return Err(PricingError::InvalidPosition(
            "cap/floor has no remaining caplet periods as of the valuation date".to_string(),
        ));
    }

    let call_put = match option_type {
        OptionType::Call => CallPut::Call,
        OptionType::Put => CallPut::Put,
    };

    let mut total_price = 0.0;
    let mut total_delta = 0.0;
    let mut period_start = as_of_date;
    for period_end in &future_dates {
        let t_start = CAPLET_DAY_COUNT.year_fraction(as_of_date, period_start).max(1e-6);
        let t_end = CAPLET_DAY_COUNT.year_fraction(as_of_date, *period_end);
        let accrual = CAPLET_DAY_COUNT.year_fraction(period_start, *period_end);

        let df_start = curve.discount_factor(t_start);
        let df_end = curve.discount_factor(t_end);
        let forward_rate = (df_start / df_end - 1.0) / accrual;

        if forward_rate > 0.0 {
            let vol = vol_surface.vol(t_start, strike, forward_rate);
            let caplet = black76::price(forward_rate, strike, vol, t_start, df_end, call_put)?;
            total_price += caplet.price * notional * accrual;
            total_delta += caplet.delta * notional * accrual;
        }

        period_start = *period_end;
    }

    let _ = underlying;

    let sign = match direction {
        Direction::Long => 1.0,
        Direction::Short => -1.0,
    };

    Ok(CapFloorResult {
        mtm: sign * total_price,
        delta: sign * total_delta,
    })
}
