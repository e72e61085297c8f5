//! FX forward pricer (§4.4): `MtM = N · (F_mkt − K) · DF_settle`.

use risk_domain::Direction;

use crate::error::PricingError;

/// Mark-to-market and delta of an FX forward position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FxForwardResult {
    /// Mark-to-market value, in settlement-currency units of `notional`.
    pub mtm: f64,
    /// `d(mtm)/d(forward)`.
    pub delta: f64,
}

/// Price an FX forward.
///
/// `forward` is the market forward rate for the contract's settlement date
/// (from covered interest-rate parity on the base/quote curves);
/// `discount_factor` discounts the settlement cashflow to `as_of_date`.
///
/// # Errors
/// `PricingError::InvalidPosition` if `notional`, `forward`, `strike`, or
/// `discount_factor` is non-positive.
pub fn price(
    notional: f64,
    direction: Direction,
    strike: f64,
    forward: f64,
    discount_factor: f64,
) -> Result<FxForwardResult, PricingError> {
    if notional <= 0.0 || forward <= 0.0 || strike <= 0.0 || discount_factor <= 0.0 {
        return Err(PricingError::InvalidPosition(format!(
            "fx forward inputs must be positive: N={notional}, F={forward}, K={strike}, DF={discount_factor}"
        )));
    }

    let signed_notional = match direction {
        Direction::Long => notional,
        Direction::Short => -notional,
    };

    Ok(FxForwardResult {
        mtm: signed_notional * (forward - strike) * discount_factor,
        delta: signed_notional * discount_factor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_long_forward_gains_when_market_above_strike() {
        let result = price(1_000_000.0, Direction::Long, 1.10, 1.15, 0.98).unwrap();
        assert_relative_eq!(result.mtm, 1_000_000.0 * 0.05 * 0.98, epsilon = 1e-6);
        assert!(result.delta > 0.0);
    }

    #[test]
    fn test_short_forward_is_sign_reversed() {
        let long = price(1_000_000.0, Direction::Long, 1.10, 1.15, 0.98).unwrap();
        let short = price(1_000_000.0, Direction::Short, 1.10, 1.15, 0.98).unwrap();
        assert_relative_eq!(long.mtm, -short.mtm, epsilon = 1e-9);
        assert_relative_eq!(long.delta, -short.delta, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        assert!(price(0.0, Direction::Long, 1.1, 1.1, 1.0).is_err());
        assert!(price(1.0, Direction::Long, 1.1, 1.1, 0.0).is_err());
    }
}
