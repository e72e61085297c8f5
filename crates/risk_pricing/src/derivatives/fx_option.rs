//! FX vanilla option pricer (§4.4): Black–Scholes on forward, inputs
//! `(F, K, sigma, T, DF)`.

use risk_domain::{Direction, OptionType};

use crate::black76::{self, CallPut};
use crate::error::PricingError;

/// Mark-to-market and Greeks of an FX vanilla option position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FxOptionResult {
    /// Mark-to-market value, signed for the position's direction.
    pub mtm: f64,
    /// `d(mtm)/d(forward)`.
    pub delta: f64,
    /// `d(delta)/d(forward)`.
    pub gamma: f64,
    /// `d(mtm)/d(vol)`.
    pub vega: f64,
    /// `d(mtm)/d(time)`.
    pub theta: f64,
}

/// Price a European FX vanilla option using Black-76 on the forward.
///
/// # Errors
/// Propagates `PricingError` from the underlying Black-76 pricer, plus
/// `PricingError::InvalidPosition` if `notional` is non-positive.
pub fn price(
    notional: f64,
    direction: Direction,
    option_type: OptionType,
    forward: f64,
    strike: f64,
    vol: f64,
    expiry: f64,
    discount_factor: f64,
) -> Result<FxOptionResult, PricingError> {
    if notional <= 0.0 {
        return Err(PricingError::InvalidPosition(
            "fx option notional must be positive".to_string(),
        ));
    }

    let call_put = match option_type {
        OptionType::Call => CallPut::Call,
        OptionType::Put => CallPut::Put,
    };
    let result = black76::price(forward, strike, vol, expiry, discount_factor, call_put)?;

    let signed_notional = match direction {
        Direction::Long => notional,
        Direction::Short => -notional,
    };

    Ok(FxOptionResult {
        mtm: signed_notional * result.price,
        delta: signed_notional * result.delta,
        gamma: signed_notional * result.gamma,
        vega: signed_notional * result.vega,
        theta: signed_notional * result.theta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_long_call_has_positive_delta() {
        let result = price(
            1_000_000.0,
            Direction::Long,
            OptionType::Call,
            1.10,
            1.10,
            0.10,
            0.5,
            0.97,
        )
        .unwrap();
        assert!(result.delta > 0.0);
        assert!(result.mtm > 0.0);
    }

    #[test]
    fn test_short_put_mirrors_long_put() {
        let long = price(
            1_000_000.0,
            Direction::Long,
            OptionType::Put,
            1.10,
            1.10,
            0.10,
            0.5,
            0.97,
        )
        .unwrap();
        let short = price(
            1_000_000.0,
            Direction::Short,
            OptionType::Put,
            1.10,
            1.10,
            0.10,
            0.5,
            0.97,
        )
        .unwrap();
        assert_relative_eq!(long.mtm, -short.mtm, epsilon = 1e-6);
    }
}
