//! Black-76: the forward-measure Black-Scholes formula shared by the FX
//! option, cap/floor, and swaption pricers (§4.4).

use crate::error::PricingError;

/// Abramowitz & Stegun 7.1.26 approximation of the complementary error
/// function, accurate to 1.5e-7.
fn erfc_approx(x: f64) -> f64 {
    let abs_x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * abs_x);
    let poly = 0.254_829_592
        + t * (-0.284_496_736
            + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();
    if x < 0.0 {
        2.0 - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal CDF, `Phi(x) = 0.5 * erfc(-x / sqrt(2))`.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc_approx(-x / std::f64::consts::SQRT_2)
}

/// Standard normal PDF, `phi(x) = (1/sqrt(2*pi)) * exp(-x^2/2)`.
pub fn norm_pdf(x: f64) -> f64 {
    const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Call or put.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallPut {
    /// Call.
    Call,
    /// Put.
    Put,
}

/// Price and first-order Greeks of a European option under Black-76: the
/// underlying is a forward `F`, discounted to present value by `DF`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Black76Result {
    /// Discounted option value.
    pub price: f64,
    /// `d(price)/d(F)`.
    pub delta: f64,
    /// `d(delta)/d(F)`.
    pub gamma: f64,
    /// `d(price)/d(sigma)`.
    pub vega: f64,
    /// `d(price)/d(T)`, per year (negative: time decay).
    pub theta: f64,
}

/// Price a European option on a forward using Black-76.
///
/// `forward` and `strike` must be strictly positive, `vol` and `expiry`
/// strictly positive, `discount_factor` strictly positive.
///
/// # Errors
/// `PricingError::InvalidPosition` if any input is non-positive or
/// non-finite.
pub fn price(
    forward: f64,
    strike: f64,
    vol: f64,
    expiry: f64,
    discount_factor: f64,
    call_put: CallPut,
) -> Result<Black76Result, PricingError> {
    if forward <= 0.0 || strike <= 0.0 || vol <= 0.0 || expiry <= 0.0 || discount_factor <= 0.0 {
        return Err(PricingError::InvalidPosition(format!(
            "black-76 inputs must be positive: F={forward}, K={strike}, vol={vol}, T={expiry}, DF={discount_factor}"
        )));
    }

    let sqrt_t = expiry.sqrt();
    let d1 = ((forward / strike).ln() + 0.5 * vol * vol * expiry) / (vol * sqrt_t);
    let d2 = d1 - vol * sqrt_t;

    if !d1.is_finite() || !d2.is_finite() {
        return Err(PricingError::NumericInstability {
            instrument: "black-76".to_string(),
            detail: "non-finite d1/d2".to_string(),
        });
    }

    let (price, delta) = match call_put {
        CallPut::Call => (
            discount_factor * (forward * norm_cdf(d1) - strike * norm_cdf(d2)),
            discount_factor * norm_cdf(d1),
        ),
        CallPut::Put => (
            discount_factor * (strike * norm_cdf(-d2) - forward * norm_cdf(-d1)),
            -discount_factor * norm_cdf(-d1),
        ),
    };

    let gamma = discount_factor * norm_pdf(d1) / (forward * vol * sqrt_t);
    let vega = discount_factor * forward * norm_pdf(d1) * sqrt_t;
    // Theta w.r.t. calendar time decreasing toward expiry; forward-measure
    // approximation holding F and DF fixed (the curve roll-down is captured
    // separately by revaluing at T-1/365 if a host needs it).
    let theta = -discount_factor * forward * norm_pdf(d1) * vol / (2.0 * sqrt_t);

    Ok(Black76Result {
        price,
        delta,
        gamma,
        vega,
        theta,
    })
}
