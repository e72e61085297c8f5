//! Capital adequacy: K-factors, required capital, own funds, and the
//! capital ratio (§4.9).

use crate::error::AnalyticsError;

/// One interest-rate bucket contributing to K-NPR: a net position and its
/// bucketed weight (0.7% short end to 2.0% long end, §4.9).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IrBucketPosition {
    /// Net position (long minus short) in the bucket.
    pub net_position: f64,
    /// Tenor in years, used to select the bucket weight.
    pub tenor_years: f64,
}

fn ir_bucket_weight(tenor_years: f64) -> f64 {
    if tenor_years <= 0.25 {
        0.007
    } else if tenor_years <= 1.0 {
        0.010
    } else if tenor_years <= 5.0 {
        0.014
    } else if tenor_years <= 10.0 {
        0.017
    } else {
        0.020
    }
}

/// K-IR: net-position-weighted interest-rate risk capital charge.
pub fn k_ir(positions: &[IrBucketPosition]) -> f64 {
    positions
        .iter()
        .map(|p| p.net_position.abs() * ir_bucket_weight(p.tenor_years))
        .sum()
}

/// An issuer-rating bucket contributing to K-CREDNR.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreditNonTradingPosition {
    /// Net credit-risky position for this rating bucket.
    pub net_position: f64,
    /// Issuer rating grade (AAA/AA, A/BBB, BB/B, below B).
    pub rating_weight: CreditRatingWeight,
}

/// Rating-bucket weight for K-CREDNR (§4.9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreditRatingWeight {
    /// AAA/AA: 0.5%.
    HighGrade,
    /// A/BBB: 1.0%.
    InvestmentGrade,
    /// BB/B: 2.0%.
    SubInvestmentGrade,
    /// Below B: 4.0%.
    HighYield,
    /// Unrated or defaulted: 8.0%.
    Unrated,
}

impl CreditRatingWeight {
    fn weight(self) -> f64 {
        match self {
            CreditRatingWeight::HighGrade => 0.005,
            CreditRatingWeight::InvestmentGrade => 0.010,
            CreditRatingWeight::SubInvestmentGrade => 0.020,
            CreditRatingWeight::HighYield => 0.040,
            CreditRatingWeight::Unrated => 0.080,
        }
    }
}

/// K-CREDNR: rating-weighted non-trading-book credit risk capital charge.
pub fn k_crednr(positions: &[CreditNonTradingPosition]) -> f64 {
    positions
        .iter()
        .map(|p| p.net_position.abs() * p.rating_weight.weight())
        .sum()
}

/// K-FX: `0.08 * max(sum of net long positions, |sum of net short
/// positions|)` across non-base currencies.
pub fn k_fx(net_positions_by_currency: &[f64]) -> f64 {
    let net_long: f64 = net_positions_by_currency.iter().filter(|v| **v > 0.0).sum();
    let net_short: f64 = net_positions_by_currency.iter().filter(|v| **v < 0.0).sum();
    0.08 * net_long.max(net_short.abs())
}

/// K-AUM: `0.0002 * trailing_quarterly_aum`.
pub fn k_aum(trailing_quarterly_aum: f64) -> f64 {
    0.0002 * trailing_quarterly_aum
}

/// K-CMH: `(0.004, or 0.003 if client funds are guaranteed by a third
/// party) * average segregated client money held`.
pub fn k_cmh(avg_segregated_client_funds: f64, guaranteed: bool) -> f64 {
    let rate = if guaranteed { 0.003 } else { 0.004 };
    rate * avg_segregated_client_funds
}

/// K-COH: `coh_percentage * annualized client order handling volume`. The
/// percentage is configured per the firm's IFR/IFD permission (no single
/// regulatory constant applies across order types).
///
/// # Errors
/// `AnalyticsError::NumericInstability` if `coh_percentage` is outside
/// `[0, 1]`.
pub fn k_coh(annualized_order_volume: f64, coh_percentage: f64) -> Result<f64, AnalyticsError> {
    if !(0.0..=1.0).contains(&coh_percentage) {
        return Err(AnalyticsError::NumericInstability(format!(
            "K-COH percentage {coh_percentage} outside [0, 1]"
        )));
    }
    Ok(coh_percentage * annualized_order_volume)
}

/// All K-factor components feeding into the firm's required capital.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct KFactors {
    /// Interest-rate net position risk.
    pub k_ir: f64,
    /// Non-trading-book credit risk.
    pub k_crednr: f64,
    /// FX net open position risk.
    pub k_fx: f64,
    /// Assets under management.
    pub k_aum: f64,
    /// Client money held.
    pub k_cmh: f64,
    /// Client order handling.
    pub k_coh: f64,
}

impl KFactors {
    /// Sum of all K-factor components.
    pub fn sum(&self) -> f64 {
        self.k_ir + self.k_crednr + self.k_fx + self.k_aum + self.k_cmh + self.k_coh
    }
}

/// Required own-funds: the greater of the firm's permanent minimum capital
/// floor and the summed K-factors.
pub fn required_capital(k_factors: &KFactors, permanent_min_capital_eur: f64) -> f64 {
    k_factors.sum().max(permanent_min_capital_eur)
}

/// Eligible own funds: `Tier1 + min(Tier2, 0.25 * Tier1)`.
pub fn own_funds(tier1: f64, tier2: f64) -> f64 {
    tier1 + tier2.min(0.25 * tier1)
}

/// `CapitalRatio = OwnFunds / Required`, expressed as a fraction (1.00 ==
/// exactly meeting the requirement), not a percentage.
///
/// # Errors
/// `AnalyticsError::NumericInstability` if `required` is non-positive.
pub fn capital_ratio(own_funds: f64, required: f64) -> Result<f64, AnalyticsError> {
    if required <= 0.0 {
        return Err(AnalyticsError::NumericInstability(
            "required capital must be positive".to_string(),
        ));
    }
    Ok(own_funds / required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_k_ir_weights_by_tenor_bucket() {
        let positions = [
            IrBucketPosition {
                net_position: 1_000_000.0,
                tenor_years: 0.1,
            },
            IrBucketPosition {
                net_position: 1_000_000.0,
                tenor_years: 15.0,
            },
        ];
        let k = k_ir(&positions);
        assert_relative_eq!(k, 1_000_000.0 * 0.007 + 1_000_000.0 * 0.020, epsilon = 1e-6);
    }

    #[test]
    fn test_k_fx_uses_larger_side() {
        let k = k_fx(&[500_000.0, -200_000.0, 100_000.0]);
        // net long = 600_000, net short = -200_000 -> max(600_000, 200_000)
        assert_relative_eq!(k, 0.08 * 600_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_k_cmh_guaranteed_vs_unguaranteed() {
        assert_relative_eq!(k_cmh(1_000_000.0, false), 4_000.0);
        assert_relative_eq!(k_cmh(1_000_000.0, true), 3_000.0);
    }

    #[test]
    fn test_k_coh_rejects_out_of_range_percentage() {
        assert!(k_coh(1_000_000.0, 1.5).is_err());
    }

    #[test]
    fn test_required_capital_floors_at_minimum() {
        let k_factors = KFactors::default();
        assert_relative_eq!(required_capital(&k_factors, 75_000.0), 75_000.0);
    }

    #[test]
    fn test_required_capital_uses_sum_when_above_floor() {
        let k_factors = KFactors {
            k_ir: 50_000.0,
            k_crednr: 40_000.0,
            ..Default::default()
        };
        assert_relative_eq!(required_capital(&k_factors, 75_000.0), 90_000.0);
    }

    #[test]
    fn test_own_funds_caps_tier2_recognition() {
        assert_relative_eq!(own_funds(100_000.0, 50_000.0), 125_000.0);
        assert_relative_eq!(own_funds(100_000.0, 10_000.0), 110_000.0);
    }

    #[test]
    fn test_capital_ratio_above_one_is_adequately_capitalized() {
        let ratio = capital_ratio(150_000.0, 75_000.0).unwrap();
        assert_relative_eq!(ratio, 2.0);
    }

    #[test]
    fn test_capital_ratio_rejects_non_positive_required() {
        assert!(capital_ratio(100_000.0, 0.0).is_err());
    }
}
