//! Fixed-coupon bond pricer (§4.3): clean/dirty price, yield to maturity,
//! Macaulay/modified duration, DV01, convexity.

use risk_core::error::RiskEngineError;
use risk_core::market_data::YieldCurve;
use risk_core::math::solvers::{solve_ytm, SolverConfig};
use risk_core::time::Date;
use risk_domain::{BondTerms, PriceQuote};

use crate::error::PricingError;
use crate::schedule;

/// One scheduled bond cashflow: time in years from the valuation date, and
/// its amount (coupon, or coupon + redemption at maturity).
#[derive(Clone, Copy, Debug, PartialEq)]
struct Cashflow {
    t: f64,
    amount: f64,
}

/// Result of pricing a single bond position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BondPricingResult {
    /// Clean price (dirty price less accrued interest), in notional units.
    pub clean_price: f64,
    /// Dirty (full) price, in notional units. This is the bond's market
    /// value used for duration/DV01.
    pub dirty_price: f64,
    /// Yield to maturity, annual compounding.
    pub ytm: f64,
    /// Macaulay duration, in years.
    pub macaulay_duration: f64,
    /// Modified duration, in years.
    pub modified_duration: f64,
    /// DV01: P&L for a 1bp parallel yield move, in currency units.
    pub dv01: f64,
    /// Convexity.
    pub convexity: f64,
}

/// Build the cashflow schedule and accrual start date as of `as_of_date`.
fn build_cashflows(
    terms: &BondTerms,
    notional: f64,
    trade_date: Date,
    maturity_date: Date,
    as_of_date: Date,
) -> Result<(Vec<Cashflow>, Date), PricingError> {
    if terms.coupon_frequency == 0 {
        return Err(PricingError::InvalidPosition(
            "bond coupon_frequency must be positive".to_string(),
        ));
    }

    let months_per_period = (12 / terms.coupon_frequency).max(1);
    let dates = schedule::periodic_dates(trade_date, maturity_date, months_per_period)
        .map_err(|e| PricingError::InvalidPosition(e.to_string()))?;

    let coupon_amount = notional * terms.coupon_rate / terms.coupon_frequency as f64;
    let (accrual_start, future_dates) = schedule::split_at_valuation_date(&dates, as_of_date, trade_date);

    if future_dates.is_empty() {
        return Err(PricingError::InvalidPosition(
            "bond has no remaining cashflows as of the valuation date".to_string(),
        ));
    }

    let cashflows = future_dates
        .into_iter()
        .map(|date| {
            let amount = if date == maturity_date {
                coupon_amount + notional
            } else {
                coupon_amount
            };
            let t = terms.day_count.year_fraction(as_of_date, date);
            Cashflow { t, amount }
        })
        .collect();

    Ok((cashflows, accrual_start))
}

fn price_at_yield(cashflows: &[Cashflow], y: f64) -> f64 {
    cashflows
        .iter()
        .map(|cf| cf.amount * (1.0 + y).powf(-cf.t))
        .sum()
}

fn price_derivative_at_yield(cashflows: &[Cashflow], y: f64) -> f64 {
    cashflows
        .iter()
        .map(|cf| -cf.t * cf.amount * (1.0 + y).powf(-(cf.t + 1.0)))
        .sum()
}

/// Price a fixed-coupon bond and solve its yield to maturity.
///
/// If `market_quote` carries a clean price, the dirty market price (target
/// for the yield solve) is that quote plus accrued interest. Otherwise the
/// dirty price is the curve-discounted present value of the cashflows, and
/// the solved yield is the flat rate equivalent to that curve valuation.
///
/// `market_quote.clean_price` is expressed as a fraction of notional (e.g.
/// `0.9834` for 98.34% of par), matching `notional`'s own currency units.
///
/// # Errors
/// `PricingError::InvalidPosition` if the bond has no remaining cashflows
/// or a non-positive coupon frequency. Propagates `YtmNotConverged` /
/// `NumericInstability` from the yield solve.
pub fn price_bond(
    terms: &BondTerms,
    notional: f64,
    trade_date: Date,
    maturity_date: Date,
    as_of_date: Date,
    curve: &YieldCurve,
    market_quote: Option<&PriceQuote>,
    solver_config: SolverConfig,
) -> Result<BondPricingResult, PricingError> {
    if notional <= 0.0 {
        return Err(PricingError::InvalidPosition(
            "bond notional must be positive".to_string(),
        ));
    }

    let (cashflows, accrual_start) =
        build_cashflows(terms, notional, trade_date, maturity_date, as_of_date)?;

    let accrued = notional * terms.coupon_rate * terms.day_count.year_fraction(accrual_start, as_of_date);

    let dirty_price = match market_quote {
        Some(quote) => quote.clean_price * notional + accrued,
        None => cashflows
            .iter()
            .map(|cf| cf.amount * curve.discount_factor(cf.t))
            .sum(),
    };

    let f = |y: f64| price_at_yield(&cashflows, y) - dirty_price;
    let f_prime = |y: f64| price_derivative_at_yield(&cashflows, y);
    let ytm = solve_ytm(f, f_prime, solver_config).map_err(|_| PricingError::YtmNotConverged {
        iterations: solver_config.max_iterations,
        residual: f(0.0),
    })?;

    let macaulay_duration = cashflows
        .iter()
        .map(|cf| cf.t * cf.amount * (1.0 + ytm).powf(-cf.t))
        .sum::<f64>()
        / dirty_price;

    let modified_duration = macaulay_duration / (1.0 + ytm);
    let dv01 = modified_duration * dirty_price * 1e-4;

    let convexity = cashflows
        .iter()
        .map(|cf| cf.t * (cf.t + 1.0) * cf.amount * (1.0 + ytm).powf(-(cf.t + 2.0)))
        .sum::<f64>()
        / dirty_price;

    if !dirty_price.is_finite() || !ytm.is_finite() {
        return Err(PricingError::NumericInstability {
            instrument: "bond".to_string(),
            detail: "non-finite price or yield".to_string(),
        });
    }

    Ok(BondPricingResult {
        clean_price: dirty_price - accrued,
        dirty_price,
        ytm,
        macaulay_duration,
        modified_duration,
        dv01,
        convexity,
    })
}

/// Aggregate a portfolio's bond-level results: duration market-value
/// weighted, DV01 summed.
pub fn aggregate_bond_durations(results: &[(f64, BondPricingResult)]) -> Result<(f64, f64), RiskEngineError> {
    let total_mv: f64 = results.iter().map(|(mv, _)| mv).sum();
    if total_mv <= 0.0 {
        return Ok((0.0, 0.0));
    }
    let weighted_duration = results
        .iter()
        .map(|(mv, r)| mv * r.modified_duration)
        .sum::<f64>()
        / total_mv;
    let total_dv01 = results.iter().map(|(_, r)| r.dv01).sum();
    Ok((weighted_duration, total_dv01))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_curve(rate: f64) -> YieldCurve {
        YieldCurve::new(&[0.5, 30.0], &[rate, rate]).unwrap()
    }

    #[test]
    fn test_s1_zero_coupon_bond_matches_seed_scenario() {
        let terms = BondTerms {
            isin: "US0000000001".into(),
            coupon_rate: 0.0,
            coupon_frequency: 1,
            day_count: DayCountConvention::Actual365,
        };
        let as_of = Date::from_ymd(2024, 1, 1).unwrap();
        let trade_date = Date::from_ymd(2019, 1, 1).unwrap();
        let maturity = Date::from_ymd(2029, 1, 1).unwrap();
        let curve = flat_curve(0.05);

        let result = price_bond(
            &terms,
            1_000_000.0,
            trade_date,
            maturity,
            as_of,
            &curve,
            None,
            SolverConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(result.dirty_price, 783_526.17, epsilon = 1.0);
        assert_relative_eq!(result.ytm, 0.05, epsilon = 1e-6);
        assert_relative_eq!(result.macaulay_duration, 5.0, epsilon = 1e-6);
        assert_relative_eq!(result.modified_duration, 5.0 / 1.05, epsilon = 1e-6);
        assert_relative_eq!(result.dv01, 373.11, epsilon = 1.0);
    }

    #[test]
    fn test_dv01_positive_for_long_fixed_rate_bond() {
        let terms = BondTerms {
            isin: "US0000000002".into(),
            coupon_rate: 0.04,
            coupon_frequency: 2,
            day_count: DayCountConvention::Thirty360,
        };
        let as_of = Date::from_ymd(2024, 1, 1).unwrap();
        let trade_date = Date::from_ymd(2020, 1, 1).unwrap();
        let maturity = Date::from_ymd(2034, 1, 1).unwrap();
        let curve = flat_curve(0.04);

        let result = price_bond(
            &terms,
            1_000_000.0,
            trade_date,
            maturity,
            as_of,
            &curve,
            None,
            SolverConfig::default(),
        )
        .unwrap();

        assert!(result.dv01 > 0.0);
        assert!(result.convexity > 0.0);
    }

    #[test]
    fn test_round_trip_ytm_reproduces_dirty_price() {
        let terms = BondTerms {
            isin: "US0000000003".into(),
            coupon_rate: 0.03,
            coupon_frequency: 2,
            day_count: DayCountConvention::Actual365,
        };
        let as_of = Date::from_ymd(2024, 1, 1).unwrap();
        let trade_date = Date::from_ymd(2020, 1, 1).unwrap();
        let maturity = Date::from_ymd(2030, 1, 1).unwrap();
        let curve = flat_curve(0.035);

        let result = price_bond(
            &terms,
            1_000_000.0,
            trade_date,
            maturity,
            as_of,
            &curve,
            None,
            SolverConfig::default(),
        )
        .unwrap();

        let (cashflows, _) = build_cashflows(&terms, 1_000_000.0, trade_date, maturity, as_of).unwrap();
        let repriced = price_at_yield(&cashflows, result.ytm);
        assert_relative_eq!(repriced, result.dirty_price, epsilon = 1e-6 * 1_000_000.0);
    }

    #[test]
    fn test_rejects_zero_coupon_frequency() {
        let terms = BondTerms {
            isin: "US0000000004".into(),
            coupon_rate: 0.03,
            coupon_frequency: 0,
            day_count: DayCountConvention::Actual365,
        };
        let as_of = Date::from_ymd(2024, 1, 1).unwrap();
        let trade_date = Date::from_ymd(2020, 1, 1).unwrap();
        let maturity = Date::from_ymd(2030, 1, 1).unwrap();
        let curve = flat_curve(0.035);

        let result = price_bond(
            &terms,
            1_000_000.0,
            trade_date,
            maturity,
            as_of,
            &curve,
            None,
            SolverConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_aggregate_durations_mv_weighted_dv01_summed() {
        let a = BondPricingResult {
            clean_price: 100.0,
            dirty_price: 100.0,
            ytm: 0.05,
            macaulay_duration: 5.0,
            modified_duration: 4.8,
            dv01: 48.0,
            convexity: 30.0,
        };
        let b = BondPricingResult {
            clean_price: 200.0,
            dirty_price: 200.0,
            ytm: 0.04,
            macaulay_duration: 2.0,
            modified_duration: 1.9,
            dv01: 38.0,
            convexity: 6.0,
        };
        let (duration, dv01) = aggregate_bond_durations(&[(100.0, a), (200.0, b)]).unwrap();
        assert_relative_eq!(duration, (100.0 * 4.8 + 200.0 * 1.9) / 300.0, epsilon = 1e-9);
        assert_relative_eq!(dv01, 86.0, epsilon = 1e-9);
    }
}
