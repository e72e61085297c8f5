//! C2: Data Quality Evaluator.
//!
//! Runs independently of, and before, pricing (§4.2: DQ reports on the raw
//! inputs regardless of whether pricing later succeeds). Produces a flat
//! list of rule violations; an `Error`-severity issue on a position's price
//! path downgrades that position to `Unpriced` rather than failing the
//! whole snapshot — only [`crate::error::EngineError`]'s fatal variants do
//! that (§7).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use risk_core::currency::Currency;
use risk_domain::{
    DataQualityIssue, DqSeverity, DqSource, InstrumentKind, Issuer, MarketDataSnapshot, Position,
    PositionId,
};

/// Rule codes this evaluator implements, named after the `DQ-01`..`DQ-41`
/// table (§4.2). Several codes in that table collapse onto one rule here
/// (e.g. every curve-shape check reports as `DQ-20`).
pub mod rule {
    /// Clean price moved more than 50% since the prior snapshot.
    pub const PRICE_JUMP: &str = "DQ-01";
    /// Clean price is zero, negative, or otherwise unusable.
    pub const ZERO_PRICE: &str = "DQ-02";
    /// Bid exceeds ask.
    pub const CROSSED_BOOK: &str = "DQ-03";
    /// Bid/ask spread exceeds 500bps of mid.
    pub const WIDE_SPREAD: &str = "DQ-04";
    /// Quote is more than 5 trading days stale.
    pub const STALE_PRICE: &str = "DQ-05";
    /// An FX-referencing position has no spot rate for its pair.
    pub const MISSING_FX: &str = "DQ-10";
    /// A currency's discount factors are not strictly decreasing in tenor.
    pub const CURVE_INVERSION: &str = "DQ-20";
    /// An issuer has no usable credit rating.
    pub const MISSING_RATING: &str = "DQ-30";
    /// A position's trade date is after the snapshot's as-of date.
    pub const TRADE_DATE_AFTER_AS_OF: &str = "DQ-40";
    /// A position's maturity date is on or before the snapshot's as-of date.
    pub const MATURITY_NOT_AFTER_AS_OF: &str = "DQ-41";
}

const STALE_PRICE_DAYS: i64 = 5;
const WIDE_SPREAD_BPS: f64 = 500.0;
const PRICE_JUMP_THRESHOLD: f64 = 0.5;

/// The result of one C2 pass: every issue found, plus the set of positions
/// an `Error`-severity issue renders unpriceable.
#[derive(Debug, Clone, Default)]
pub struct DqReport {
    /// Every rule violation found, in evaluation order.
    pub issues: Vec<DataQualityIssue>,
    /// Positions with at least one `Error`-severity issue on their price path.
    pub unpriced_positions: HashSet<PositionId>,
}

impl DqReport {
    /// Whether any issue in this report is at `Error` severity.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == DqSeverity::Error)
    }
}

/// Run every data-quality rule over a snapshot, its position book, and
/// issuer reference data.
///
/// `previous_snapshot` is optional: without a prior day's prices, DQ-01
/// (price jump) is skipped rather than reported as a false positive.
pub fn evaluate(
    snapshot: &MarketDataSnapshot,
    positions: &[Position],
    issuers: &[Issuer],
    previous_snapshot: Option<&MarketDataSnapshot>,
    detected_at: DateTime<Utc>,
) -> DqReport {
    let mut report = DqReport::default();

    let mut unpriceable_isins = HashSet::new();
    for (isin, quote) in &snapshot.prices {
        if quote.clean_price <= 0.0 {
            report.issues.push(DataQualityIssue::new(
                rule::ZERO_PRICE,
                DqSeverity::Error,
                DqSource::Market,
                isin.as_str(),
                detected_at,
            ));
            unpriceable_isins.insert(isin.clone());
        }
        if quote.bid > quote.ask {
            report.issues.push(DataQualityIssue::new(
                rule::CROSSED_BOOK,
                DqSeverity::Error,
                DqSource::Market,
                isin.as_str(),
                detected_at,
            ));
            unpriceable_isins.insert(isin.clone());
        }

        let mid = 0.5 * (quote.bid + quote.ask);
        if mid > 0.0 {
            let spread_bps = (quote.ask - quote.bid) / mid * 10_000.0;
            if spread_bps > WIDE_SPREAD_BPS {
                report.issues.push(DataQualityIssue::new(
                    rule::WIDE_SPREAD,
                    DqSeverity::Warning,
                    DqSource::Market,
                    isin.as_str(),
                    detected_at,
                ));
            }
        }

        if quote.days_since_trade > STALE_PRICE_DAYS {
            report.issues.push(DataQualityIssue::new(
                rule::STALE_PRICE,
                DqSeverity::Warning,
                DqSource::Market,
                isin.as_str(),
                detected_at,
            ));
        }

        if let Some(previous) = previous_snapshot {
            if let Some(prev_quote) = previous.prices.get(isin) {
                if prev_quote.clean_price > 0.0 {
                    let jump = (quote.clean_price - prev_quote.clean_price).abs()
                        / prev_quote.clean_price;
                    if jump > PRICE_JUMP_THRESHOLD {
                        report.issues.push(DataQualityIssue::new(
                            rule::PRICE_JUMP,
                            DqSeverity::Warning,
                            DqSource::Market,
                            isin.as_str(),
                            detected_at,
                        ));
                    }
                }
            }
        }
    }

    for (currency, points) in group_curve_points_by_currency(snapshot) {
        if curve_is_inverted(&points) {
            report.issues.push(DataQualityIssue::new(
                rule::CURVE_INVERSION,
                DqSeverity::Warning,
                DqSource::Curve,
                currency.to_string(),
                detected_at,
            ));
        }
    }

    for issuer in issuers {
        if issuer.rating.trim().is_empty() {
            report.issues.push(DataQualityIssue::new(
                rule::MISSING_RATING,
                DqSeverity::Warning,
                DqSource::Position,
                issuer.id.as_str(),
                detected_at,
            ));
        }
    }

    for position in positions {
        if position.trade_date > snapshot.as_of_date {
            report.issues.push(DataQualityIssue::new(
                rule::TRADE_DATE_AFTER_AS_OF,
                DqSeverity::Error,
                DqSource::Position,
                position.id.as_str(),
                detected_at,
            ));
            report.unpriced_positions.insert(position.id.clone());
        }
        if position.maturity_date <= snapshot.as_of_date {
            report.issues.push(DataQualityIssue::new(
                rule::MATURITY_NOT_AFTER_AS_OF,
                DqSeverity::Error,
                DqSource::Position,
                position.id.as_str(),
                detected_at,
            ));
            report.unpriced_positions.insert(position.id.clone());
        }

        if let Some(bond) = position.bond_terms() {
            if unpriceable_isins.contains(&bond.isin) {
                report.unpriced_positions.insert(position.id.clone());
            }
        }

        if let Some(deriv) = position.derivative_terms() {
            let references_fx =
                matches!(position.kind, InstrumentKind::FxForward | InstrumentKind::FxOption);
            if references_fx {
                if let Some((base, quote)) = deriv.underlying.split_once('/') {
                    let has_rate = snapshot.fx_rates.iter().any(|fx| {
                        (fx.pair.base.code() == base && fx.pair.quote.code() == quote)
                            || (fx.pair.base.code() == quote && fx.pair.quote.code() == base)
                    });
                    if !has_rate {
                        report.issues.push(DataQualityIssue::new(
                            rule::MISSING_FX,
                            DqSeverity::Error,
                            DqSource::Market,
                            deriv.underlying.clone(),
                            detected_at,
                        ));
                        report.unpriced_positions.insert(position.id.clone());
                    }
                }
            }
        }
    }

    report
}

/// Group raw curve points by currency, sorted by tenor within each group.
fn group_curve_points_by_currency(
    snapshot: &MarketDataSnapshot,
) -> Vec<(Currency, Vec<(f64, f64)>)> {
    let mut by_currency: Vec<(Currency, Vec<(f64, f64)>)> = Vec::new();
    for p in &snapshot.curve_points {
        match by_currency.iter_mut().find(|(c, _)| *c == p.currency) {
            Some((_, points)) => points.push((p.tenor_years, p.zero_rate)),
            None => by_currency.push((p.currency.clone(), vec![(p.tenor_years, p.zero_rate)])),
        }
    }
    for (_, points) in &mut by_currency {
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("non-finite tenor"));
    }
    by_currency
}

/// Whether discount factors `(1 + z(t))^-t` fail to strictly decrease as
/// tenor increases anywhere along the curve — an arbitrage-implying
/// inversion rather than merely an unusual shape.
fn curve_is_inverted(points: &[(f64, f64)]) -> bool {
    points.windows(2).any(|w| {
        let (t0, z0) = w[0];
        let (t1, z1) = w[1];
        let df0 = (1.0 + z0).powf(-t0);
        let df1 = (1.0 + z1).powf(-t1);
        df1 >= df0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::currency::CurrencyPair;
    use risk_core::time::{DayCountConvention, Date};
    use risk_domain::{
        BondTerms, CurvePoint, FxRatePoint, InstrumentTerms, PriceQuote, Seniority,
    };
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn usd() -> Currency {
        "USD".parse().unwrap()
    }

    fn bond_position(isin: &str, trade: Date, maturity: Date) -> Position {
        Position {
            id: "POS-1".into(),
            portfolio_id: "PORT-1".into(),
            kind: InstrumentKind::Bond,
            notional: 1_000_000.0,
            trade_date: trade,
            maturity_date: maturity,
            terms: InstrumentTerms::Bond(BondTerms {
                isin: isin.into(),
                coupon_rate: 0.05,
                coupon_frequency: 2,
                day_count: DayCountConvention::Actual365,
            }),
        }
    }

    #[test]
    fn test_zero_price_flags_error_and_unprices_position() {
        let mut prices = BTreeMap::new();
        prices.insert(
            "US0000000001".into(),
            PriceQuote {
                clean_price: 0.0,
                quoted_yield: None,
                spread_bps: None,
                bid: 0.0,
                ask: 0.0,
                volume: 0.0,
                days_since_trade: 0,
            },
        );
        let as_of = date(2024, 6, 30);
        let snapshot = MarketDataSnapshot::new(as_of, prices, vec![], vec![], vec![], vec![]);
        let position = bond_position(
            "US0000000001",
            date(2024, 1, 1),
            date(2029, 1, 1),
        );

        let report = evaluate(&snapshot, &[position.clone()], &[], None, Utc::now());
        assert!(report.has_errors());
        assert!(report.unpriced_positions.contains(&position.id));
    }

    #[test]
    fn test_trade_date_after_as_of_is_flagged() {
        let as_of = date(2024, 6, 30);
        let snapshot = MarketDataSnapshot::new(as_of, BTreeMap::new(), vec![], vec![], vec![], vec![]);
        let position = bond_position("US0000000001", date(2025, 1, 1), date(2029, 1, 1));

        let report = evaluate(&snapshot, &[position.clone()], &[], None, Utc::now());
        assert!(report.unpriced_positions.contains(&position.id));
        assert!(report
            .issues
            .iter()
            .any(|i| i.code == rule::TRADE_DATE_AFTER_AS_OF));
    }

    #[test]
    fn test_clean_snapshot_has_no_errors() {
        let as_of = date(2024, 6, 30);
        let mut prices = BTreeMap::new();
        prices.insert(
            "US0000000001".into(),
            PriceQuote {
                clean_price: 1.0,
                quoted_yield: None,
                spread_bps: None,
                bid: 0.995,
                ask: 1.005,
                volume: 1_000.0,
                days_since_trade: 0,
            },
        );
        let snapshot = MarketDataSnapshot::new(
            as_of,
            prices,
            vec![
                CurvePoint { currency: usd(), tenor_years: 1.0, zero_rate: 0.04 },
                CurvePoint { currency: usd(), tenor_years: 5.0, zero_rate: 0.045 },
            ],
            vec![],
            vec![],
            vec![],
        );
        let position = bond_position("US0000000001", date(2024, 1, 1), date(2029, 1, 1));
        let report = evaluate(&snapshot, &[position], &[], None, Utc::now());
        assert!(!report.has_errors());
    }

    #[test]
    fn test_curve_inversion_detected() {
        let as_of = date(2024, 6, 30);
        let snapshot = MarketDataSnapshot::new(
            as_of,
            BTreeMap::new(),
            vec![
                CurvePoint { currency: usd(), tenor_years: 1.0, zero_rate: 0.06 },
                CurvePoint { currency: usd(), tenor_years: 5.0, zero_rate: 0.06 },
            ],
            vec![],
            vec![],
            vec![],
        );
        let report = evaluate(&snapshot, &[], &[], None, Utc::now());
        assert!(report.issues.iter().any(|i| i.code == rule::CURVE_INVERSION));
    }

    #[test]
    fn test_missing_fx_rate_flagged_for_fx_forward() {
        use risk_domain::{Direction, DerivativeTerms};
        let as_of = date(2024, 6, 30);
        let snapshot = MarketDataSnapshot::new(
            as_of,
            BTreeMap::new(),
            vec![],
            vec![],
            vec![FxRatePoint { pair: CurrencyPair::new("GBP".parse().unwrap(), usd()), rate: 1.25 }],
            vec![],
        );
        let position = Position {
            id: "POS-FX".into(),
            portfolio_id: "PORT-1".into(),
            kind: InstrumentKind::FxForward,
            notional: 100_000.0,
            trade_date: date(2024, 1, 1),
            maturity_date: date(2024, 12, 1),
            terms: InstrumentTerms::Derivative(DerivativeTerms {
                underlying: "EUR/USD".to_string(),
                direction: Direction::Long,
                strike: 1.08,
                option_type: None,
                exercise: None,
                counterparty_id: "CP-1".into(),
            }),
        };
        let report = evaluate(&snapshot, &[position.clone()], &[], None, Utc::now());
        assert!(report.unpriced_positions.contains(&position.id));
        assert!(report.issues.iter().any(|i| i.code == rule::MISSING_FX));
    }

    #[test]
    fn test_missing_rating_flagged() {
        use risk_domain::Issuer;
        let as_of = date(2024, 6, 30);
        let snapshot = MarketDataSnapshot::new(as_of, BTreeMap::new(), vec![], vec![], vec![], vec![]);
        let issuer = Issuer {
            id: "ISSUER-1".into(),
            country: "US".to_string(),
            sector: "Financials".to_string(),
            rating: String::new(),
            seniority: Seniority::SeniorUnsecured,
        };
        let report = evaluate(&snapshot, &[], &[issuer], None, Utc::now());
        assert!(report.issues.iter().any(|i| i.code == rule::MISSING_RATING));
    }
}
