//! Positions: the priceable units held by a portfolio.

use risk_core::time::{DayCountConvention, Date};
use serde::{Deserialize, Serialize};

use crate::ids::{CounterpartyId, Isin, PortfolioId, PositionId};

/// The kind of instrument a position represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// Fixed-coupon bond.
    Bond,
    /// FX forward.
    FxForward,
    /// Vanilla FX option.
    FxOption,
    /// Interest-rate swap.
    IrSwap,
    /// Interest-rate cap or floor.
    CapFloor,
    /// European swaption.
    Swaption,
}

/// Long or short the underlying risk of the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Long the underlying / payer of the option premium.
    Long,
    /// Short the underlying / receiver of the option premium.
    Short,
}

/// Call or put, for option-bearing instruments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy the underlying at the strike.
    Call,
    /// Right to sell the underlying at the strike.
    Put,
}

/// Exercise style. European is the only style this engine prices (§1
/// Non-goals: "no exotic derivatives"), but the field is carried so a
/// position's shape matches the data model exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseStyle {
    /// Exercisable only at expiry.
    European,
}

/// Bond-specific contract terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BondTerms {
    /// ISIN of the issue.
    pub isin: Isin,
    /// Annual coupon rate (e.g. `0.05` for 5%).
    pub coupon_rate: f64,
    /// Coupon payments per year (e.g. `2` for semi-annual).
    pub coupon_frequency: u32,
    /// Day-count convention for accrual and cashflow timing.
    pub day_count: DayCountConvention,
}

/// Derivative-specific contract terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivativeTerms {
    /// Underlying identifier (currency pair, swap curve currency, index).
    pub underlying: String,
    /// Long or short the position's risk.
    pub direction: Direction,
    /// Strike, where applicable (forwards/swaps without an optionality leg
    /// may set this to the contractual forward/fixed rate).
    pub strike: f64,
    /// Call/put, for option-bearing instruments. `None` for forwards and
    /// swaps.
    pub option_type: Option<OptionType>,
    /// Exercise style, for option-bearing instruments.
    pub exercise: Option<ExerciseStyle>,
    /// Counterparty the trade is booked against.
    pub counterparty_id: CounterpartyId,
}

/// Instrument-kind-specific contract terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InstrumentTerms {
    /// Fixed-coupon bond terms.
    Bond(BondTerms),
    /// Derivative terms (FX forward/option, IR swap, cap/floor, swaption).
    Derivative(DerivativeTerms),
}

/// A single priceable position within a portfolio.
///
/// Invariant (checked by the data-quality evaluator, not the constructor,
/// since DQ issues are reported rather than raised — §4.2): `trade_date <=
/// as_of_date < maturity_date`, `notional > 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Stable identifier for this position.
    pub id: PositionId,
    /// Owning portfolio.
    pub portfolio_id: PortfolioId,
    /// Instrument kind; determines which pricer handles the position and
    /// which variant of `terms` is populated.
    pub kind: InstrumentKind,
    /// Position size; always positive per the data-model invariant.
    pub notional: f64,
    /// Date the trade was booked.
    pub trade_date: Date,
    /// Date the instrument matures or expires.
    pub maturity_date: Date,
    /// Instrument-kind-specific terms.
    pub terms: InstrumentTerms,
}

impl Position {
    /// The bond terms, if this is a `Bond` position.
    pub fn bond_terms(&self) -> Option<&BondTerms> {
        match &self.terms {
            InstrumentTerms::Bond(b) => Some(b),
            InstrumentTerms::Derivative(_) => None,
        }
    }

    /// The derivative terms, if this is not a `Bond` position.
    pub fn derivative_terms(&self) -> Option<&DerivativeTerms> {
        match &self.terms {
            InstrumentTerms::Derivative(d) => Some(d),
            InstrumentTerms::Bond(_) => None,
        }
    }

    /// Counterparty id, for derivative positions (bonds have none).
    pub fn counterparty_id(&self) -> Option<&CounterpartyId> {
        self.derivative_terms().map(|d| &d.counterparty_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bond() -> Position {
        Position {
            id: "POS-1".into(),
            portfolio_id: "PORT-1".into(),
            kind: InstrumentKind::Bond,
            notional: 1_000_000.0,
            trade_date: Date::from_ymd(2024, 1, 1).unwrap(),
            maturity_date: Date::from_ymd(2029, 1, 1).unwrap(),
            terms: InstrumentTerms::Bond(BondTerms {
                isin: "US0000000001".into(),
                coupon_rate: 0.0,
                coupon_frequency: 1,
                day_count: DayCountConvention::Actual365,
            }),
        }
    }

    #[test]
    fn test_bond_terms_accessor() {
        let pos = sample_bond();
        assert!(pos.bond_terms().is_some());
        assert!(pos.derivative_terms().is_none());
        assert!(pos.counterparty_id().is_none());
    }

    #[test]
    fn test_derivative_terms_accessor() {
        let pos = Position {
            id: "POS-2".into(),
            portfolio_id: "PORT-1".into(),
            kind: InstrumentKind::FxForward,
            notional: 500_000.0,
            trade_date: Date::from_ymd(2024, 1, 1).unwrap(),
            maturity_date: Date::from_ymd(2024, 7, 1).unwrap(),
            terms: InstrumentTerms::Derivative(DerivativeTerms {
                underlying: "EUR/USD".to_string(),
                direction: Direction::Long,
                strike: 1.08,
                option_type: None,
                exercise: None,
                counterparty_id: "CP-1".into(),
            }),
        };
        assert!(pos.derivative_terms().is_some());
        assert_eq!(pos.counterparty_id().unwrap().as_str(), "CP-1");
    }
}
