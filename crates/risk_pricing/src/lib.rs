//! # Risk Pricing (L3: Pricing)
//!
//! Deterministic position-level pricers: [`bond`] for fixed-coupon bonds
//! (C3), [`derivatives`] for FX forwards/options, interest-rate swaps,
//! cap/floors, and swaptions (C4). [`black76`] is the shared
//! forward-measure option pricing primitive used by the FX option,
//! cap/floor, and swaption pricers; [`schedule`] reconstructs periodic
//! cashflow dates from the data model's `trade_date`/`maturity_date`
//! fields.
//!
//! All pricers are pure functions of their market-data inputs: no pricer
//! in this crate looks anything up itself, so a caller (`risk_engine`)
//! controls exactly which curve, surface, or quote reaches a position.

#![warn(missing_docs)]

pub mod black76;
pub mod bond;
pub mod derivatives;
pub mod error;
pub mod schedule;

pub use black76::{Black76Result, CallPut};
pub use bond::BondPricingResult;
pub use error::PricingError;
