//! # Risk Domain (L2: Domain)
//!
//! Value types of the data model: [`Portfolio`], [`Position`],
//! [`Counterparty`], [`Issuer`], [`MarketDataSnapshot`], [`Limit`],
//! [`RiskSnapshot`], [`Alert`], [`DataQualityIssue`], [`BacktestingRecord`],
//! plus [`EngineConfig`], the engine's validated configuration record.
//!
//! This crate holds no behaviour beyond constructors and small derived
//! accessors; the pricing and analytics logic that produces these values
//! lives in `risk_pricing`, `risk_analytics`, and `risk_engine`.

#![warn(missing_docs)]

pub mod alert;
pub mod backtesting;
pub mod config;
pub mod counterparty;
pub mod data_quality;
pub mod ids;
pub mod issuer;
pub mod limit;
pub mod market_data_snapshot;
pub mod portfolio;
pub mod position;
pub mod snapshot;

pub use alert::{Alert, AlertSeverity};
pub use backtesting::{classify_exceptions, BacktestingRecord, TrafficLight};
pub use config::{EngineConfig, VolRegime};
pub use counterparty::{Counterparty, CsaTerms};
pub use data_quality::{DataQualityIssue, DqSeverity, DqSource};
pub use ids::{CounterpartyId, Isin, IssuerId, PortfolioId, PositionId};
pub use issuer::{Issuer, Seniority};
pub use limit::Limit;
pub use market_data_snapshot::{
    CdsSpreadPoint, CurvePoint, FxRatePoint, MarketDataSnapshot, PriceQuote, VolPoint,
};
pub use portfolio::{Portfolio, PortfolioType};
pub use position::{
    BondTerms, DerivativeTerms, Direction, ExerciseStyle, InstrumentKind, InstrumentTerms,
    OptionType, Position,
};
pub use snapshot::{
    AlertsSummary, CapitalBlock, CcrBlock, CreditBlock, LiquidityBlock, MarketBlock, RiskSnapshot,
    SnapshotStatus, StressResult,
};
