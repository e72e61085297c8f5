#![warn(missing_docs)]
//! # Risk Engine (L5: Orchestration)
//!
//! Wires the lower layers into the pipeline §2 describes: build a market
//! data view and run data quality (C1/C2); price positions and aggregate
//! market risk, credit, CCR/CVA, liquidity, and capital (C3-C9, delegating
//! to [`risk_pricing`] and [`risk_analytics`]); run stress scenarios
//! (C10); evaluate limits and alerts (C11); and assemble the immutable
//! [`risk_domain::RiskSnapshot`] (C13).
//!
//! [`snapshot_assembler::compute_snapshot`] and
//! [`snapshot_assembler::evaluate_dq`] are the two pure entry points other
//! crates (chiefly `service_cli`) call; everything else in this crate is an
//! implementation detail of those two functions.

pub mod cancellation;
pub mod data_quality;
pub mod error;
pub mod limits;
pub mod market_view;
pub mod snapshot_assembler;
pub mod stress;

pub use cancellation::{CancellationToken, DeadlineBudget};
pub use error::EngineError;
pub use market_view::MarketView;
pub use snapshot_assembler::{compute_snapshot, evaluate_dq, ComputeInputs};
