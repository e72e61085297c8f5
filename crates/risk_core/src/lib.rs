//! # Risk Core (L1: Foundation)
//!
//! Foundation types shared by every other crate in the workspace:
//!
//! - the engine-wide [`error::RiskEngineError`] taxonomy
//! - [`time::Date`] and [`time::DayCountConvention`]
//! - [`currency::Currency`]
//! - root-finding solvers ([`math::solvers`]) and 1D/2D interpolators
//!   ([`math::interpolators`])
//! - [`market_data::YieldCurve`] and [`market_data::VolSurface`]

#![warn(missing_docs)]

pub mod currency;
pub mod error;
pub mod market_data;
pub mod math;
pub mod time;
