//! Derivative pricers (§4.4): FX forward, FX vanilla option, interest-rate
//! swap, cap/floor, and European swaption.

pub mod cap_floor;
pub mod fx_forward;
pub mod fx_option;
pub mod ir_swap;
pub mod swaption;

pub use cap_floor::CapFloorResult;
pub use fx_forward::FxForwardResult;
pub use fx_option::FxOptionResult;
pub use ir_swap::IrSwapResult;
pub use swaption::SwaptionResult;
