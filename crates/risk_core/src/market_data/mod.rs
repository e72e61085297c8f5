//! Market data primitives: yield curves and volatility surfaces.

mod curve;
mod surface;

pub use curve::YieldCurve;
pub use surface::VolSurface;
