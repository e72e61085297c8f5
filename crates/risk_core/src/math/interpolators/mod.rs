//! 1D and 2D interpolation primitives shared by curves and surfaces.

mod bilinear;
mod linear;

pub use bilinear::BilinearInterpolator;
pub use linear::LinearInterpolator;
