//! Pricing errors, converting into [`risk_core::error::RiskEngineError`].

use risk_core::error::RiskEngineError;
use thiserror::Error;

/// Errors raised while pricing a single position.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// A position field was malformed (e.g. non-positive notional).
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// The yield-to-maturity solver for a bond did not converge.
    #[error("YTM did not converge after {iterations} iterations (residual {residual})")]
    YtmNotConverged {
        /// Iterations attempted.
        iterations: usize,
        /// Final residual at the last iterate.
        residual: f64,
    },

    /// A non-finite value appeared in the pricing calculation.
    #[error("numeric instability pricing {instrument}: {detail}")]
    NumericInstability {
        /// Instrument identifier.
        instrument: String,
        /// Description of the instability.
        detail: String,
    },
}

impl From<PricingError> for RiskEngineError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidPosition(msg) => RiskEngineError::InputValidation(msg),
            PricingError::YtmNotConverged { iterations, residual } => {
                RiskEngineError::YtmNotConverged { iterations, residual }
            }
            PricingError::NumericInstability { instrument, detail } => {
                RiskEngineError::NumericInstability(format!("{instrument}: {detail}"))
            }
        }
    }
}
