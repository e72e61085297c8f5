//! Analytics errors, converting into [`risk_core::error::RiskEngineError`].

use risk_core::error::RiskEngineError;
use thiserror::Error;

/// Errors raised by the portfolio-level analytics engines (C5-C9, C12).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A P&L series was shorter than the minimum VaR window.
    #[error("insufficient history: got {got} observations, need at least {need}")]
    InsufficientHistory {
        /// Observations actually supplied.
        got: usize,
        /// Minimum observations required.
        need: usize,
    },

    /// The stress window had too few observations to compute stressed VaR.
    #[error("stress window too short: got {got} observations, need at least {need}")]
    StressWindowTooShort {
        /// Observations found in the configured stress window.
        got: usize,
        /// Minimum observations required.
        need: usize,
    },

    /// A rating, currency, or other lookup key had no tabulated value.
    #[error("no tabulated value for {0}")]
    UnmappedKey(String),

    /// A non-finite value appeared in an intermediate computation.
    #[error("numeric instability: {0}")]
    NumericInstability(String),
}

impl From<AnalyticsError> for RiskEngineError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::InsufficientHistory { got, need } => {
                RiskEngineError::InsufficientHistory { got, need }
            }
            AnalyticsError::StressWindowTooShort { got, need } => {
                RiskEngineError::StressWindowTooShort { got, need }
            }
            AnalyticsError::UnmappedKey(key) => {
                RiskEngineError::InputValidation(format!("no tabulated value for {key}"))
            }
            AnalyticsError::NumericInstability(detail) => RiskEngineError::NumericInstability(detail),
        }
    }
}
