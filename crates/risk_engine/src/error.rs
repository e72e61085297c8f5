//! Orchestration errors, converting into [`risk_core::error::RiskEngineError`].

use risk_core::error::RiskEngineError;
use thiserror::Error;

/// Errors raised while assembling a market data view or evaluating data
/// quality (C1/C2), running stress scenarios (C10), or evaluating limits
/// (C11). Per-position and per-sub-block failures inside C13 are not
/// represented here — they are captured in the snapshot itself (§7).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A position, counterparty, or issuer referenced an instrument, FX
    /// pair, or rating that the market view or reference data could not
    /// resolve.
    #[error("missing market data: {0}")]
    MissingMarketData(String),

    /// An input failed basic structural validation (e.g. a curve with
    /// non-increasing tenors, a negative notional).
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// A cooperative cancellation check observed a cancelled token.
    #[error("computation cancelled: {0}")]
    Cancelled(String),

    /// A cooperative deadline check observed the configured budget exceeded.
    #[error("deadline exceeded: {elapsed_ms}ms against a budget of {budget_ms}ms")]
    DeadlineExceeded {
        /// Wall-clock time elapsed so far, in milliseconds.
        elapsed_ms: u64,
        /// Configured deadline, in milliseconds.
        budget_ms: u64,
    },
}

impl From<EngineError> for RiskEngineError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::MissingMarketData(detail) => RiskEngineError::MissingMarketData(detail),
            EngineError::InputValidation(detail) => RiskEngineError::InputValidation(detail),
            EngineError::Cancelled(detail) => RiskEngineError::Cancelled(detail),
            EngineError::DeadlineExceeded {
                elapsed_ms,
                budget_ms,
            } => RiskEngineError::DeadlineExceeded {
                elapsed_ms,
                budget_ms,
            },
        }
    }
}
