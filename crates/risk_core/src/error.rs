//! Engine-wide error taxonomy.
//!
//! Every component-level error type in this workspace (`MarketDataError`,
//! `PricingError`, `VarError`, ...) converts into [`RiskEngineError`] via
//! `#[from]`, so that callers at the orchestration boundary (C13) can match
//! on a single enum regardless of which component failed.

use thiserror::Error;

/// Top-level error taxonomy for the risk engine.
///
/// Maps directly onto the propagation policy: `InputValidation` and
/// `MissingMarketData` downgrade a position to `Unpriced`; `Cancelled` and
/// `DeadlineExceeded` abort the whole computation; `Internal` always fails
/// fast and is surfaced verbatim to the host.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskEngineError {
    /// Malformed position or reference data.
    #[error("input validation failed: {0}")]
    InputValidation(String),

    /// An instrument referenced market data that was not present in the view.
    #[error("missing market data for {0}")]
    MissingMarketData(String),

    /// Yield-to-maturity solver did not converge within the configured budget.
    #[error("YTM did not converge after {iterations} iterations (residual {residual})")]
    YtmNotConverged {
        /// Iterations attempted.
        iterations: usize,
        /// Final residual (price error) at the last iterate.
        residual: f64,
    },

    /// A P&L series was shorter than the minimum window required.
    #[error("insufficient history: got {got} observations, need at least {need}")]
    InsufficientHistory {
        /// Number of observations actually supplied.
        got: usize,
        /// Minimum number of observations required.
        need: usize,
    },

    /// The configured stress window did not contain enough observations.
    #[error("stress window too short: got {got} observations, need at least {need}")]
    StressWindowTooShort {
        /// Number of observations found in the stress window.
        got: usize,
        /// Minimum number of observations required.
        need: usize,
    },

    /// A non-finite value (`NaN`/`Inf`) appeared in an intermediate computation.
    #[error("numeric instability: {0}")]
    NumericInstability(String),

    /// The computation was cancelled via a cancellation token.
    #[error("computation cancelled at {0}")]
    Cancelled(String),

    /// The caller-supplied deadline elapsed before completion.
    #[error("deadline exceeded after {elapsed_ms} ms (budget {budget_ms} ms)")]
    DeadlineExceeded {
        /// Elapsed time in milliseconds.
        elapsed_ms: u64,
        /// Configured deadline in milliseconds.
        budget_ms: u64,
    },

    /// A bug: an invariant the engine itself should guarantee was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RiskEngineError {
    /// Short machine-readable cause code, used in `RiskSnapshot::error_message`
    /// and in `DataQualityIssue`/`Alert` provenance fields.
    pub fn code(&self) -> &'static str {
        match self {
            RiskEngineError::InputValidation(_) => "INPUT_VALIDATION",
            RiskEngineError::MissingMarketData(_) => "MISSING_MARKET_DATA",
            RiskEngineError::YtmNotConverged { .. } => "YTM_NOT_CONVERGED",
            RiskEngineError::InsufficientHistory { .. } => "INSUFFICIENT_HISTORY",
            RiskEngineError::StressWindowTooShort { .. } => "STRESS_WINDOW_TOO_SHORT",
            RiskEngineError::NumericInstability(_) => "NUMERIC_INSTABILITY",
            RiskEngineError::Cancelled(_) => "CANCELLED",
            RiskEngineError::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            RiskEngineError::Internal(_) => "INTERNAL",
        }
    }

    /// Whether this error, surfacing anywhere in the pipeline, must fail the
    /// whole snapshot (`Failed`) rather than merely downgrade a sub-block or
    /// position (`Partial`).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RiskEngineError::Cancelled(_)
                | RiskEngineError::DeadlineExceeded { .. }
                | RiskEngineError::Internal(_)
        )
    }
}
