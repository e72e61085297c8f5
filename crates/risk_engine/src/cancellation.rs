//! Cooperative cancellation and deadline enforcement, checked after each of
//! C3 through C12 within [`crate::snapshot_assembler::compute_snapshot`]
//! (§5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::EngineError;

/// A cooperative cancellation flag shared across a single `compute_snapshot`
/// call. Cloning shares the underlying flag; setting it on any clone is
/// visible to all.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Wall-clock budget for a single `compute_snapshot` call. A `budget_ms` of
/// zero (the `EngineConfig` default) disables deadline enforcement: only
/// cancellation is checked.
#[derive(Clone, Copy, Debug)]
pub struct DeadlineBudget {
    started_at: Instant,
    budget_ms: u64,
}

impl DeadlineBudget {
    /// Start a new budget clock.
    pub fn start(budget_ms: u64) -> Self {
        Self {
            started_at: Instant::now(),
            budget_ms,
        }
    }

    /// Milliseconds elapsed since [`DeadlineBudget::start`].
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    /// Whether the configured budget (if any) has been exceeded.
    pub fn is_exceeded(&self) -> bool {
        self.budget_ms > 0 && self.elapsed_ms() > self.budget_ms
    }
}

impl Default for DeadlineBudget {
    fn default() -> Self {
        Self::start(0)
    }
}

/// Check a cancellation token and deadline budget, to be called after each
/// component stage of a snapshot computation. Returns the first of
/// cancellation or deadline that applies; `stage` names the component just
/// completed, for the error message.
pub fn check(
    token: &CancellationToken,
    budget: &DeadlineBudget,
    stage: &str,
) -> Result<(), EngineError> {
    if token.is_cancelled() {
        return Err(EngineError::Cancelled(format!(
            "cancelled after stage '{stage}'"
        )));
    }
    if budget.is_exceeded() {
        return Err(EngineError::DeadlineExceeded {
            elapsed_ms: budget.elapsed_ms(),
            budget_ms: budget.budget_ms,
        });
    }
    Ok(())
}

/// Convert a budget's elapsed time into a [`Duration`], for logging.
pub fn elapsed(budget: &DeadlineBudget) -> Duration {
    budget.started_at.elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_visible_across_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_zero_budget_never_exceeded() {
        let budget = DeadlineBudget::start(0);
        assert!(!budget.is_exceeded());
    }

    #[test]
    fn test_check_rejects_cancelled_token() {
        let token = CancellationToken::new();
        token.cancel();
        let budget = DeadlineBudget::start(0);
        assert!(check(&token, &budget, "C5").is_err());
    }

    #[test]
    fn test_check_passes_with_fresh_token_and_budget() {
        let token = CancellationToken::new();
        let budget = DeadlineBudget::start(60_000);
        assert!(check(&token, &budget, "C5").is_ok());
    }
}
