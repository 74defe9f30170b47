//! fitting::options — engine configuration.
//!
//! A small validated-by-convention options value, passed explicitly into
//! every fit. Defaults: a function-evaluation budget of 50 000 per model
//! attempt and no cancellation.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default per-model function-evaluation budget.
pub const DEFAULT_PATIENCE: usize = 50_000;

/// Shared cancellation flag; raise it to abort in-flight channel sweeps.
pub type CancelFlag = Arc<AtomicBool>;

/// `FitOptions` — configuration for the per-channel model sweep.
///
/// Fields
/// ------
/// - `patience`: `usize`
///   Approximate cap on solver function evaluations per model attempt.
///   A model that exhausts the budget is skipped, never retried.
/// - `cancel`: `Option<CancelFlag>`
///   Cooperative cancellation flag. The engine checks it between model
///   attempts — around a channel's sweep, never inside a solver call — so a
///   caller can bound total latency without locks.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Function-evaluation budget per model attempt.
    pub patience: usize,
    /// Optional cooperative cancellation flag.
    pub cancel: Option<CancelFlag>,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions { patience: DEFAULT_PATIENCE, cancel: None }
    }
}

impl FitOptions {
    /// Options with the default evaluation budget and no cancellation.
    pub fn new() -> Self {
        FitOptions::default()
    }

    /// Replace the per-model evaluation budget.
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Attach a cancellation flag shared with the caller.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Whether the caller has requested cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|flag| flag.load(Ordering::Relaxed)).unwrap_or(false)
    }
}
