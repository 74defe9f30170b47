//! fitting — model library, bounded least squares, and model selection.
//!
//! Purpose
//! -------
//! Determine, per channel, which member of a fixed library of ten physical
//! decay models best explains an aggregated photon histogram, and with what
//! parameters. This subtree owns the model definitions, the
//! Levenberg–Marquardt solver boundary, the sweep/selection engine, and the
//! immutable result type.
//!
//! Key behaviors
//! -------------
//! - [`MODEL_LIBRARY`] fixes both the sweep order and the tie-break
//!   priority; [`engine::fit_decay_curve`] walks it with best-so-far
//!   tracking and a **strict** R² comparison, so selection is deterministic.
//! - [`least_squares`] confines the `nalgebra`-backed solver behind an
//!   adapter; a model that fails to converge within the evaluation budget
//!   is skipped, never retried.
//! - [`engine::fit_curves`] runs the independent channel fits on a rayon
//!   worker pool with per-channel error isolation.
//! - [`FitOutcome`] carries the winner with residuals zero-padded to the
//!   full curve length and, for exponential-family winners, the
//!   serializable percentage [`Decomposition`].
//!
//! Conventions
//! -----------
//! - Failures surface as [`FitError`] via [`FitResult`]; every variant is
//!   per-channel and non-retryable.
//! - Data vectors are `ndarray::Array1<f64>` throughout; `nalgebra` never
//!   leaks out of [`least_squares`].
//!
//! Downstream usage
//! ----------------
//! - Feed [`DecayCurve`](crate::acquisition::DecayCurve) values from the
//!   acquisition layer into [`fit_decay_curve`] or [`fit_curves`] and hand
//!   the outcomes to rendering/export.

pub mod engine;
pub mod errors;
pub mod least_squares;
pub mod models;
pub mod options;
pub mod outcome;
pub mod special;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::engine::{fit_curves, fit_decay_curve};
pub use self::errors::{FitError, FitResult};
pub use self::models::{DecayModel, MODEL_LIBRARY};
pub use self::options::{CancelFlag, FitOptions, DEFAULT_PATIENCE};
pub use self::outcome::{Decomposition, ExpComponent, FitOutcome};
