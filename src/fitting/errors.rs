//! Error types for per-channel decay-curve fitting.

/// Crate-wide result alias for fitting operations.
pub type FitResult<T> = Result<T, FitError>;

/// Per-channel fitting failures.
///
/// Every variant names the channel it belongs to: channel fits are
/// independent, and one channel's failure is reported alongside sibling
/// channels' successes without aborting them. None of these are retryable;
/// the only "retry" in the engine is advancing to the next model in library
/// order.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    // ---- Input validation ----
    /// The curve carried no bins at all.
    EmptyCurve { channel: usize },

    /// Time axis and counts disagree in length.
    LengthMismatch { channel: usize, x_len: usize, y_len: usize },

    /// A count was NaN or infinite.
    NonFiniteCounts { channel: usize, index: usize, value: f64 },

    // ---- Degenerate data ----
    /// Every count in the channel was zero; no model attempt is made.
    AllZeroCounts { channel: usize },

    // ---- Model sweep ----
    /// No model in the library converged for this channel.
    NoConvergence { channel: usize },

    /// The caller's cancellation flag was raised between model attempts.
    Cancelled { channel: usize },
}

impl std::error::Error for FitError {}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::EmptyCurve { channel } => {
                write!(f, "Channel {channel}: decay curve is empty.")
            }
            FitError::LengthMismatch { channel, x_len, y_len } => {
                write!(
                    f,
                    "Channel {channel}: time axis has {x_len} points but counts have {y_len}."
                )
            }
            FitError::NonFiniteCounts { channel, index, value } => {
                write!(f, "Channel {channel}: count at bin {index} is non-finite: {value}")
            }
            FitError::AllZeroCounts { channel } => {
                write!(f, "Channel {channel}: all counts are zero.")
            }
            FitError::NoConvergence { channel } => {
                write!(f, "Channel {channel}: optimal parameters not found for any model.")
            }
            FitError::Cancelled { channel } => {
                write!(f, "Channel {channel}: fit cancelled before completing the model sweep.")
            }
        }
    }
}
