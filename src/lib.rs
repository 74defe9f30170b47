//! spectro_decay — SP01 acquisition decoding and decay-curve fitting.
//!
//! Purpose
//! -------
//! Provide the data core of a time-resolved photon-counting spectroscopy
//! instrument: decode the custom `SP01` binary acquisition container into
//! per-channel photon histograms, aggregate them into decay curves, and
//! determine which of a fixed library of physical decay models best explains
//! each channel, with what parameters.
//!
//! Key behaviors
//! -------------
//! - [`acquisition`] validates the `SP01` header, parses the embedded JSON
//!   metadata block, and exposes a lazy, forward-only stream of timestamped
//!   multi-channel histogram records plus the
//!   [`CurveAccumulator`](acquisition::CurveAccumulator) that folds them into
//!   one [`DecayCurve`](acquisition::DecayCurve) per enabled channel.
//! - [`fitting`] sweeps the ten-model library in fixed priority order,
//!   running bounded Levenberg–Marquardt least squares per model, and keeps
//!   the candidate with the strictly highest R². The winner is packaged as
//!   an immutable [`FitOutcome`](fitting::FitOutcome) with residuals,
//!   scale-factor bookkeeping, and the exponential percentage decomposition.
//! - [`report`] renders the per-component summary text (τᵢ percentages,
//!   baseline share, R²) without touching any numeric field.
//!
//! Invariants & assumptions
//! ------------------------
//! - Histograms always hold exactly 256 bins; a shorter on-disk block marks
//!   end of stream, never corruption.
//! - `laser_period_ns` is mandatory and strictly positive; it spans the time
//!   axis as `linspace(0, laser_period_ns, 256)`.
//! - Model-library order is load-bearing: ties in R² resolve to the earlier
//!   model, so selection is deterministic for a given input.
//! - Channel fits are pure functions of their curve; failures are isolated
//!   per channel and never abort sibling channels.
//!
//! Conventions
//! -----------
//! - Curves, truncated data, fitted values, and residuals are
//!   `ndarray::Array1<f64>`; `nalgebra` types appear only inside the
//!   least-squares solver boundary.
//! - Errors are reported through the per-domain enums
//!   [`AcquisitionError`](acquisition::AcquisitionError) and
//!   [`FitError`](fitting::FitError); this crate never panics on malformed
//!   input and uses no `unsafe`.
//! - Logging goes through the `log` facade at `debug`/`trace` level; the
//!   crate never installs a logger.
//!
//! Downstream usage
//! ----------------
//! Rendering, export, and UI layers are external collaborators: they produce
//! the decoder's input byte stream and consume
//! [`FitOutcome`](fitting::FitOutcome) values. A typical pipeline:
//!
//! ```no_run
//! use spectro_decay::acquisition::{AcquisitionReader, CurveAccumulator};
//! use spectro_decay::fitting::{fit_curves, FitOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = AcquisitionReader::open("acquisition.bin")?;
//! let meta = reader.metadata().clone();
//!
//! let mut accumulator = CurveAccumulator::new(&meta);
//! for record in reader.into_records() {
//!     accumulator.accumulate(&record?)?;
//! }
//!
//! for result in fit_curves(&accumulator.into_curves(), &FitOptions::default()) {
//!     match result {
//!         Ok(outcome) => println!("{}", outcome.summary),
//!         Err(err) => eprintln!("channel skipped: {err}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Testing notes
//! -------------
//! - Each module carries unit tests for its constructors, invariants, and
//!   numeric helpers; `tests/integration_pipeline.rs` exercises the full
//!   write → decode → aggregate → fit → report path on synthetic
//!   acquisitions, including truncated files and degenerate channels.

pub mod acquisition;
pub mod fitting;
pub mod report;
