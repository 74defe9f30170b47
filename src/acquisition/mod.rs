//! acquisition — SP01 binary container decoding, encoding, and aggregation.
//!
//! Purpose
//! -------
//! Own everything between raw acquisition bytes and per-channel decay
//! curves: header and metadata validation, the lazy record stream, the
//! symmetric encoder, and the accumulator that folds records into one
//! [`DecayCurve`] per enabled channel.
//!
//! Key behaviors
//! -------------
//! - [`AcquisitionReader`] validates the `SP01` magic and the embedded JSON
//!   metadata (safe structured parsing; `null` means absent) and exposes
//!   [`Records`](reader::Records), a forward-only iterator of complete
//!   [`FrameRecord`]s with truncation-is-EOF semantics.
//! - [`AcquisitionWriter`] emits the identical layout; reader and writer
//!   round-trip every acquisition bit-exactly.
//! - [`CurveAccumulator`] sums histograms element-wise per channel and
//!   attaches the `linspace(0, laser_period_ns, 256)` time axis.
//!
//! Conventions
//! -----------
//! - All multi-byte on-disk values are little-endian.
//! - Failures surface as [`AcquisitionError`] via [`AcquisitionResult`];
//!   truncated trailing records are clean termination, never errors.
//!
//! Downstream usage
//! ----------------
//! - The fitting engine consumes [`DecayCurve`] values; everything else in
//!   this module exists to produce them faithfully.

pub mod curve;
pub mod errors;
pub mod metadata;
pub mod reader;
pub mod writer;

/// Magic identifier opening every SP01 acquisition stream.
pub const SP01_MAGIC: [u8; 4] = *b"SP01";

/// Number of bins in every per-channel histogram; shorter on-disk blocks
/// signal end-of-stream, not corruption.
pub const HISTOGRAM_BINS: usize = 256;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::curve::{CurveAccumulator, DecayCurve};
pub use self::errors::{AcquisitionError, AcquisitionResult};
pub use self::metadata::AcquisitionMeta;
pub use self::reader::{AcquisitionReader, FrameRecord, Records};
pub use self::writer::AcquisitionWriter;
