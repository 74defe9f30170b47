//! acquisition::curve — per-channel decay-curve aggregation.
//!
//! Purpose
//! -------
//! Fold the stream of timestamped histogram records into one decay curve per
//! enabled channel: `y` is the element-wise sum of that channel's counts
//! across all records, `x` spans `linspace(0, laser_period_ns, 256)`.
//!
//! Key behaviors
//! -------------
//! - [`CurveAccumulator`] is the explicit aggregation context: it owns the
//!   running per-channel sums, so no ambient per-channel caches exist
//!   anywhere in the crate.
//! - Sums accumulate in `u64`, which cannot overflow for any realistic
//!   acquisition length, and convert to `f64` once at the end.
//!
//! Invariants & assumptions
//! ------------------------
//! - Curves built here always satisfy `x.len() == y.len() == 256`.
//! - Records offered to [`CurveAccumulator::accumulate`] must match the
//!   metadata's channel count (reader-produced records always do).
use crate::acquisition::{
    errors::{AcquisitionError, AcquisitionResult},
    metadata::AcquisitionMeta,
    reader::FrameRecord,
    HISTOGRAM_BINS,
};
use ndarray::Array1;

/// `DecayCurve` — one channel's aggregated photon histogram.
///
/// Fields
/// ------
/// - `channel`: `usize`
///   The channel index this curve belongs to.
/// - `x`: `Array1<f64>`
///   Time axis in ns: 256 evenly spaced points from 0 to the laser period.
/// - `y`: `Array1<f64>`
///   Per-bin photon counts, summed over every record of the acquisition.
///
/// Notes
/// -----
/// - The fitting engine consumes this type directly; curves built by
///   [`CurveAccumulator`] satisfy its length and finiteness expectations by
///   construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayCurve {
    /// Channel index the curve belongs to.
    pub channel: usize,
    /// Time axis (ns), `linspace(0, laser_period_ns, 256)`.
    pub x: Array1<f64>,
    /// Aggregated per-bin counts.
    pub y: Array1<f64>,
}

/// `CurveAccumulator` — running per-channel histogram sums.
///
/// Purpose
/// -------
/// Aggregate an acquisition's records channel by channel without holding the
/// record stream in memory. All per-channel state lives in this one value —
/// construct one per acquisition, feed it every record, then take the
/// curves.
///
/// Invariants
/// ----------
/// - `sums.len() == channels.len()`; each entry holds exactly
///   [`HISTOGRAM_BINS`] bins.
#[derive(Debug, Clone)]
pub struct CurveAccumulator {
    channels: Vec<usize>,
    laser_period_ns: f64,
    sums: Vec<[u64; HISTOGRAM_BINS]>,
}

impl CurveAccumulator {
    /// Create an empty accumulator for the acquisition described by `meta`.
    pub fn new(meta: &AcquisitionMeta) -> Self {
        CurveAccumulator {
            channels: meta.channels.clone(),
            laser_period_ns: meta.laser_period_ns,
            sums: vec![[0u64; HISTOGRAM_BINS]; meta.channels.len()],
        }
    }

    /// Add one record's counts into the running sums.
    ///
    /// Errors
    /// ------
    /// - `AcquisitionError::ChannelCountMismatch`
    ///   The record's histogram count differs from the enabled-channel
    ///   count. Reader-produced records never trigger this.
    pub fn accumulate(&mut self, record: &FrameRecord) -> AcquisitionResult<()> {
        if record.histograms.len() != self.channels.len() {
            return Err(AcquisitionError::ChannelCountMismatch {
                expected: self.channels.len(),
                actual: record.histograms.len(),
            });
        }

        for (sum, histogram) in self.sums.iter_mut().zip(&record.histograms) {
            for (bin, &count) in sum.iter_mut().zip(histogram.iter()) {
                *bin += u64::from(count);
            }
        }
        Ok(())
    }

    /// Finish aggregation, yielding one curve per enabled channel.
    ///
    /// The shared time axis is `linspace(0, laser_period_ns, 256)`; counts
    /// convert to `f64` here, once.
    pub fn into_curves(self) -> Vec<DecayCurve> {
        let x = Array1::linspace(0.0, self.laser_period_ns, HISTOGRAM_BINS);
        self.channels
            .into_iter()
            .zip(self.sums)
            .map(|(channel, sum)| DecayCurve {
                channel,
                x: x.clone(),
                y: Array1::from_iter(sum.iter().map(|&count| count as f64)),
            })
            .collect()
    }
}
