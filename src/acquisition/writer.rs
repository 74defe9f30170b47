//! acquisition::writer — SP01 container encoder.
//!
//! Produces the byte layout the reader consumes: magic, little-endian `u32`
//! metadata length, JSON metadata block, then timestamped per-channel
//! histogram records. The instrument's export path and the round-trip tests
//! are the consumers; decoding a written stream reproduces the metadata and
//! every record exactly.
use crate::acquisition::{
    errors::{AcquisitionError, AcquisitionResult},
    metadata::AcquisitionMeta,
    HISTOGRAM_BINS, SP01_MAGIC,
};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// `AcquisitionWriter` — streaming encoder for SP01 acquisitions.
///
/// The header is written on construction; records follow via
/// [`AcquisitionWriter::write_record`]. The writer enforces the container
/// invariant that every record carries exactly one histogram per enabled
/// channel, in metadata order.
#[derive(Debug)]
pub struct AcquisitionWriter<W> {
    inner: W,
    channel_count: usize,
}

impl<W: Write> AcquisitionWriter<W> {
    /// Write the SP01 header (magic, metadata length, metadata JSON).
    ///
    /// Errors
    /// ------
    /// - `AcquisitionError::MetadataParse`
    ///   The metadata failed to serialize (not expected for valid values).
    /// - `AcquisitionError::Io`
    ///   The underlying sink rejected a write.
    pub fn new(mut inner: W, meta: &AcquisitionMeta) -> AcquisitionResult<Self> {
        let raw = meta.to_json()?;
        inner.write_all(&SP01_MAGIC)?;
        inner.write_u32::<LittleEndian>(raw.len() as u32)?;
        inner.write_all(&raw)?;
        Ok(AcquisitionWriter { inner, channel_count: meta.channels.len() })
    }

    /// Append one timestamped record.
    ///
    /// Parameters
    /// ----------
    /// - `timestamp_ns`: `f64`
    ///   Record timestamp in nanoseconds since acquisition start.
    /// - `histograms`: `&[[u32; HISTOGRAM_BINS]]`
    ///   One histogram per enabled channel, in metadata order.
    ///
    /// Errors
    /// ------
    /// - `AcquisitionError::ChannelCountMismatch`
    ///   The histogram count differs from the enabled-channel count.
    /// - `AcquisitionError::Io`
    ///   The underlying sink rejected a write.
    pub fn write_record(
        &mut self,
        timestamp_ns: f64,
        histograms: &[[u32; HISTOGRAM_BINS]],
    ) -> AcquisitionResult<()> {
        if histograms.len() != self.channel_count {
            return Err(AcquisitionError::ChannelCountMismatch {
                expected: self.channel_count,
                actual: histograms.len(),
            });
        }

        self.inner.write_f64::<LittleEndian>(timestamp_ns)?;
        for histogram in histograms {
            for &count in histogram.iter() {
                self.inner.write_u32::<LittleEndian>(count)?;
            }
        }
        Ok(())
    }

    /// Flush and hand back the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
