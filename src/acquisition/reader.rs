//! acquisition::reader — streaming decoder for SP01 acquisition containers.
//!
//! Purpose
//! -------
//! Turn a byte stream into validated [`AcquisitionMeta`] plus a lazy,
//! forward-only sequence of timestamped per-channel histogram records. The
//! stream is read exactly once; restarting requires reopening the source.
//!
//! Key behaviors
//! -------------
//! - [`AcquisitionReader::new`] validates the 4-byte ASCII magic `SP01`,
//!   reads the little-endian `u32` metadata length, and parses/validates the
//!   JSON metadata block. All header failures are fatal and abort the read.
//! - [`Records`] reads one 8-byte `f64` timestamp (ns) per record, then one
//!   256 × `u32` histogram block per enabled channel, in metadata order.
//! - Truncation semantics: fewer than 8 bytes at a timestamp boundary, or a
//!   short histogram block, terminate the stream cleanly. The partial record
//!   is discarded and **no error** reaches the caller; decoding up to the
//!   last complete record succeeds.
//!
//! Invariants & assumptions
//! ------------------------
//! - All multi-byte values are little-endian.
//! - Every decoded histogram holds exactly [`HISTOGRAM_BINS`] bins.
//! - The decoder is purely functional over the stream: no side effects
//!   beyond consuming bytes.
//!
//! Testing notes
//! -------------
//! - Unit tests cover magic rejection, header truncation, clean decoding of
//!   writer-produced streams, and the discard-partial-record property for
//!   cuts inside timestamps and histogram blocks.
use crate::acquisition::{
    errors::{AcquisitionError, AcquisitionResult},
    metadata::AcquisitionMeta,
    HISTOGRAM_BINS, SP01_MAGIC,
};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

/// One complete timestamped record: a histogram per enabled channel.
///
/// `histograms` is ordered exactly like `AcquisitionMeta::channels`; each
/// entry holds [`HISTOGRAM_BINS`] unsigned counts.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Record timestamp in nanoseconds since acquisition start.
    pub timestamp_ns: f64,
    /// Per-channel histograms, in metadata channel order.
    pub histograms: Vec<[u32; HISTOGRAM_BINS]>,
}

/// `AcquisitionReader` — validated handle on an SP01 byte stream.
///
/// Purpose
/// -------
/// Own the header-validation step of the decode: after construction the
/// metadata is available and the stream is positioned at the first record.
///
/// Key behaviors
/// -------------
/// - [`AcquisitionReader::new`] wraps any `Read` source (sockets, cursors,
///   buffered files).
/// - [`AcquisitionReader::open`] is the file convenience constructor and
///   buffers the handle.
/// - [`AcquisitionReader::into_records`] consumes the reader, yielding the
///   lazy record iterator; clone the metadata first if it is still needed.
///
/// Invariants
/// ----------
/// - The wrapped stream always sits exactly past the metadata block.
#[derive(Debug)]
pub struct AcquisitionReader<R> {
    inner: R,
    meta: AcquisitionMeta,
}

impl AcquisitionReader<BufReader<File>> {
    /// Open an acquisition file and validate its header.
    ///
    /// Errors
    /// ------
    /// Everything [`AcquisitionReader::new`] raises, plus `Io` for the open
    /// itself.
    pub fn open<P: AsRef<Path>>(path: P) -> AcquisitionResult<Self> {
        let file = File::open(path)?;
        AcquisitionReader::new(BufReader::new(file))
    }
}

impl<R: Read> AcquisitionReader<R> {
    /// Validate the SP01 header and decode the metadata block.
    ///
    /// Parameters
    /// ----------
    /// - `inner`: `R`
    ///   Byte source positioned at the start of the container.
    ///
    /// Returns
    /// -------
    /// `AcquisitionResult<Self>`
    ///   A reader positioned at the first record.
    ///
    /// Errors
    /// ------
    /// - `AcquisitionError::BadMagic`
    ///   The stream does not start with `SP01`.
    /// - `AcquisitionError::Io`
    ///   The header itself is short or unreadable (a truncated *header* is
    ///   an error, unlike truncated trailing records).
    /// - `AcquisitionError::MetadataParse`, `MissingLaserPeriod`,
    ///   `InvalidLaserPeriod`, `DuplicateChannel`
    ///   Propagated from [`AcquisitionMeta::from_json`].
    pub fn new(mut inner: R) -> AcquisitionResult<Self> {
        let mut magic = [0u8; 4];
        inner.read_exact(&mut magic)?;
        if magic != SP01_MAGIC {
            return Err(AcquisitionError::BadMagic { found: magic });
        }

        let metadata_len = inner.read_u32::<LittleEndian>()? as usize;
        let mut raw = vec![0u8; metadata_len];
        inner.read_exact(&mut raw)?;
        let meta = AcquisitionMeta::from_json(&raw)?;
        debug!(
            "decoded SP01 header: {} channel(s), laser period {} ns",
            meta.channels.len(),
            meta.laser_period_ns
        );

        Ok(AcquisitionReader { inner, meta })
    }

    /// The validated acquisition metadata.
    pub fn metadata(&self) -> &AcquisitionMeta {
        &self.meta
    }

    /// Consume the reader and iterate over complete records.
    pub fn into_records(self) -> Records<R> {
        let channel_count = self.meta.channels.len();
        Records { inner: self.inner, channel_count, finished: false }
    }
}

/// Lazy iterator over complete [`FrameRecord`]s.
///
/// Yields `Err` only for genuine I/O failures; truncation at any point
/// inside a record ends the iteration cleanly with the partial record
/// discarded. The iterator is fused: after the first `None` or `Err` it
/// keeps returning `None`.
#[derive(Debug)]
pub struct Records<R> {
    inner: R,
    channel_count: usize,
    finished: bool,
}

impl<R: Read> Iterator for Records<R> {
    type Item = AcquisitionResult<FrameRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let timestamp_ns = match self.inner.read_f64::<LittleEndian>() {
            Ok(value) => value,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                self.finished = true;
                return None;
            }
            Err(err) => {
                self.finished = true;
                return Some(Err(err.into()));
            }
        };

        let mut histograms = Vec::with_capacity(self.channel_count);
        for _ in 0..self.channel_count {
            let mut bins = [0u32; HISTOGRAM_BINS];
            match self.inner.read_u32_into::<LittleEndian>(&mut bins) {
                Ok(()) => histograms.push(bins),
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                    // Partial trailing record: clean end of stream.
                    trace!("discarding partial record at t = {timestamp_ns} ns");
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err.into()));
                }
            }
        }

        Some(Ok(FrameRecord { timestamp_ns, histograms }))
    }
}
