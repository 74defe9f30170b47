//! Error types for SP01 container decoding and encoding.

/// Crate-wide result alias for acquisition container operations.
pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Errors raised while decoding or encoding an SP01 acquisition stream.
///
/// Header-level failures abort the whole read and are surfaced once to the
/// caller. Truncated trailing records are *not* represented here: the record
/// stream terminates cleanly instead (see
/// [`Records`](crate::acquisition::reader::Records)).
#[derive(Debug)]
pub enum AcquisitionError {
    // ---- Header validation ----
    /// The first four bytes of the stream were not the ASCII magic `SP01`.
    BadMagic { found: [u8; 4] },

    /// The metadata block was not a valid JSON object of the expected shape.
    MetadataParse { detail: String },

    // ---- Metadata validation ----
    /// `laser_period_ns` was absent or the JSON literal `null`.
    MissingLaserPeriod,

    /// `laser_period_ns` was present but not strictly positive.
    InvalidLaserPeriod { value: f64 },

    /// The enabled-channel list named the same channel index twice.
    DuplicateChannel { channel: usize },

    // ---- Record layout ----
    /// A record carried a different number of histograms than the metadata
    /// declares enabled channels.
    ChannelCountMismatch { expected: usize, actual: usize },

    // ---- I/O ----
    /// An underlying read or write failed for a reason other than a clean
    /// end of stream.
    Io(std::io::Error),
}

impl std::error::Error for AcquisitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AcquisitionError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionError::BadMagic { found } => {
                write!(f, "Invalid SP01 stream: expected magic \"SP01\", found {found:?}")
            }
            AcquisitionError::MetadataParse { detail } => {
                write!(f, "Acquisition metadata is not a valid JSON object: {detail}")
            }
            AcquisitionError::MissingLaserPeriod => {
                write!(f, "Acquisition metadata is missing the required field laser_period_ns.")
            }
            AcquisitionError::InvalidLaserPeriod { value } => {
                write!(f, "laser_period_ns must be strictly positive; got: {value}")
            }
            AcquisitionError::DuplicateChannel { channel } => {
                write!(f, "Enabled-channel list contains channel {channel} more than once.")
            }
            AcquisitionError::ChannelCountMismatch { expected, actual } => {
                write!(
                    f,
                    "Record carries {actual} channel histograms, metadata declares {expected}."
                )
            }
            AcquisitionError::Io(err) => {
                write!(f, "I/O failure while reading acquisition stream: {err}")
            }
        }
    }
}

impl From<std::io::Error> for AcquisitionError {
    fn from(err: std::io::Error) -> AcquisitionError {
        AcquisitionError::Io(err)
    }
}

impl From<serde_json::Error> for AcquisitionError {
    fn from(err: serde_json::Error) -> AcquisitionError {
        AcquisitionError::MetadataParse { detail: err.to_string() }
    }
}
