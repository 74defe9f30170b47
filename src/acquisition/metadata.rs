//! acquisition::metadata — validated SP01 metadata container.
//!
//! Purpose
//! -------
//! Represent the JSON metadata block embedded in an SP01 acquisition stream
//! as a small validated value. Validation happens once, at the decode
//! boundary, so downstream code can assume a positive laser period and a
//! duplicate-free channel list.
//!
//! Key behaviors
//! -------------
//! - [`AcquisitionMeta::from_json`] parses the raw block with a structured
//!   JSON parser (never a code evaluator) and maps the JSON literal `null`
//!   to an explicit absent value for every optional field.
//! - [`AcquisitionMeta::to_json`] emits the on-disk shape used by the
//!   acquisition writer; absent optionals serialize back to `null`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `laser_period_ns` is present and strictly positive.
//! - `channels` holds unique indices; their order is meaningful (it defines
//!   the per-record histogram order) and is preserved as given.
//! - All other fields are optional and default to absent.
//!
//! Conventions
//! -----------
//! - Numeric fields are `f64`-backed: producers emit both JSON integers and
//!   floats, and `f64` accepts either losslessly at realistic magnitudes.
//! - Unknown metadata keys are ignored, so extended producers stay readable.
use crate::acquisition::errors::{AcquisitionError, AcquisitionResult};
use serde::{Deserialize, Serialize};

/// `AcquisitionMeta` — validated acquisition metadata.
///
/// Purpose
/// -------
/// Carry the decoded metadata fields of one acquisition: which channels are
/// enabled, how the time axis is laid out, and the optional acquisition
/// descriptors the instrument records alongside the data.
///
/// Fields
/// ------
/// - `channels`: `Vec<usize>`
///   Enabled channel indices, in on-disk histogram order. Unique; possibly
///   empty (a record stream then carries bare timestamps).
/// - `bin_width_micros`: `Option<f64>`
///   Histogram bin width in µs, when recorded.
/// - `acquisition_time_millis`: `Option<f64>`
///   Total acquisition duration in ms, when recorded.
/// - `laser_period_ns`: `f64`
///   Laser excitation period in ns; strictly positive. Drives the decay
///   time axis as `linspace(0, laser_period_ns, 256)`.
/// - `tau_ns`: `Option<f64>`
///   Reference τ in ns, when recorded.
///
/// Invariants
/// ----------
/// - `laser_period_ns > 0.0`.
/// - `channels` contains no duplicate index.
///
/// Notes
/// -----
/// - Construction goes through [`AcquisitionMeta::from_json`] (decode path)
///   or plain struct literals in producers that already hold validated
///   values (e.g. tests and the acquisition writer).
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionMeta {
    /// Enabled channel indices, in on-disk histogram order.
    pub channels: Vec<usize>,
    /// Histogram bin width (µs), when recorded.
    pub bin_width_micros: Option<f64>,
    /// Acquisition duration (ms), when recorded.
    pub acquisition_time_millis: Option<f64>,
    /// Laser excitation period (ns); strictly positive.
    pub laser_period_ns: f64,
    /// Reference τ (ns), when recorded.
    pub tau_ns: Option<f64>,
}

/// On-disk JSON shape of the metadata block.
///
/// Every field is optional here; requiredness and positivity are enforced in
/// [`AcquisitionMeta::from_json`] so that absence and the `null` literal are
/// reported as domain errors rather than serde errors.
#[derive(Debug, Serialize, Deserialize)]
struct MetaOnDisk {
    #[serde(default)]
    channels: Option<Vec<usize>>,
    #[serde(default)]
    bin_width_micros: Option<f64>,
    #[serde(default)]
    acquisition_time_millis: Option<f64>,
    #[serde(default)]
    laser_period_ns: Option<f64>,
    #[serde(default)]
    tau_ns: Option<f64>,
}

impl AcquisitionMeta {
    /// Parse and validate a raw metadata block.
    ///
    /// Parameters
    /// ----------
    /// - `raw`: `&[u8]`
    ///   The UTF-8 JSON object read from the stream (length-prefixed in the
    ///   container layout).
    ///
    /// Returns
    /// -------
    /// `AcquisitionResult<AcquisitionMeta>`
    ///   - `Ok(meta)` when the block parses and satisfies the invariants.
    ///   - `Err(AcquisitionError)` otherwise.
    ///
    /// Errors
    /// ------
    /// - `AcquisitionError::MetadataParse`
    ///   The block is not a JSON object of the expected shape.
    /// - `AcquisitionError::MissingLaserPeriod`
    ///   `laser_period_ns` is absent or `null`.
    /// - `AcquisitionError::InvalidLaserPeriod`
    ///   `laser_period_ns` is present but not strictly positive.
    /// - `AcquisitionError::DuplicateChannel`
    ///   The channel list names an index twice.
    pub fn from_json(raw: &[u8]) -> AcquisitionResult<Self> {
        let on_disk: MetaOnDisk = serde_json::from_slice(raw)?;

        let laser_period_ns = match on_disk.laser_period_ns {
            Some(value) => value,
            None => return Err(AcquisitionError::MissingLaserPeriod),
        };
        if !(laser_period_ns.is_finite() && laser_period_ns > 0.0) {
            return Err(AcquisitionError::InvalidLaserPeriod { value: laser_period_ns });
        }

        let channels = on_disk.channels.unwrap_or_default();
        for (position, &channel) in channels.iter().enumerate() {
            if channels[..position].contains(&channel) {
                return Err(AcquisitionError::DuplicateChannel { channel });
            }
        }

        Ok(AcquisitionMeta {
            channels,
            bin_width_micros: on_disk.bin_width_micros,
            acquisition_time_millis: on_disk.acquisition_time_millis,
            laser_period_ns,
            tau_ns: on_disk.tau_ns,
        })
    }

    /// Serialize to the on-disk JSON shape (absent optionals become `null`).
    pub fn to_json(&self) -> AcquisitionResult<Vec<u8>> {
        let on_disk = MetaOnDisk {
            channels: Some(self.channels.clone()),
            bin_width_micros: self.bin_width_micros,
            acquisition_time_millis: self.acquisition_time_millis,
            laser_period_ns: Some(self.laser_period_ns),
            tau_ns: self.tau_ns,
        };
        Ok(serde_json::to_vec(&on_disk)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify the happy path: a fully populated block parses into the
    // matching field values.
    //
    // Given
    // -----
    // - A JSON object with channels, bin width, acquisition time, laser
    //   period, and tau, plus an unknown key.
    //
    // Expect
    // ------
    // - All fields round into `AcquisitionMeta`; the unknown key is ignored.
    fn from_json_parses_fully_populated_block() {
        let raw = br#"{
            "channels": [0, 2, 3],
            "bin_width_micros": 1.0,
            "acquisition_time_millis": 4000,
            "laser_period_ns": 25.0,
            "tau_ns": 3.5,
            "firmware": "ignored"
        }"#;

        let meta = AcquisitionMeta::from_json(raw).expect("block should parse");
        assert_eq!(meta.channels, vec![0, 2, 3]);
        assert_eq!(meta.bin_width_micros, Some(1.0));
        assert_eq!(meta.acquisition_time_millis, Some(4000.0));
        assert_eq!(meta.laser_period_ns, 25.0);
        assert_eq!(meta.tau_ns, Some(3.5));
    }

    #[test]
    // Purpose
    // -------
    // Ensure the JSON literal `null` means "absent", not an error, for every
    // optional field.
    //
    // Given
    // -----
    // - A block with `null` for channels, bin width, acquisition time, and
    //   tau, and a valid laser period.
    //
    // Expect
    // ------
    // - Optionals come back `None`, channels come back empty.
    fn from_json_maps_null_to_absent() {
        let raw = br#"{
            "channels": null,
            "bin_width_micros": null,
            "acquisition_time_millis": null,
            "laser_period_ns": 12.5,
            "tau_ns": null
        }"#;

        let meta = AcquisitionMeta::from_json(raw).expect("nulls are valid absences");
        assert!(meta.channels.is_empty());
        assert_eq!(meta.bin_width_micros, None);
        assert_eq!(meta.acquisition_time_millis, None);
        assert_eq!(meta.tau_ns, None);
    }

    #[test]
    // Purpose
    // -------
    // Verify that the laser period is mandatory and strictly positive.
    //
    // Given
    // -----
    // - Blocks with the field missing, `null`, zero, and negative.
    //
    // Expect
    // ------
    // - `MissingLaserPeriod` for missing/`null`, `InvalidLaserPeriod` for
    //   non-positive values.
    fn from_json_rejects_missing_or_non_positive_laser_period() {
        let missing = AcquisitionMeta::from_json(br#"{"channels": [0]}"#);
        assert!(matches!(missing, Err(AcquisitionError::MissingLaserPeriod)));

        let null = AcquisitionMeta::from_json(br#"{"channels": [0], "laser_period_ns": null}"#);
        assert!(matches!(null, Err(AcquisitionError::MissingLaserPeriod)));

        let zero = AcquisitionMeta::from_json(br#"{"laser_period_ns": 0.0}"#);
        assert!(matches!(zero, Err(AcquisitionError::InvalidLaserPeriod { value }) if value == 0.0));

        let negative = AcquisitionMeta::from_json(br#"{"laser_period_ns": -1.0}"#);
        assert!(matches!(negative, Err(AcquisitionError::InvalidLaserPeriod { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Ensure duplicate channel indices are rejected: a duplicate would
    // silently double-count histogram bins downstream.
    //
    // Given
    // -----
    // - A block listing channel 1 twice.
    //
    // Expect
    // ------
    // - `DuplicateChannel { channel: 1 }`.
    fn from_json_rejects_duplicate_channels() {
        let raw = br#"{"channels": [0, 1, 1], "laser_period_ns": 25.0}"#;
        let result = AcquisitionMeta::from_json(raw);
        assert!(matches!(result, Err(AcquisitionError::DuplicateChannel { channel: 1 })));
    }

    #[test]
    // Purpose
    // -------
    // Check that serialization and parsing are inverse operations on the
    // metadata value.
    //
    // Given
    // -----
    // - A metadata value with a mix of present and absent optionals.
    //
    // Expect
    // ------
    // - `from_json(to_json(meta)) == meta`.
    fn to_json_round_trips_through_from_json() {
        let meta = AcquisitionMeta {
            channels: vec![1, 0],
            bin_width_micros: Some(10.0),
            acquisition_time_millis: None,
            laser_period_ns: 25.0,
            tau_ns: None,
        };

        let raw = meta.to_json().expect("serialization should succeed");
        let parsed = AcquisitionMeta::from_json(&raw).expect("round trip should parse");
        assert_eq!(parsed, meta);
    }
}
