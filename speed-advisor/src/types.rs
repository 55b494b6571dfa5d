//! Core types for the speed advisor library
//!
//! This module defines the records that flow down the decision pipeline:
//! typed telemetry decoded from sentences, the per-signal record held by the
//! catalog, and the discrete values a control iteration produces.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock timestamp type used in advisory reports
pub type Timestamp = DateTime<Utc>;

/// Result type for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Errors that can occur while decoding telemetry or deciding
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("Sentence tag not found in buffer: {tag}")]
    NotFound { tag: String },

    #[error("Malformed field '{field}': {value:?}")]
    MalformedField { field: &'static str, value: String },

    #[error("Truncated broadcast: {fields} fields is not a multiple of 7")]
    TruncatedRecord { fields: usize },

    #[error("No signal available in catalog")]
    NoSignalAvailable,

    #[error("Checksum mismatch: sentence says {expected:02X}, computed {computed:02X}")]
    ChecksumMismatch { expected: u8, computed: u8 },

    #[error("Signal cycle length must be positive, got {0}")]
    DegenerateCycle(f64),

    #[error("Telemetry stream closed")]
    StreamClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdvisorError {
    /// True when the error only abandons the current iteration
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AdvisorError::StreamClosed | AdvisorError::Io(_))
    }

    /// Short stable name of the error kind, used for run statistics
    pub fn kind(&self) -> &'static str {
        match self {
            AdvisorError::NotFound { .. } => "not_found",
            AdvisorError::MalformedField { .. } => "malformed_field",
            AdvisorError::TruncatedRecord { .. } => "truncated_record",
            AdvisorError::NoSignalAvailable => "no_signal_available",
            AdvisorError::ChecksumMismatch { .. } => "checksum_mismatch",
            AdvisorError::DegenerateCycle(_) => "degenerate_cycle",
            AdvisorError::StreamClosed => "stream_closed",
            AdvisorError::Io(_) => "io",
        }
    }

    pub(crate) fn malformed(field: &'static str, value: &str) -> Self {
        AdvisorError::MalformedField {
            field,
            value: value.to_string(),
        }
    }
}

/// A geographic point in signed decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl GeoPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }
}

/// A single resolved position fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees (positive = North, negative = South)
    pub latitude_deg: f64,
    /// Longitude in degrees (positive = East, negative = West)
    pub longitude_deg: f64,
    /// Altitude as broadcast by the receiver
    pub altitude: f64,
    /// UTC time of fix, verbatim from the sentence (hhmmss[.sss])
    pub timestamp: String,
}

impl Position {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude_deg, self.longitude_deg)
    }

    /// Seconds since UTC midnight encoded by the fix timestamp
    ///
    /// Fails with `MalformedField` unless the timestamp is a valid
    /// `hhmmss` time with an optional fractional second.
    pub fn seconds_of_day(&self) -> Result<f64> {
        let raw = self.timestamp.trim();
        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (raw, None),
        };

        if whole.len() != 6 || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AdvisorError::malformed("timestamp", raw));
        }

        let field = |range: std::ops::Range<usize>| -> Result<u32> {
            whole[range]
                .parse::<u32>()
                .map_err(|_| AdvisorError::malformed("timestamp", raw))
        };
        let nanos = match fraction {
            Some(digits) => {
                let fractional: f64 = format!("0.{}", digits)
                    .parse()
                    .map_err(|_| AdvisorError::malformed("timestamp", raw))?;
                (fractional * 1e9).trunc().min(999_999_999.0) as u32
            }
            None => 0,
        };

        let time = NaiveTime::from_hms_nano_opt(field(0..2)?, field(2..4)?, field(4..6)?, nanos)
            .ok_or_else(|| AdvisorError::malformed("timestamp", raw))?;

        Ok(time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9)
    }
}

/// Course over ground and ground speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityVector {
    /// True heading in degrees (0-360)
    pub heading_deg: f64,
    /// Ground speed in m/s
    pub speed_meters_per_sec: f64,
}

/// Timing fields of one signal as carried by a broadcast row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalBroadcastRow {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// Green duration for north-south traffic (seconds)
    pub north_south_green: f64,
    /// Green duration for east-west traffic (seconds)
    pub east_west_green: f64,
    /// Cycle shift relative to the global time reference (seconds)
    pub phase_offset: f64,
}

/// A known nearby signal with geometry derived against the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub north_south_green: f64,
    pub east_west_green: f64,
    pub phase_offset: f64,
    /// Initial bearing from the vehicle, degrees in [0, 360)
    pub bearing_from_vehicle: f64,
    /// Great-circle distance from the vehicle, meters
    pub distance_from_vehicle: f64,
}

impl SignalRecord {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude_deg, self.longitude_deg)
    }

    /// Full cycle length (both green phases), seconds
    pub fn cycle_length(&self) -> f64 {
        self.north_south_green + self.east_west_green
    }
}

impl From<SignalBroadcastRow> for SignalRecord {
    fn from(row: SignalBroadcastRow) -> Self {
        Self {
            latitude_deg: row.latitude_deg,
            longitude_deg: row.longitude_deg,
            north_south_green: row.north_south_green,
            east_west_green: row.east_west_green,
            phase_offset: row.phase_offset,
            bearing_from_vehicle: 0.0,
            distance_from_vehicle: 0.0,
        }
    }
}

/// Direction of travel through a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApproachDirection {
    NorthSouth,
    EastWest,
}

impl fmt::Display for ApproachDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApproachDirection::NorthSouth => "north-south",
            ApproachDirection::EastWest => "east-west",
        };
        f.pad(name)
    }
}

/// Speed recommendation, the sole output of one control iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Increase,
    Maintain,
    Decrease,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Decision::Increase => "increase",
            Decision::Maintain => "maintain",
            Decision::Decrease => "decrease",
        };
        f.pad(name)
    }
}

/// State of the three actuator output lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActuatorOutputs {
    pub increase: bool,
    pub maintain: bool,
    pub decrease: bool,
}

impl From<Decision> for ActuatorOutputs {
    fn from(decision: Decision) -> Self {
        Self {
            increase: decision == Decision::Increase,
            maintain: decision == Decision::Maintain,
            decrease: decision == Decision::Decrease,
        }
    }
}

/// Predicted green window, expressed as positions along the signal cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenWindow {
    /// Window start (`t1`)
    pub start: f64,
    /// Window end (`t2`)
    pub end: f64,
}

/// Everything a decided iteration produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub decided_at: Timestamp,
    pub decision: Decision,
    pub approach: ApproachDirection,
    pub window: GreenWindow,
    pub signal: SignalRecord,
    /// Elapsed-time value fed to the phase prediction (seconds of day)
    pub elapsed: f64,
    pub speed_meters_per_sec: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(timestamp: &str) -> Position {
        Position {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude: 0.0,
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_seconds_of_day() {
        assert_eq!(fix_at("000105").seconds_of_day().unwrap(), 65.0);
        assert_eq!(fix_at("123519").seconds_of_day().unwrap(), 45319.0);

        let fractional = fix_at("000001.25").seconds_of_day().unwrap();
        assert!((fractional - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_seconds_of_day_long_fraction_stays_in_second() {
        let seconds = fix_at("123519.9999999999").seconds_of_day().unwrap();
        assert!(seconds >= 45319.0 && seconds < 45320.0);
    }

    #[test]
    fn test_seconds_of_day_rejects_garbage() {
        assert!(fix_at("").seconds_of_day().is_err());
        assert!(fix_at("12:35:19").seconds_of_day().is_err());
        assert!(fix_at("256000").seconds_of_day().is_err());
        assert!(fix_at("126100").seconds_of_day().is_err());
    }

    #[test]
    fn test_actuator_outputs_exactly_one_line() {
        for decision in [Decision::Increase, Decision::Maintain, Decision::Decrease] {
            let outputs = ActuatorOutputs::from(decision);
            let set = [outputs.increase, outputs.maintain, outputs.decrease]
                .iter()
                .filter(|line| **line)
                .count();
            assert_eq!(set, 1, "{} should set exactly one line", decision);
        }
    }

    #[test]
    fn test_error_recoverability() {
        assert!(AdvisorError::NoSignalAvailable.is_recoverable());
        assert!(AdvisorError::TruncatedRecord { fields: 6 }.is_recoverable());
        assert!(!AdvisorError::StreamClosed.is_recoverable());
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(format!("{}", Decision::Increase), "increase");
        assert_eq!(format!("{}", ApproachDirection::EastWest), "east-west");
    }
}
