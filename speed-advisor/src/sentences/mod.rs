//! Telemetry sentence decoding
//!
//! Locates a tagged, comma-delimited sentence inside a raw read buffer and maps
//! its fields onto typed records. The decoders are pure: they never touch the
//! collaborators that produced the buffer.

use crate::config::AdvisorConfig;
use crate::types::{AdvisorError, Position, Result, SignalBroadcastRow, VelocityVector};

pub mod broadcast;
pub mod position;
pub mod velocity;

/// Field delimiter shared by every sentence type
pub const FIELD_DELIMITER: char = ',';

/// Values per signal record in a broadcast sentence
pub const BROADCAST_RECORD_WIDTH: usize = 7;

/// Decoder for the three sentence types the advisor consumes
#[derive(Debug, Clone)]
pub struct TelemetrySentenceParser {
    position_tag: String,
    velocity_tag: String,
    broadcast_tag: String,
    verify_checksums: bool,
}

impl TelemetrySentenceParser {
    pub fn new() -> Self {
        Self::from_config(&AdvisorConfig::default())
    }

    pub fn from_config(config: &AdvisorConfig) -> Self {
        Self {
            position_tag: config.position_tag.clone(),
            velocity_tag: config.velocity_tag.clone(),
            broadcast_tag: config.broadcast_tag.clone(),
            verify_checksums: config.verify_checksums,
        }
    }

    pub fn position_tag(&self) -> &str {
        &self.position_tag
    }

    pub fn velocity_tag(&self) -> &str {
        &self.velocity_tag
    }

    pub fn broadcast_tag(&self) -> &str {
        &self.broadcast_tag
    }

    /// Decode the first position-fix sentence in `buffer`
    pub fn parse_position(&self, buffer: &str) -> Result<Position> {
        let sentence = locate_sentence(buffer, &self.position_tag)?;
        let body = strip_checksum(sentence, self.verify_checksums)?;
        position::decode(&split_fields(body))
    }

    /// Decode the first velocity sentence in `buffer`
    pub fn parse_velocity(&self, buffer: &str) -> Result<VelocityVector> {
        let sentence = locate_sentence(buffer, &self.velocity_tag)?;
        let body = strip_checksum(sentence, self.verify_checksums)?;
        velocity::decode(&split_fields(body))
    }

    /// Decode the first signal-broadcast sentence in `buffer`
    pub fn parse_broadcast(&self, buffer: &str) -> Result<Vec<SignalBroadcastRow>> {
        let sentence = locate_sentence(buffer, &self.broadcast_tag)?;
        let body = strip_checksum(sentence, false)?;
        let fields = split_fields(body);
        // Field 0 is the tag itself
        broadcast::decode(&fields[1..])
    }
}

impl Default for TelemetrySentenceParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the sentence starting at `tag`, up to (not including) the next line terminator
///
/// A sentence cut off by the end of the buffer runs to the end of the buffer.
pub fn locate_sentence<'a>(buffer: &'a str, tag: &str) -> Result<&'a str> {
    let start = buffer.find(tag).ok_or_else(|| AdvisorError::NotFound {
        tag: tag.to_string(),
    })?;

    let rest = &buffer[start..];
    let end = rest.find('\n').unwrap_or(rest.len());

    Ok(rest[..end].trim_end_matches('\r'))
}

/// Split a sentence body into trimmed fields
pub fn split_fields(body: &str) -> Vec<&str> {
    body.split(FIELD_DELIMITER).map(str::trim).collect()
}

/// Remove a trailing `*hh` checksum, verifying it when asked
///
/// The checksum is the XOR of every byte before the `*`, which for NMEA
/// sentences starts right after the `$` framing character.
pub fn strip_checksum(sentence: &str, verify: bool) -> Result<&str> {
    let Some((body, digits)) = sentence.split_once('*') else {
        return Ok(sentence);
    };

    if verify {
        let digits = digits.trim();
        let expected = u8::from_str_radix(digits, 16)
            .ok()
            .filter(|_| digits.len() == 2)
            .ok_or_else(|| AdvisorError::malformed("checksum", digits))?;
        let computed = checksum(body);
        if expected != computed {
            return Err(AdvisorError::ChecksumMismatch { expected, computed });
        }
    }

    Ok(body)
}

/// XOR checksum over the bytes of `body`
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// Parse a numeric field, failing with `MalformedField` when it is empty or not a number
pub(crate) fn parse_number(field: &'static str, raw: Option<&&str>) -> Result<f64> {
    let raw = raw.copied().unwrap_or("");
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(AdvisorError::malformed(field, raw)),
    }
}
