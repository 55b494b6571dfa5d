//! Position-fix sentence decoding
//!
//! Field layout (index: meaning), following the GGA fix sentence:
//! `1` UTC time, `2` latitude `ddmm.mmmm`, `3` `N`/`S`,
//! `4` longitude `dddmm.mmmm`, `5` `E`/`W`, `9` altitude.

use super::parse_number;
use crate::types::{AdvisorError, Position, Result};

const TIME: usize = 1;
const LATITUDE: usize = 2;
const LATITUDE_HEMISPHERE: usize = 3;
const LONGITUDE: usize = 4;
const LONGITUDE_HEMISPHERE: usize = 5;
const ALTITUDE: usize = 9;

/// Decode the fields of a position sentence (field 0 is the tag)
pub fn decode(fields: &[&str]) -> Result<Position> {
    let latitude_deg = parse_coordinate(
        "latitude",
        fields.get(LATITUDE),
        fields.get(LATITUDE_HEMISPHERE),
        ('N', 'S'),
    )?;
    let longitude_deg = parse_coordinate(
        "longitude",
        fields.get(LONGITUDE),
        fields.get(LONGITUDE_HEMISPHERE),
        ('E', 'W'),
    )?;
    let altitude = parse_number("altitude", fields.get(ALTITUDE))?;
    let timestamp = fields.get(TIME).copied().unwrap_or_default().to_string();

    Ok(Position {
        latitude_deg,
        longitude_deg,
        altitude,
        timestamp,
    })
}

/// Convert a degrees+minutes coordinate with hemisphere letter to signed decimal degrees
///
/// `ddmm.mmmm` becomes `dd + mm.mmmm / 60`, negated for the second letter of
/// `hemispheres` (`S` or `W`).
pub fn parse_coordinate(
    field: &'static str,
    raw: Option<&&str>,
    hemisphere: Option<&&str>,
    hemispheres: (char, char),
) -> Result<f64> {
    let value = parse_number(field, raw)?;
    if value < 0.0 {
        return Err(AdvisorError::malformed(field, raw.copied().unwrap_or("")));
    }

    let degrees = (value / 100.0).trunc();
    let minutes = value - degrees * 100.0;
    if minutes >= 60.0 {
        return Err(AdvisorError::malformed(field, raw.copied().unwrap_or("")));
    }

    let decimal = degrees + minutes / 60.0;

    let letter = hemisphere.copied().unwrap_or("");
    let (positive, negative) = hemispheres;
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c == positive => Ok(decimal),
        (Some(c), None) if c == negative => Ok(-decimal),
        _ => Err(AdvisorError::malformed("hemisphere", letter)),
    }
}
