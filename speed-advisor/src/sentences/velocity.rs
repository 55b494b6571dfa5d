//! Velocity sentence decoding
//!
//! Follows the VTG course-over-ground sentence: field `1` is the true
//! heading in degrees, field `7` the ground speed in km/h.

use super::parse_number;
use crate::types::{Result, VelocityVector};

const HEADING: usize = 1;
const SPEED_KMH: usize = 7;

const KMH_PER_METER_PER_SEC: f64 = 3.6;

/// Decode the fields of a velocity sentence (field 0 is the tag)
pub fn decode(fields: &[&str]) -> Result<VelocityVector> {
    let heading_deg = parse_number("heading", fields.get(HEADING))?;
    let speed_kmh = parse_number("speed", fields.get(SPEED_KMH))?;

    Ok(VelocityVector {
        heading_deg,
        speed_meters_per_sec: speed_kmh / KMH_PER_METER_PER_SEC,
    })
}
