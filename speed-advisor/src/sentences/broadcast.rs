//! Signal-broadcast sentence decoding
//!
//! A broadcast is a flat run of numeric fields after the tag, grouped into
//! records of seven values:
//!
//! | offset | value                           |
//! |--------|---------------------------------|
//! | 0      | latitude (decimal degrees)      |
//! | 1      | longitude (decimal degrees)     |
//! | 2      | north-south green (seconds)     |
//! | 3      | east-west green (seconds)       |
//! | 4      | phase offset (seconds)          |
//! | 5, 6   | placeholders, never read        |
//!
//! Bearing and distance are derived locally by the catalog, so the two
//! trailing slots are skipped without parsing.

use super::{parse_number, BROADCAST_RECORD_WIDTH};
use crate::types::{AdvisorError, Result, SignalBroadcastRow};

/// Decode the fields following the broadcast tag
///
/// An empty field list is a valid broadcast with no signals.
pub fn decode(fields: &[&str]) -> Result<Vec<SignalBroadcastRow>> {
    if fields.len() % BROADCAST_RECORD_WIDTH != 0 {
        return Err(AdvisorError::TruncatedRecord {
            fields: fields.len(),
        });
    }

    fields
        .chunks_exact(BROADCAST_RECORD_WIDTH)
        .map(decode_record)
        .collect()
}

fn decode_record(record: &[&str]) -> Result<SignalBroadcastRow> {
    let north_south_green = parse_number("north_south_green", record.get(2))?;
    let east_west_green = parse_number("east_west_green", record.get(3))?;
    if north_south_green < 0.0 || east_west_green < 0.0 {
        return Err(AdvisorError::malformed(
            "green_duration",
            &format!("{},{}", north_south_green, east_west_green),
        ));
    }

    Ok(SignalBroadcastRow {
        latitude_deg: parse_number("signal_latitude", record.get(0))?,
        longitude_deg: parse_number("signal_longitude", record.get(1))?,
        north_south_green,
        east_west_green,
        phase_offset: parse_number("phase_offset", record.get(4))?,
    })
}
