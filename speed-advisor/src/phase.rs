//! Green-window prediction
//!
//! Positions the current time inside the signal's cycle and extends it by the
//! green duration of the approach direction. Both ends are cycle positions in
//! seconds, not wall-clock times.

use crate::types::{AdvisorError, ApproachDirection, GreenWindow, Result, SignalRecord};

/// Predict the green window of `signal` for `approach` at elapsed time `time`
///
/// ```text
/// cycle   = ns_green + ew_green
/// elapsed = (phase_offset + time) mod cycle
/// t1      = elapsed
/// t2      = t1 + green(approach)
/// ```
///
/// The modulus is Euclidean, so negative offsets still land in `[0, cycle)`.
pub fn predict(signal: &SignalRecord, approach: ApproachDirection, time: f64) -> Result<GreenWindow> {
    let cycle_length = signal.cycle_length();
    if !(cycle_length.is_finite() && cycle_length > 0.0) {
        return Err(AdvisorError::DegenerateCycle(cycle_length));
    }

    let phase_elapsed = (signal.phase_offset + time).rem_euclid(cycle_length);
    let green = match approach {
        ApproachDirection::NorthSouth => signal.north_south_green,
        ApproachDirection::EastWest => signal.east_west_green,
    };

    Ok(GreenWindow {
        start: phase_elapsed,
        end: phase_elapsed + green,
    })
}
