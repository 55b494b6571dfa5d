//! Speed decision rule
//!
//! Compares the start of the predicted green window against the selected
//! signal's distance and turns the result into one of three decisions.

use crate::config::{AdvisorConfig, Comparison};
use crate::types::{Decision, GreenWindow};

/// Pure decision rule over a green window and the selected signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedAdvisor {
    comparison: Comparison,
    maintain_tolerance: f64,
}

impl SpeedAdvisor {
    pub fn new() -> Self {
        Self::from_config(&AdvisorConfig::default())
    }

    pub fn from_config(config: &AdvisorConfig) -> Self {
        Self {
            comparison: config.comparison,
            maintain_tolerance: config.maintain_tolerance.max(0.0),
        }
    }

    /// Decide for a window, signal distance (meters) and vehicle speed (m/s)
    ///
    /// With `Comparison::CyclePosition` the window start is compared against
    /// the distance itself. With `Comparison::ArrivalTime` it is compared
    /// against `distance / speed`; a stopped vehicle never arrives, which
    /// compares as later than any window start.
    pub fn decide(&self, window: &GreenWindow, distance_m: f64, speed_mps: f64) -> Decision {
        let reference = match self.comparison {
            Comparison::CyclePosition => distance_m,
            Comparison::ArrivalTime if speed_mps > 0.0 => distance_m / speed_mps,
            Comparison::ArrivalTime => f64::INFINITY,
        };

        decide(window.start, reference, self.maintain_tolerance)
    }
}

impl Default for SpeedAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

/// The rule table: `t1` above the reference increases, equal maintains, below decreases
pub fn decide(t1: f64, reference: f64, tolerance: f64) -> Decision {
    if (t1 - reference).abs() <= tolerance {
        Decision::Maintain
    } else if t1 > reference {
        Decision::Increase
    } else {
        Decision::Decrease
    }
}
