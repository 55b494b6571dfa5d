//! Advisor configuration types
//!
//! This module defines the tunables of the decision pipeline. Every field has a
//! default so a partial `[advisor]` table in a config file is enough.

use serde::{Deserialize, Serialize};

/// Configuration for the speed advisor library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Maximum number of signals held in the catalog
    #[serde(default = "default_catalog_capacity")]
    pub catalog_capacity: usize,

    /// Two signals closer than this (degrees, per axis) are the same signal
    #[serde(default = "default_position_tolerance")]
    pub position_tolerance_deg: f64,

    /// Byte limit handed to collaborators on every read
    #[serde(default = "default_read_max_bytes")]
    pub read_max_bytes: usize,

    /// Tag identifying position-fix sentences
    #[serde(default = "default_position_tag")]
    pub position_tag: String,

    /// Tag identifying velocity sentences
    #[serde(default = "default_velocity_tag")]
    pub velocity_tag: String,

    /// Tag identifying signal-broadcast sentences
    #[serde(default = "default_broadcast_tag")]
    pub broadcast_tag: String,

    /// Verify `*hh` checksums on position and velocity sentences
    #[serde(default = "default_true")]
    pub verify_checksums: bool,

    /// What the window start is compared against
    #[serde(default)]
    pub comparison: Comparison,

    /// Window starts within this distance of the compared value count as equal
    #[serde(default)]
    pub maintain_tolerance: f64,

    /// Actuator behaviour when the catalog is empty
    #[serde(default)]
    pub on_no_signal: NoSignalPolicy,
}

fn default_true() -> bool {
    true
}

fn default_catalog_capacity() -> usize {
    10
}

fn default_position_tolerance() -> f64 {
    1e-5
}

fn default_read_max_bytes() -> usize {
    512
}

fn default_position_tag() -> String {
    "GPGGA".to_string()
}

fn default_velocity_tag() -> String {
    "GPVTG".to_string()
}

fn default_broadcast_tag() -> String {
    "$$".to_string()
}

/// Quantity the green-window start is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Compare the window start directly against the distance in meters
    #[default]
    CyclePosition,
    /// Compare the window start against seconds-to-arrival at current speed
    ArrivalTime,
}

/// Actuator behaviour for iterations that end with `NoSignalAvailable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoSignalPolicy {
    /// Leave the actuator lines as they are
    #[default]
    Hold,
    /// Drive the maintain line
    Maintain,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            catalog_capacity: default_catalog_capacity(),
            position_tolerance_deg: default_position_tolerance(),
            read_max_bytes: default_read_max_bytes(),
            position_tag: default_position_tag(),
            velocity_tag: default_velocity_tag(),
            broadcast_tag: default_broadcast_tag(),
            verify_checksums: true,
            comparison: Comparison::default(),
            maintain_tolerance: 0.0,
            on_no_signal: NoSignalPolicy::default(),
        }
    }
}

impl AdvisorConfig {
    /// Create a new advisor configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set catalog capacity
    pub fn with_catalog_capacity(mut self, capacity: usize) -> Self {
        self.catalog_capacity = capacity;
        self
    }

    /// Builder method: set the same-signal position tolerance
    pub fn with_position_tolerance(mut self, tolerance_deg: f64) -> Self {
        self.position_tolerance_deg = tolerance_deg;
        self
    }

    /// Builder method: enable or disable checksum verification
    pub fn with_checksums(mut self, enabled: bool) -> Self {
        self.verify_checksums = enabled;
        self
    }

    /// Builder method: choose the comparison quantity
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Builder method: set the maintain tolerance
    pub fn with_maintain_tolerance(mut self, tolerance: f64) -> Self {
        self.maintain_tolerance = tolerance;
        self
    }

    /// Builder method: set the empty-catalog policy
    pub fn with_no_signal_policy(mut self, policy: NoSignalPolicy) -> Self {
        self.on_no_signal = policy;
        self
    }
}
