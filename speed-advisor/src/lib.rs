//! Speed Advisor Library
//!
//! A green-wave speed advisory pipeline for a single vehicle. It reads the
//! vehicle's position and velocity, keeps a small catalog of nearby traffic
//! signals from their timing broadcasts, and recommends whether to increase,
//! maintain or decrease speed to meet the nearest signal's green window.
//!
//! # Architecture
//!
//! Data flows strictly downstream:
//! - [`sentences`] decodes raw sentence text into typed records
//! - [`geodesy`] derives bearing and distance between two points
//! - [`catalog`] holds the bounded set of known signals
//! - [`selector`] picks the nearest signal and the approach direction
//! - [`phase`] predicts that signal's green window
//! - [`advisor`] turns the window into a [`Decision`]
//! - [`control`] runs the pipeline against its collaborators
//!
//! The library does NOT:
//! - Talk to hardware (sensors and actuators sit behind [`source`] traits)
//! - Persist telemetry between runs
//! - Coordinate several vehicles
//!
//! # Example Usage
//!
//! ```no_run
//! use speed_advisor::{AdvisorConfig, ControlLoop, IterationOutcome, LineReplaySource, SilentSource};
//! use speed_advisor::{Actuator, ActuatorOutputs};
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! struct PrintActuator;
//!
//! impl Actuator for PrintActuator {
//!     fn apply(&mut self, outputs: ActuatorOutputs) -> std::io::Result<()> {
//!         println!("{:?}", outputs);
//!         Ok(())
//!     }
//! }
//!
//! let gps = LineReplaySource::new(BufReader::new(File::open("drive.nmea").unwrap()));
//! let mut control = ControlLoop::new(AdvisorConfig::new(), gps, SilentSource, PrintActuator);
//!
//! let stats = control
//!     .run(None, |outcome| {
//!         if let IterationOutcome::Decided(advisory) = outcome {
//!             println!("{}", advisory.decision);
//!         }
//!     })
//!     .unwrap();
//! println!("{} iterations", stats.iterations);
//! ```

// Public modules
pub mod advisor;
pub mod catalog;
pub mod config;
pub mod control;
pub mod geodesy;
pub mod phase;
pub mod selector;
pub mod sentences;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use advisor::SpeedAdvisor;
pub use catalog::SignalCatalog;
pub use config::{AdvisorConfig, Comparison, NoSignalPolicy};
pub use control::{ControlLoop, IterationOutcome, LoopState, LoopStats};
pub use selector::Selection;
pub use sentences::TelemetrySentenceParser;
pub use source::{Actuator, LineReplaySource, SentenceSource, SilentSource};
pub use types::{
    ActuatorOutputs, AdvisorError, Advisory, ApproachDirection, Decision, GeoPoint,
    GreenWindow, Position, Result, SignalBroadcastRow, SignalRecord, Timestamp,
    VelocityVector,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
