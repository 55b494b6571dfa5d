//! The control loop
//!
//! One iteration pulls a position fix and a velocity reading from the sensor,
//! folds any pending signal broadcast into the catalog, selects a signal,
//! predicts its green window and drives the actuator with the decision.
//!
//! Iterations run strictly one after another. Recoverable errors abandon the
//! current iteration and the next one starts again from `AwaitingFix`; only a
//! closed sensor stream or an I/O failure ends [`ControlLoop::run`].

use crate::advisor::SpeedAdvisor;
use crate::catalog::SignalCatalog;
use crate::config::{AdvisorConfig, NoSignalPolicy};
use crate::phase;
use crate::selector;
use crate::sentences::TelemetrySentenceParser;
use crate::source::{Actuator, SentenceSource};
use crate::types::{
    ActuatorOutputs, AdvisorError, Advisory, Decision, Position, Result, VelocityVector,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Where the current iteration stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingFix,
    HaveFix,
    HaveVelocity,
    HaveSignals,
    Decided,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::AwaitingFix => "AwaitingFix",
            LoopState::HaveFix => "HaveFix",
            LoopState::HaveVelocity => "HaveVelocity",
            LoopState::HaveSignals => "HaveSignals",
            LoopState::Decided => "Decided",
        };
        f.write_str(name)
    }
}

/// Result of one completed iteration
#[derive(Debug)]
pub enum IterationOutcome {
    /// A decision was made and written to the actuator
    Decided(Advisory),
    /// The iteration was abandoned on a recoverable error
    Aborted(AdvisorError),
}

/// Counters accumulated over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    pub iterations: usize,
    pub increase: usize,
    pub maintain: usize,
    pub decrease: usize,
    /// Abandoned iterations by error kind
    pub aborted: BTreeMap<&'static str, usize>,
}

impl LoopStats {
    /// Iterations that ended in a decision
    pub fn decided(&self) -> usize {
        self.increase + self.maintain + self.decrease
    }

    /// Iterations abandoned on a recoverable error
    pub fn total_aborted(&self) -> usize {
        self.aborted.values().sum()
    }

    fn record_decision(&mut self, decision: Decision) {
        match decision {
            Decision::Increase => self.increase += 1,
            Decision::Maintain => self.maintain += 1,
            Decision::Decrease => self.decrease += 1,
        }
    }

    fn record_abort(&mut self, error: &AdvisorError) {
        *self.aborted.entry(error.kind()).or_insert(0) += 1;
    }
}

/// Orchestrates the decision pipeline over its collaborators
///
/// `S` is the position-and-velocity sensor, `B` the signal-broadcast
/// receiver and `A` the actuator. The loop exclusively owns the catalog and
/// the latest telemetry.
pub struct ControlLoop<S, B, A> {
    config: AdvisorConfig,
    parser: TelemetrySentenceParser,
    advisor: SpeedAdvisor,
    catalog: SignalCatalog,
    sensor: S,
    broadcast: B,
    actuator: A,
    state: LoopState,
    last_position: Option<Position>,
    last_velocity: Option<VelocityVector>,
    last_outputs: Option<ActuatorOutputs>,
    stats: LoopStats,
}

impl<S, B, A> ControlLoop<S, B, A>
where
    S: SentenceSource,
    B: SentenceSource,
    A: Actuator,
{
    pub fn new(config: AdvisorConfig, sensor: S, broadcast: B, actuator: A) -> Self {
        Self {
            parser: TelemetrySentenceParser::from_config(&config),
            advisor: SpeedAdvisor::from_config(&config),
            catalog: SignalCatalog::with_limits(config.catalog_capacity, config.position_tolerance_deg),
            config,
            sensor,
            broadcast,
            actuator,
            state: LoopState::AwaitingFix,
            last_position: None,
            last_velocity: None,
            last_outputs: None,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn catalog(&self) -> &SignalCatalog {
        &self.catalog
    }

    pub fn last_position(&self) -> Option<&Position> {
        self.last_position.as_ref()
    }

    pub fn last_velocity(&self) -> Option<&VelocityVector> {
        self.last_velocity.as_ref()
    }

    /// Actuator lines as last written, `None` before the first write
    pub fn last_outputs(&self) -> Option<ActuatorOutputs> {
        self.last_outputs
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Run iterations until the sensor closes or `max_iterations` is reached
    ///
    /// `on_outcome` sees every completed iteration.
    pub fn run<F>(&mut self, max_iterations: Option<usize>, mut on_outcome: F) -> Result<LoopStats>
    where
        F: FnMut(&IterationOutcome),
    {
        log::info!("Control loop started");

        while max_iterations.map_or(true, |max| self.stats.iterations < max) {
            match self.run_iteration() {
                Ok(outcome) => on_outcome(&outcome),
                Err(AdvisorError::StreamClosed) => {
                    log::info!("Sensor stream closed after {} iterations", self.stats.iterations);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(self.stats.clone())
    }

    /// Run one iteration to completion
    ///
    /// Recoverable errors come back as `IterationOutcome::Aborted`; the
    /// `Err` side carries only `StreamClosed` and I/O failures.
    pub fn run_iteration(&mut self) -> Result<IterationOutcome> {
        self.transition(LoopState::AwaitingFix);

        match self.decide() {
            Ok(advisory) => {
                self.write_outputs(ActuatorOutputs::from(advisory.decision))?;
                self.stats.iterations += 1;
                self.stats.record_decision(advisory.decision);
                log::debug!(
                    "Decided {} (window {:.1}..{:.1}, distance {:.1}m)",
                    advisory.decision,
                    advisory.window.start,
                    advisory.window.end,
                    advisory.signal.distance_from_vehicle
                );
                Ok(IterationOutcome::Decided(advisory))
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("Iteration abandoned: {}", e);
                if matches!(e, AdvisorError::NoSignalAvailable)
                    && self.config.on_no_signal == NoSignalPolicy::Maintain
                {
                    self.write_outputs(ActuatorOutputs::from(Decision::Maintain))?;
                }
                self.stats.iterations += 1;
                self.stats.record_abort(&e);
                self.transition(LoopState::AwaitingFix);
                Ok(IterationOutcome::Aborted(e))
            }
            Err(e) => {
                self.transition(LoopState::AwaitingFix);
                Err(e)
            }
        }
    }

    fn decide(&mut self) -> Result<Advisory> {
        let (position, buffer) = self.read_tagged(TelemetrySentenceParser::parse_position)?;
        let elapsed = position.seconds_of_day()?;
        self.last_position = Some(position.clone());
        self.transition(LoopState::HaveFix);

        // The fix buffer may already carry the velocity sentence
        let velocity = match self.parser.parse_velocity(&buffer) {
            Err(AdvisorError::NotFound { .. }) => {
                self.read_tagged(TelemetrySentenceParser::parse_velocity)?.0
            }
            other => other?,
        };
        self.last_velocity = Some(velocity);
        self.transition(LoopState::HaveVelocity);

        self.catalog.refresh_geometry(position.point());
        self.ingest_broadcast()?;
        self.transition(LoopState::HaveSignals);

        let selection = selector::select(&self.catalog, velocity.heading_deg)?;
        let window = phase::predict(&selection.signal, selection.approach, elapsed)?;
        let decision = self.advisor.decide(
            &window,
            selection.signal.distance_from_vehicle,
            velocity.speed_meters_per_sec,
        );
        self.transition(LoopState::Decided);

        Ok(Advisory {
            decided_at: Utc::now(),
            decision,
            approach: selection.approach,
            window,
            signal: selection.signal,
            elapsed,
            speed_meters_per_sec: velocity.speed_meters_per_sec,
        })
    }

    /// Read sensor buffers until one carries the sentence `parse` looks for
    fn read_tagged<T>(
        &mut self,
        parse: fn(&TelemetrySentenceParser, &str) -> Result<T>,
    ) -> Result<(T, String)> {
        loop {
            let buffer = self
                .sensor
                .read_sentence(self.config.read_max_bytes)?
                .ok_or(AdvisorError::StreamClosed)?;

            match parse(&self.parser, &buffer) {
                Err(AdvisorError::NotFound { tag }) => {
                    log::trace!("Skipping sensor buffer without {}", tag);
                }
                other => return other.map(|value| (value, buffer)),
            }
        }
    }

    /// Fold at most one pending broadcast line into the catalog
    ///
    /// The whole broadcast is decoded before any row is applied, so a bad
    /// broadcast leaves the catalog as it was.
    fn ingest_broadcast(&mut self) -> Result<usize> {
        if !self.broadcast.has_data() {
            log::trace!("No signal broadcast this iteration");
            return Ok(0);
        }

        let Some(mut buffer) = self.broadcast.read_sentence(self.config.read_max_bytes)? else {
            return Ok(0);
        };

        // A broadcast longer than one read arrives in pieces; rejoin up to the terminator
        let mut pieces = 1;
        while !buffer.ends_with('\n') && self.broadcast.has_data() {
            match self.broadcast.read_sentence(self.config.read_max_bytes)? {
                Some(piece) => {
                    buffer.push_str(&piece);
                    pieces += 1;
                }
                None => break,
            }
        }
        if pieces > 1 {
            log::debug!("Broadcast of {} bytes rejoined from {} reads", buffer.len(), pieces);
        }

        let rows = match self.parser.parse_broadcast(&buffer) {
            Err(AdvisorError::NotFound { tag }) => {
                log::trace!("Broadcast buffer without {}", tag);
                return Ok(0);
            }
            other => other?,
        };

        let count = rows.len();
        for row in rows {
            self.catalog.upsert(row.into());
        }
        log::debug!("Applied {} broadcast rows, catalog holds {}", count, self.catalog.len());
        Ok(count)
    }

    fn write_outputs(&mut self, outputs: ActuatorOutputs) -> Result<()> {
        self.actuator.apply(outputs)?;
        self.last_outputs = Some(outputs);
        Ok(())
    }

    fn transition(&mut self, next: LoopState) {
        if self.state != next {
            log::trace!("{} -> {}", self.state, next);
            self.state = next;
        }
    }
}
