//! Advisory output and the console actuator
//!
//! Decided iterations are written either as aligned text lines or as one JSON
//! object per line. The run summary follows the same format.

use crate::config::OutputFormat;
use speed_advisor::{Actuator, ActuatorOutputs, Advisory, IterationOutcome, LoopStats};
use std::io::{self, Write};

/// Actuator that logs every change of the three speed lines
#[derive(Debug, Default)]
pub struct ConsoleActuator {
    current: Option<ActuatorOutputs>,
    writes: usize,
}

impl ConsoleActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Actuator for ConsoleActuator {
    fn apply(&mut self, outputs: ActuatorOutputs) -> io::Result<()> {
        if self.current != Some(outputs) {
            log::info!("Actuator lines now {}", lines(outputs));
        }
        self.current = Some(outputs);
        self.writes += 1;
        Ok(())
    }
}

fn lines(outputs: ActuatorOutputs) -> String {
    let flag = |on: bool| if on { "ON" } else { "off" };
    format!(
        "increase={} maintain={} decrease={}",
        flag(outputs.increase),
        flag(outputs.maintain),
        flag(outputs.decrease)
    )
}

/// Writes iteration outcomes as they arrive
///
/// The first write error is kept and every later outcome is dropped;
/// [`AdvisoryWriter::finish`] hands it back.
pub struct AdvisoryWriter<W: Write> {
    out: W,
    format: OutputFormat,
    error: Option<io::Error>,
}

impl<W: Write> AdvisoryWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            error: None,
        }
    }

    pub fn record(&mut self, outcome: &IterationOutcome) {
        if self.error.is_some() {
            return;
        }

        let result = match outcome {
            IterationOutcome::Decided(advisory) => self.write_advisory(advisory),
            IterationOutcome::Aborted(e) => match self.format {
                OutputFormat::Txt => writeln!(self.out, "  skipped ({})", e.kind()),
                OutputFormat::Json => Ok(()),
            },
        };

        if let Err(e) = result {
            self.error = Some(e);
        }
    }

    /// Write the run summary and flush
    pub fn finish(mut self, stats: &LoopStats) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        match self.format {
            OutputFormat::Txt => self.out.write_all(format_summary(stats).as_bytes())?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, stats)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_advisory(&mut self, advisory: &Advisory) -> io::Result<()> {
        match self.format {
            OutputFormat::Txt => writeln!(self.out, "{}", format_advisory(advisory)),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, advisory)?;
                writeln!(self.out)
            }
        }
    }
}

/// One text line per decided iteration
pub fn format_advisory(advisory: &Advisory) -> String {
    format!(
        "[{}] {:<8} {:<11} window {:>5.1}..{:>5.1}s  signal {:>8.1}m @ {:>5.1}°  speed {:>5.1} m/s",
        advisory.decided_at.format("%H:%M:%S"),
        advisory.decision,
        advisory.approach,
        advisory.window.start,
        advisory.window.end,
        advisory.signal.distance_from_vehicle,
        advisory.signal.bearing_from_vehicle,
        advisory.speed_meters_per_sec
    )
}

pub fn format_summary(stats: &LoopStats) -> String {
    let mut summary = String::new();
    summary.push_str("\n📊 Run Summary:\n");
    summary.push_str(&format!("  Iterations: {}\n", stats.iterations));
    summary.push_str(&format!("  Increase:   {}\n", stats.increase));
    summary.push_str(&format!("  Maintain:   {}\n", stats.maintain));
    summary.push_str(&format!("  Decrease:   {}\n", stats.decrease));
    summary.push_str(&format!("  Skipped:    {}\n", stats.total_aborted()));
    for (kind, count) in &stats.aborted {
        summary.push_str(&format!("    {}: {}\n", kind, count));
    }
    summary
}
