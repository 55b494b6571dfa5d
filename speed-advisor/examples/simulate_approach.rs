//! Simulated approach to a single signal
//!
//! Synthesizes one minute of telemetry for a vehicle driving due north at a
//! constant speed towards a signal and prints the advice for every second.
//!
//! Usage:
//!   cargo run --example simulate_approach [speed_kmh]

use speed_advisor::sentences::checksum;
use speed_advisor::{
    Actuator, ActuatorOutputs, AdvisorConfig, ControlLoop, IterationOutcome, LineReplaySource,
};
use std::env;
use std::io::Cursor;

const START_LAT_DEG: f64 = 40.5;
const LON_DEG: f64 = -73.25;
const SIGNAL_LAT_DEG: f64 = 40.505;
const METERS_PER_DEG_LAT: f64 = 111_195.0;

struct ConsoleLines;

impl Actuator for ConsoleLines {
    fn apply(&mut self, outputs: ActuatorOutputs) -> std::io::Result<()> {
        let line = |on: bool| if on { '#' } else { '.' };
        println!(
            "  [{}] increase  [{}] maintain  [{}] decrease",
            line(outputs.increase),
            line(outputs.maintain),
            line(outputs.decrease)
        );
        Ok(())
    }
}

fn nmea(body: &str) -> String {
    format!("${}*{:02X}\r\n", body, checksum(body))
}

/// `ddmm.mmmm` encoding of a non-negative decimal degree value
fn degrees_minutes(value: f64, degree_digits: usize) -> String {
    let degrees = value.trunc();
    let minutes = (value - degrees) * 60.0;
    format!("{:0width$}{:07.4}", degrees as u32, minutes, width = degree_digits)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let speed_kmh: f64 = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(36.0);
    let speed_mps = speed_kmh / 3.6;

    let mut telemetry = String::new();
    for second in 0..60u32 {
        let lat = START_LAT_DEG + speed_mps * second as f64 / METERS_PER_DEG_LAT;
        if lat >= SIGNAL_LAT_DEG {
            break;
        }
        let time = format!("1200{:02}", second);
        telemetry.push_str(&nmea(&format!(
            "GPGGA,{},{},N,{},W,1,08,0.9,12.0,M,0.0,M,,",
            time,
            degrees_minutes(lat, 2),
            degrees_minutes(LON_DEG.abs(), 3)
        )));
        telemetry.push_str(&nmea(&format!("GPVTG,0.0,T,,M,,N,{:.1},K", speed_kmh)));
    }

    let broadcast = format!("$$,{},{},30,30,7,,\n", SIGNAL_LAT_DEG, LON_DEG);

    println!("Simulating approach at {:.1} km/h", speed_kmh);
    println!("═══════════════════════════════════════════════\n");

    let mut control = ControlLoop::new(
        AdvisorConfig::default(),
        LineReplaySource::new(Cursor::new(telemetry)),
        LineReplaySource::new(Cursor::new(broadcast)),
        ConsoleLines,
    );

    let result = control.run(None, |outcome| match outcome {
        IterationOutcome::Decided(advisory) => println!(
            "t={:>7.1}s  {:>6.1}m to signal  window {:>4.1}..{:>4.1}  -> {}",
            advisory.elapsed,
            advisory.signal.distance_from_vehicle,
            advisory.window.start,
            advisory.window.end,
            advisory.decision
        ),
        IterationOutcome::Aborted(e) => println!("skipped: {}", e),
    });

    match result {
        Ok(stats) => println!(
            "\n{} iterations: {} increase, {} maintain, {} decrease",
            stats.iterations, stats.increase, stats.maintain, stats.decrease
        ),
        Err(e) => eprintln!("Simulation failed: {}", e),
    }
}
