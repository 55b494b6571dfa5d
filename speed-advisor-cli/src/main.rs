//! Speed Advisor CLI Application
//!
//! Replays recorded position/velocity sentences and signal broadcasts through
//! the speed-advisor control loop and prints one advisory per iteration.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use speed_advisor::{ControlLoop, LineReplaySource, SentenceSource, SilentSource};

mod config;
mod report;

use config::{AppConfig, OutputFormat};
use report::{AdvisoryWriter, ConsoleActuator};

/// Speed Advisor - green-wave speed advice from recorded telemetry
#[derive(Parser, Debug)]
#[command(name = "speed-advisor")]
#[command(about = "Replay GPS and signal-broadcast recordings through the speed advisor", long_about = None)]
#[command(version)]
struct Args {
    /// Recorded GPGGA/GPVTG sentences (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    gps: Option<PathBuf>,

    /// Recorded signal broadcasts
    #[arg(short, long, value_name = "FILE")]
    broadcast: Option<PathBuf>,

    /// Output file for advisories (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Advisory output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Stop after this many iterations
    #[arg(long, value_name = "COUNT")]
    max_iterations: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Speed Advisor CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using advisor library v{}", speed_advisor::VERSION);

    let config = resolve_config(&args)?;
    run(config)
}

/// File settings first, command-line flags on top
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            let config = config::load_config(path)?;
            log::debug!("Configuration loaded successfully");
            config
        }
        None => AppConfig::default(),
    };

    if let Some(gps) = &args.gps {
        config.input.gps = Some(gps.clone());
    }
    if let Some(broadcast) = &args.broadcast {
        config.input.broadcast = Some(broadcast.clone());
    }
    if let Some(output) = &args.output {
        config.output.file = Some(output.clone());
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if args.max_iterations.is_some() {
        config.output.max_iterations = args.max_iterations;
    }

    Ok(config)
}

fn run(config: AppConfig) -> Result<()> {
    let sensor = LineReplaySource::new(open_input(config.input.gps.as_ref())?);

    let mut broadcast: Box<dyn SentenceSource> = match &config.input.broadcast {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open broadcast file: {:?}", path))?;
            Box::new(LineReplaySource::new(BufReader::new(file)))
        }
        None => {
            log::warn!("No broadcast input given; every iteration will lack a signal");
            Box::new(SilentSource)
        }
    };

    let out: Box<dyn Write> = match &config.output.file {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    if config.output.format == OutputFormat::Txt && config.output.file.is_none() {
        println!("═══════════════════════════════════════════════");
        println!("  Speed Advisor - Replay");
        println!("═══════════════════════════════════════════════\n");
    }

    let mut writer = AdvisoryWriter::new(out, config.output.format);
    let mut control = ControlLoop::new(
        config.advisor,
        sensor,
        broadcast.as_mut(),
        ConsoleActuator::new(),
    );

    let stats = control
        .run(config.output.max_iterations, |outcome| writer.record(outcome))
        .context("Control loop failed")?;

    log::info!(
        "{} of {} iterations decided, {} signals known",
        stats.decided(),
        stats.iterations,
        control.catalog().len()
    );

    writer.finish(&stats).context("Failed to write advisories")?;
    Ok(())
}

fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open GPS file: {:?}", path))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            log::info!("Reading GPS sentences from stdin");
            Ok(Box::new(io::stdin().lock()))
        }
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
