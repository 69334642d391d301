//! Command-line front end
//!
//! Parses flags, merges them over an optional JSON config file, runs the
//! fuzz sessions against one of the reference processors and produces a
//! [`RunReport`].

use crate::fuzz::report::{Assertion, CollectingReporter, SessionSummary};
use crate::processor::control::{ControlPath, DedicatedThreadControl, InlineControl};
use crate::processor::reference::{Gain, OnePoleLowpass, PassThrough};
use crate::{AudioProcessor, FuzzConfig, FuzzError, FuzzOptions, SessionRunner};
use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors parsing command-line arguments
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CliError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("Invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),

    #[error("Unknown processor: {0} (expected passthrough, gain or lowpass)")]
    UnknownProcessor(String),

    #[error("Unknown control mode: {0} (expected inline or thread)")]
    UnknownControl(String),
}

/// Built-in processor to fuzz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorKind {
    PassThrough,
    #[default]
    Gain,
    Lowpass,
}

impl ProcessorKind {
    pub fn name(self) -> &'static str {
        match self {
            ProcessorKind::PassThrough => "passthrough",
            ProcessorKind::Gain => "gain",
            ProcessorKind::Lowpass => "lowpass",
        }
    }

    /// Instantiate the processor with `channels` in and out
    pub fn build(self, channels: usize) -> Box<dyn AudioProcessor + Send> {
        match self {
            ProcessorKind::PassThrough => Box::new(PassThrough::new(channels)),
            ProcessorKind::Gain => Box::new(Gain::new(channels)),
            ProcessorKind::Lowpass => Box::new(OnePoleLowpass::new(channels)),
        }
    }
}

impl FromStr for ProcessorKind {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "passthrough" | "identity" => Ok(ProcessorKind::PassThrough),
            "gain" => Ok(ProcessorKind::Gain),
            "lowpass" => Ok(ProcessorKind::Lowpass),
            _ => Err(CliError::UnknownProcessor(s.to_string())),
        }
    }
}

/// How lifecycle calls reach the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// On the fuzzing thread
    #[default]
    Inline,
    /// On a dedicated control thread
    Thread,
}

impl FromStr for ControlMode {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inline" => Ok(ControlMode::Inline),
            "thread" => Ok(ControlMode::Thread),
            _ => Err(CliError::UnknownControl(s.to_string())),
        }
    }
}

/// Parsed `pluginfuzz` invocation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    /// Replaces the configured sample rates when non-empty
    pub sample_rates: Vec<f64>,
    pub block_size: Option<usize>,
    pub strictness_level: Option<i32>,
    pub seed: Option<u64>,
    pub session_seconds: Option<f64>,
    pub channels: Option<usize>,
    pub processor: ProcessorKind,
    pub control: ControlMode,
    pub report_path: Option<PathBuf>,
    pub save_config: Option<PathBuf>,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(CliArgs),
    Help,
    Version,
}

/// Parse a seed given as decimal or `0x`-prefixed hex
pub fn parse_seed(s: &str) -> Option<u64> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

/// Parse arguments (without the program name)
pub fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let mut cli = CliArgs::default();
    let mut i = 0;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-v" => return Ok(Command::Version),
            _ => {}
        }

        if !flag.starts_with('-') {
            return Err(CliError::UnknownArgument(flag.to_string()));
        }

        let value = args
            .get(i + 1)
            .map(String::as_str)
            .ok_or_else(|| CliError::MissingValue(flag.to_string()))?;

        match flag {
            "--config" | "-c" => cli.config_path = Some(PathBuf::from(value)),
            "--rate" | "-r" => cli.sample_rates.push(parse_value(flag, value)?),
            "--block-size" | "-b" => cli.block_size = Some(parse_value(flag, value)?),
            "--strictness" | "-s" => cli.strictness_level = Some(parse_value(flag, value)?),
            "--seed" => {
                cli.seed = Some(parse_seed(value).ok_or_else(|| CliError::InvalidValue {
                    flag: flag.to_string(),
                    value: value.to_string(),
                })?)
            }
            "--seconds" => cli.session_seconds = Some(parse_value(flag, value)?),
            "--channels" => cli.channels = Some(parse_value(flag, value)?),
            "--processor" | "-p" => cli.processor = value.parse()?,
            "--control" => cli.control = value.parse()?,
            "--report" => cli.report_path = Some(PathBuf::from(value)),
            "--save-config" => cli.save_config = Some(PathBuf::from(value)),
            _ => return Err(CliError::UnknownArgument(flag.to_string())),
        }
        i += 2;
    }

    Ok(Command::Run(cli))
}

impl CliArgs {
    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> Result<FuzzConfig> {
        let mut config = match &self.config_path {
            Some(path) => FuzzConfig::load(path)?,
            None => FuzzConfig::default(),
        };

        if !self.sample_rates.is_empty() {
            config.sample_rates = self.sample_rates.clone();
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(level) = self.strictness_level {
            config.strictness_level = level;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(seconds) = self.session_seconds {
            config.session_seconds = seconds;
        }
        if let Some(channels) = self.channels {
            config.channels = channels;
        }
        Ok(config)
    }
}

/// Everything a run produced, as written by `--report`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub version: String,
    /// Seed that reproduces this run
    pub seed: u64,
    pub processor: ProcessorKind,
    pub strictness_level: i32,
    pub sessions: Vec<SessionSummary>,
    pub assertions_passed: u64,
    pub assertions_failed: u64,
    /// First recorded failures
    pub failures: Vec<Assertion>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.assertions_failed == 0
    }

    /// Write the report as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "Report written");
        Ok(())
    }
}

fn fuzz_with<C>(
    options: FuzzOptions,
    seed: u64,
    control: C,
    processor: &mut Box<dyn AudioProcessor + Send>,
    reporter: &mut CollectingReporter,
) -> Result<Vec<SessionSummary>, FuzzError>
where
    C: ControlPath<Box<dyn AudioProcessor + Send>>,
{
    let rng = StdRng::seed_from_u64(seed);
    let mut runner = SessionRunner::with_control(options, rng, control);
    runner.run(processor, reporter)
}

/// Execute a `Run` command
pub fn run(args: &CliArgs) -> Result<RunReport> {
    let config = args.resolve_config()?;
    if let Some(path) = &args.save_config {
        config.save(path)?;
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(
        seed = %format!("{seed:#x}"),
        processor = args.processor.name(),
        strictness = config.strictness_level,
        "Starting fuzz run"
    );

    let mut processor = args.processor.build(config.channels);
    let mut reporter = CollectingReporter::new();
    let options = config.to_options();

    let sessions = match args.control {
        ControlMode::Inline => fuzz_with(
            options,
            seed,
            InlineControl,
            &mut processor,
            &mut reporter,
        ),
        ControlMode::Thread => fuzz_with(
            options,
            seed,
            DedicatedThreadControl::new(),
            &mut processor,
            &mut reporter,
        ),
    }
    .context("fuzz run could not start")?;

    let report = RunReport {
        version: crate::VERSION.to_string(),
        seed,
        processor: args.processor,
        strictness_level: config.strictness_level,
        sessions,
        assertions_passed: reporter.passed(),
        assertions_failed: reporter.failed(),
        failures: reporter.failures().to_vec(),
    };

    if let Some(path) = &args.report_path {
        report.save(path)?;
    }
    Ok(report)
}

pub fn print_help() {
    println!("Usage: pluginfuzz [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config PATH        Load settings from a JSON config file");
    println!("  -r, --rate RATE          Sample rate to test (repeatable)");
    println!("  -b, --block-size N       Nominal block size (default: 512)");
    println!("  -s, --strictness N       Strictness level; above 5 subnormals fail (default: 5)");
    println!("      --seed SEED          Random seed, decimal or 0x-hex (default: random)");
    println!("      --seconds S          Simulated seconds per sample rate (default: 3600)");
    println!("      --channels N         Channels for the reference processor (default: 2)");
    println!("  -p, --processor NAME     passthrough, gain or lowpass (default: gain)");
    println!("      --control MODE       inline or thread lifecycle calls (default: inline)");
    println!("      --report PATH        Write a JSON run report");
    println!("      --save-config PATH   Save the effective config and continue");
    println!("  -v, --version            Show version");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  pluginfuzz -p lowpass -r 44100 -r 48000 --seconds 60");
    println!("  pluginfuzz --config fuzz.json --seed 0x2a --report report.json");
}
