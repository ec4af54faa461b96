use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult};
use crate::output::OutputFormat;

pub mod encode;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Emulate sensors and write their frames until stopped.
    Run(RunArgs),
    /// Encode a single sensor reading and print the frame.
    Encode(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// `IDX:LEVEL:TEMP`, e.g. `0:0.25:-10`.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorSpec {
    pub index: usize,
    pub level: f64,
    pub temperature: i32,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Enable a sensor as IDX:LEVEL:TEMP (repeatable), e.g. 0:0.25:-10.
    #[arg(long = "sensor", short = 's', value_name = "IDX:LEVEL:TEMP", value_parser = parse_sensor_spec)]
    pub sensors: Vec<SensorSpec>,
    /// Identifier base; sensor i reports on BASE + i + 1.
    #[arg(long, env = "DUTEM_BASE_ID", default_value = "0x0CF60664", value_parser = parse_id)]
    pub base_id: u32,
    /// Number of emulated sensors.
    #[arg(long, default_value_t = dutem_frame::DEFAULT_SENSOR_COUNT)]
    pub channels: usize,
    /// Emission interval (e.g. 1s, 250ms).
    #[arg(long, env = "DUTEM_INTERVAL", default_value = "1s")]
    pub interval: String,
    /// Send all enabled sensors back-to-back each interval instead of one per interval.
    #[arg(long)]
    pub simultaneous: bool,
    /// Write frames to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Interface name written before each frame line (e.g. can0).
    #[arg(long, value_name = "NAME")]
    pub interface: Option<String>,
    /// Prefix frame lines with candump-style timestamps.
    #[arg(long)]
    pub timestamps: bool,
    /// Stop after this long (e.g. 10s, 500ms). Default: run until Ctrl-C.
    #[arg(long)]
    pub duration: Option<String>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Sensor index (0-based).
    #[arg(long, short = 's', default_value_t = 0)]
    pub sensor: usize,
    /// Fill fraction; clamped to 0.0..=1.0 when encoded.
    #[arg(long, allow_negative_numbers = true)]
    pub level: f64,
    /// Temperature in °C; clamped to -40..=215 when encoded.
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: i32,
    /// Identifier base; sensor i reports on BASE + i + 1.
    #[arg(long, env = "DUTEM_BASE_ID", default_value = "0x0CF60664", value_parser = parse_id)]
    pub base_id: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_sensor_spec(input: &str) -> Result<SensorSpec, String> {
    let mut parts = input.splitn(3, ':');
    let (Some(index), Some(level), Some(temperature)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected IDX:LEVEL:TEMP, got {input:?}"));
    };

    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid sensor index: {index:?}"))?;
    let level: f64 = level
        .trim()
        .parse()
        .map_err(|_| format!("invalid level: {level:?}"))?;
    if !level.is_finite() {
        return Err(format!("level must be a finite number, got {level}"));
    }
    let temperature = temperature
        .trim()
        .parse()
        .map_err(|_| format!("invalid temperature: {temperature:?}"))?;

    Ok(SensorSpec {
        index,
        level,
        temperature,
    })
}

/// Decimal or `0x`-prefixed hexadecimal identifier.
pub fn parse_id(input: &str) -> Result<u32, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => input.replace('_', "").parse(),
    };
    parsed.map_err(|_| format!("invalid identifier: {input:?}"))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else if let Some(num) = input.strip_suffix('m') {
        (num, "m")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value.saturating_mul(60))),
        _ => Err(CliError::usage(format!("unsupported duration unit: {unit}"))),
    }
}
