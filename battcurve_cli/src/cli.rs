//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "battcurve",
    version,
    about = "Record a charge/discharge cycle and build a battery SOC curve"
)]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines and print results/errors as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one full charge/discharge cycle and write the curve
    Run {
        /// Use the built-in simulated battery on a virtual clock instead of the daemon
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
        /// Where to write the curve (overrides output.path)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Also dump the raw discharge log as CSV (overrides output.samples_csv)
        #[arg(long, value_name = "FILE")]
        samples_csv: Option<PathBuf>,
        /// Interior points of the table (overrides curve.num_points)
        #[arg(long, value_name = "N")]
        num_points: Option<usize>,
    },
    /// Ask the daemon for the current battery voltage
    Voltage,
    /// Build a curve from a recorded discharge CSV
    Generate {
        /// Discharge log with `elapsed_s,voltage` header
        #[arg(long, value_name = "FILE")]
        samples: PathBuf,
        /// Where to write the curve (overrides output.path)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Interior points of the table (overrides curve.num_points)
        #[arg(long, value_name = "N")]
        num_points: Option<usize>,
    },
    /// Validate a curve file and optionally map a voltage to a level
    Inspect {
        /// Curve document to check
        #[arg(long, value_name = "FILE")]
        curve: PathBuf,
        /// Voltage to look up
        #[arg(long, value_name = "VOLTS")]
        voltage: Option<f64>,
    },
}

/// Whether `--json` was given.
pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}
