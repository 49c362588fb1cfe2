//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Traffic-sign detection result log.
#[derive(Debug, Parser)]
#[command(name = "signwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: platform config directory).
    #[arg(long, global = true, env = "SIGNWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the log table path.
    #[arg(long, global = true, env = "SIGNWATCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay recorded detector runs into the log table.
    Run(RunArgs),
    /// Show stored rows, newest first.
    History {
        /// Maximum number of rows (default: configured display limit).
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Buffer images as one run and export them.
    Export {
        /// Image files, in frame order.
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Run manifests (JSON), processed in order.
    #[arg(required = true)]
    pub manifests: Vec<PathBuf>,

    /// Minimum confidence threshold (0.0-1.0).
    #[arg(short = 'c', long, value_parser = parse_confidence, env = "SIGNWATCH_MIN_CONFIDENCE")]
    pub min_confidence: Option<f32>,

    /// Export each run's frames after processing.
    #[arg(long)]
    pub export: bool,

    /// Print the last frame's detections and target options.
    #[arg(long)]
    pub details: bool,

    /// Save the last frame with only target option N drawn (0: all targets).
    #[arg(long, value_name = "N")]
    pub target: Option<usize>,

    /// Do not show progress bars.
    #[arg(long)]
    pub no_progress: bool,
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Parse and validate confidence value.
fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(0.0..=1.0).contains(&value) {
        return Err(format!(
            "confidence must be between 0.0 and 1.0, got {value}"
        ));
    }

    Ok(value)
}
