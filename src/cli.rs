//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::CorruptHistoryPolicy;
use clap::Parser;
use std::path::PathBuf;

/// Opsmetrics - job-search metrics with snapshot history
///
/// Reads your application tracker, computes counts and conversion rates,
/// records a timestamped snapshot and writes a report with the change
/// since the previous run.
///
/// Examples:
///   opsmetrics
///   opsmetrics --applications data/applications.json --format json -o dashboard.json
///   opsmetrics --no-record
///   opsmetrics --check
///   opsmetrics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Applications file (JSON list of records)
    ///
    /// Defaults to the config value or applications.json.
    #[arg(long, value_name = "FILE", env = "OPSMETRICS_APPLICATIONS")]
    pub applications: Option<PathBuf>,

    /// Metrics history file
    ///
    /// Defaults to the config value or metrics_history.json.
    #[arg(long, value_name = "FILE", env = "OPSMETRICS_HISTORY")]
    pub history: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .opsmetrics.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Render the report without recording a new snapshot
    #[arg(long)]
    pub no_record: bool,

    /// Validate the applications file and exit
    #[arg(long)]
    pub check: bool,

    /// What to do with an unreadable history file (fail, backup)
    #[arg(long, value_name = "POLICY")]
    pub on_corrupt_history: Option<CorruptHistoryPolicy>,

    /// Generate a default .opsmetrics.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.check && self.no_record {
            return Err("--check does not record anything; drop --no-record".to_string());
        }

        if let Some(ref path) = self.applications {
            if path.is_dir() {
                return Err(format!(
                    "Applications path is a directory: {}",
                    path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
