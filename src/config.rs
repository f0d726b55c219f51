//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.opsmetrics.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".opsmetrics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input and history file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// History handling.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Data file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON list of application records.
    #[serde(default = "default_applications")]
    pub applications: PathBuf,

    /// JSON list of timestamped metric snapshots.
    #[serde(default = "default_history")]
    pub history: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            applications: default_applications(),
            history: default_history(),
        }
    }
}

fn default_applications() -> PathBuf {
    PathBuf::from("applications.json")
}

fn default_history() -> PathBuf {
    PathBuf::from("metrics_history.json")
}

/// What to do when the history file exists but cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorruptHistoryPolicy {
    /// Stop with an error (default)
    #[default]
    Fail,
    /// Move the file aside and start a new history
    Backup,
}

/// History settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub on_corrupt: CorruptHistoryPolicy,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report heading.
    #[serde(default = "default_title")]
    pub title: String,

    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Include the applications-per-day table.
    #[serde(default = "default_true")]
    pub include_timeline: bool,

    /// Include the raw records table.
    #[serde(default = "default_true")]
    pub include_raw_data: bool,

    /// Maximum raw rows to show (0 = all).
    #[serde(default)]
    pub max_raw_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            output: default_output(),
            include_timeline: true,
            include_raw_data: true,
            max_raw_rows: 0,
        }
    }
}

fn default_title() -> String {
    "Operator Metrics Dashboard".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("dashboard.md")
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref path) = args.applications {
            self.data.applications = path.clone();
        }
        if let Some(ref path) = args.history {
            self.data.history = path.clone();
        }
        if let Some(ref path) = args.output {
            self.report.output = path.clone();
        }
        if let Some(policy) = args.on_corrupt_history {
            self.history.on_corrupt = policy;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
