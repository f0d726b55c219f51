//! Error types for loading applications and metric history.
//!
//! Domain failures are typed with `thiserror`; the CLI layer wraps them
//! in `anyhow` with extra context.

use std::path::PathBuf;
use thiserror::Error;

/// An applications file or record that cannot be turned into records.
#[derive(Error, Debug)]
pub enum DataFormatError {
    #[error("Failed to read applications file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Applications data is not a JSON list of records: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("Record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error(
        "Record {index} has unknown status `{value}` (expected applied, interview, offer or rejected)"
    )]
    UnknownStatus { index: usize, value: String },

    #[error("Record {index} is invalid: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {index} has an invalid `{field}`: {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Total hours_saved_by_automation is not a finite number")]
    HoursOverflow,
}

/// A history file that exists but cannot be used.
#[derive(Error, Debug)]
pub enum HistoryCorruptError {
    #[error("History file {path:?} could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("History file {path:?} is corrupt: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
