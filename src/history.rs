//! Snapshot history tracking.
//!
//! The history file is a JSON array of `{timestamp, metrics}` entries.
//! It is only ever appended to, and every save replaces the file through
//! an fsynced temporary file and a rename so a crash mid-write leaves
//! the previous version intact.

use crate::error::HistoryCorruptError;
use crate::models::{DeltaSet, History, HistoryEntry, MetricsSnapshot};
use anyhow::{Context, Result};
use chrono::Local;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Timestamp format stored in history entries.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Load the history log. A missing or empty file is an empty history.
pub fn load_history(path: &Path) -> Result<History, HistoryCorruptError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No history at {}, starting fresh", path.display());
            return Ok(History::new());
        }
        Err(source) => {
            return Err(HistoryCorruptError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(History::new());
    }

    let history: History =
        serde_json::from_str(&content).map_err(|source| HistoryCorruptError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Loaded {} history entries", history.len());
    Ok(history)
}

/// Return `history` with one more entry at the end.
///
/// Fails without touching the log if the snapshot holds a non-finite metric.
pub fn append_snapshot(
    mut history: History,
    snapshot: &MetricsSnapshot,
    timestamp: impl Into<String>,
) -> Result<History, serde_json::Error> {
    history.push(HistoryEntry::new(timestamp, snapshot)?);
    Ok(history)
}

/// `current[k] - previous[k]` for every key numeric in both maps.
///
/// Keys missing from `previous` or holding non-numeric values are left out.
pub fn compute_deltas(current: &Map<String, Value>, previous: &Map<String, Value>) -> DeltaSet {
    current
        .iter()
        .filter_map(|(key, value)| {
            let now = value.as_f64()?;
            let before = previous.get(key)?.as_f64()?;
            Some((key.clone(), now - before))
        })
        .collect()
}

impl History {
    /// Deltas between the two most recent entries.
    pub fn latest_deltas(&self) -> Option<DeltaSet> {
        let latest = self.latest()?;
        let previous = self.previous()?;
        Some(compute_deltas(&latest.metrics, &previous.metrics))
    }
}

/// Write the whole history to `path`, replacing it atomically.
pub fn save_history(path: &Path, history: &History) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let content = serde_json::to_string_pretty(history).context("Failed to serialize history")?;

    let mut tmp = NamedTempFile::new_in(&dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .context("Failed to write history")?;
    tmp.as_file()
        .sync_all()
        .context("Failed to flush history to disk")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace history file {}", path.display()))?;

    debug!("Saved {} history entries to {}", history.len(), path.display());
    Ok(())
}

/// Move a corrupt history file out of the way and return its new path.
pub fn quarantine_corrupt(path: &Path) -> Result<PathBuf> {
    let suffix = Local::now().format("%Y%m%dT%H%M%S");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history".to_string());
    let backup = path.with_file_name(format!("{}.corrupt-{}", file_name, suffix));

    std::fs::rename(path, &backup).with_context(|| {
        format!(
            "Failed to move corrupt history {} to {}",
            path.display(),
            backup.display()
        )
    })?;

    warn!("Moved corrupt history to {}", backup.display());
    Ok(backup)
}

/// Load history, falling back to a fresh log when `backup_corrupt` is set.
pub fn load_or_recover(path: &Path, backup_corrupt: bool) -> Result<History> {
    match load_history(path) {
        Ok(history) => Ok(history),
        Err(err @ HistoryCorruptError::Malformed { .. }) if backup_corrupt => {
            warn!("{}", err);
            let backup = quarantine_corrupt(path)?;
            info!(
                "Starting a new history; previous data kept at {}",
                backup.display()
            );
            Ok(History::new())
        }
        Err(err) => Err(err.into()),
    }
}
