//! Data models for the metrics tracker.
//!
//! This module contains the core data structures used throughout
//! the application: application records, metric snapshots, history
//! entries and the dashboard handed to the report generator.

use chrono::NaiveDate;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of a job application, ordered by funnel stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Application sent, no response yet
    Applied,
    /// Reached an interview
    Interview,
    /// Received an offer
    Offer,
    /// Turned down
    Rejected,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Applied => write!(f, "Applied"),
            Status::Interview => write!(f, "Interview"),
            Status::Offer => write!(f, "Offer"),
            Status::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A single job application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    /// Company applied to.
    pub company: String,
    /// Position title.
    pub position: String,
    /// Date the application was sent.
    pub date_applied: NaiveDate,
    /// Whether a direct message was sent.
    pub dm_sent: bool,
    /// Whether a follow-up was sent.
    pub follow_up_sent: bool,
    /// Current outcome.
    pub status: Status,
    /// Estimated hours saved by automation for this application.
    pub hours_saved_by_automation: f64,
}

impl ApplicationRecord {
    /// Field names every record must carry, in declaration order.
    pub const REQUIRED_FIELDS: [&'static str; 7] = [
        "company",
        "position",
        "date_applied",
        "dm_sent",
        "follow_up_sent",
        "status",
        "hours_saved_by_automation",
    ];
}

/// Aggregate metrics computed from one set of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_applications: u64,
    pub interviews: u64,
    pub offers: u64,
    pub dms_sent: u64,
    pub follow_ups_sent: u64,
    /// Interviews per application, as a percentage.
    pub interview_rate: f64,
    /// Offers per application, as a percentage.
    pub offer_rate: f64,
    /// Offers per interview, as a percentage.
    pub offer_to_interview_rate: f64,
    pub hours_saved: f64,
}

impl MetricsSnapshot {
    /// Flatten the snapshot into a name to value map.
    ///
    /// Fails if a metric is not a finite number, since JSON would store
    /// it as `null`.
    pub fn to_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let Value::Object(map) = serde_json::to_value(self)? else {
            return Err(serde_json::Error::custom("metrics snapshot is not a JSON object"));
        };

        if let Some((name, _)) = map.iter().find(|(_, value)| value.is_null()) {
            return Err(serde_json::Error::custom(format!(
                "metric `{}` is not a finite number",
                name
            )));
        }

        Ok(map)
    }
}

/// One persisted snapshot.
///
/// Metrics are kept as a loose map so entries written with an older
/// set of fields still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local time, `YYYY-MM-DDTHH:MM:SS`.
    pub timestamp: String,
    #[serde(default)]
    pub metrics: Map<String, Value>,
}

impl HistoryEntry {
    pub fn new(
        timestamp: impl Into<String>,
        snapshot: &MetricsSnapshot,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            timestamp: timestamp.into(),
            metrics: snapshot.to_map()?,
        })
    }
}

/// Chronological, append-only log of snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent entry, if any.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// The entry before the most recent one.
    pub fn previous(&self) -> Option<&HistoryEntry> {
        self.entries.iter().rev().nth(1)
    }

    /// Appending is the only way to grow a history.
    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }
}

/// Metric name to `current - previous`.
pub type DeltaSet = BTreeMap<String, f64>;

/// Everything the report generator renders.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    /// Timestamp of the latest history entry, or the current time.
    pub last_updated: String,
    pub metrics: MetricsSnapshot,
    pub deltas: DeltaSet,
    pub status_distribution: BTreeMap<Status, usize>,
    pub applications_per_day: BTreeMap<NaiveDate, usize>,
    /// Number of snapshots in the history log.
    pub history_len: usize,
    /// Records sorted newest first.
    pub applications: Vec<ApplicationRecord>,
}
