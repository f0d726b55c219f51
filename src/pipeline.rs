//! One load, aggregate, record and compare cycle.

use crate::analysis::{
    applications_per_day, compute_metrics, sort_by_date_desc, status_distribution,
};
use crate::config::{Config, CorruptHistoryPolicy};
use crate::history::{
    append_snapshot, compute_deltas, load_or_recover, now_timestamp, save_history,
};
use crate::loader::load_applications;
use crate::models::{ApplicationRecord, Dashboard, DeltaSet, History, MetricsSnapshot};
use anyhow::Result;
use tracing::{debug, info};

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub dashboard: Dashboard,
    /// Timestamp of the snapshot written by this run, if any.
    pub recorded_at: Option<String>,
}

/// Load records and history, compute metrics and deltas, and optionally
/// append the new snapshot to the history file.
pub fn run(config: &Config, record: bool) -> Result<RunOutcome> {
    let records = load_applications(&config.data.applications)?;
    info!(
        "Loaded {} applications from {}",
        records.len(),
        config.data.applications.display()
    );

    let metrics = compute_metrics(&records)?;
    debug!("Computed metrics: {:?}", metrics);

    let backup_corrupt = config.history.on_corrupt == CorruptHistoryPolicy::Backup;
    let history = load_or_recover(&config.data.history, backup_corrupt)?;
    if history.is_empty() {
        debug!(
            "No earlier snapshot in {}; changes are reported from the next run",
            config.data.history.display()
        );
    }

    let (history, deltas, recorded_at) = if record {
        let timestamp = now_timestamp();
        let history = append_snapshot(history, &metrics, timestamp.clone())?;
        save_history(&config.data.history, &history)?;
        info!(
            "Appended snapshot at {} to {} ({} entries)",
            timestamp,
            config.data.history.display(),
            history.len()
        );
        let deltas = history.latest_deltas().unwrap_or_default();
        (history, deltas, Some(timestamp))
    } else {
        let deltas = deltas_against_latest(&history, &metrics)?;
        (history, deltas, None)
    };

    let dashboard = build_dashboard(&config.report.title, &records, metrics, deltas, &history);

    Ok(RunOutcome {
        dashboard,
        recorded_at,
    })
}

/// Deltas of `metrics` against the newest history entry; empty when
/// there is no history yet.
pub fn deltas_against_latest(
    history: &History,
    metrics: &MetricsSnapshot,
) -> Result<DeltaSet, serde_json::Error> {
    match history.latest() {
        Some(entry) => Ok(compute_deltas(&metrics.to_map()?, &entry.metrics)),
        None => Ok(DeltaSet::new()),
    }
}

/// Assemble the report input from records, metrics and history.
pub fn build_dashboard(
    title: &str,
    records: &[ApplicationRecord],
    metrics: MetricsSnapshot,
    deltas: DeltaSet,
    history: &History,
) -> Dashboard {
    let last_updated = history
        .latest()
        .map(|entry| entry.timestamp.clone())
        .unwrap_or_else(now_timestamp);

    Dashboard {
        title: title.to_string(),
        last_updated,
        metrics,
        deltas,
        status_distribution: status_distribution(records),
        applications_per_day: applications_per_day(records),
        history_len: history.len(),
        applications: sort_by_date_desc(records),
    }
}
