//! Markdown and JSON report generation.
//!
//! This module renders a [`Dashboard`] into a static report: KPI table
//! with deltas against the previous run, outcome distribution,
//! applications over time and the raw records.

use crate::analysis::percentage;
use crate::config::ReportConfig;
use crate::models::{ApplicationRecord, Dashboard, DeltaSet, MetricsSnapshot};
use anyhow::{Context, Result};
use std::path::Path;

/// How a KPI value and its delta are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Count,
    Hours,
    Percent,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(dashboard: &Dashboard, options: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", dashboard.title));
    output.push_str(&format!("**Last updated:** {}\n\n", dashboard.last_updated));

    output.push_str(&generate_kpi_section(&dashboard.metrics, &dashboard.deltas));
    output.push_str(&generate_distribution_section(dashboard));

    if options.include_timeline {
        output.push_str(&generate_timeline_section(dashboard));
    }

    if options.include_raw_data {
        output.push_str(&generate_raw_data_section(
            &dashboard.applications,
            options.max_raw_rows,
        ));
    }

    output.push_str(&generate_footer(dashboard.history_len));

    output
}

/// Generate the KPI table.
fn generate_kpi_section(metrics: &MetricsSnapshot, deltas: &DeltaSet) -> String {
    let rows: [(&str, &str, f64, Unit); 9] = [
        (
            "Applications Sent",
            "total_applications",
            metrics.total_applications as f64,
            Unit::Count,
        ),
        ("Interviews", "interviews", metrics.interviews as f64, Unit::Count),
        ("Offers", "offers", metrics.offers as f64, Unit::Count),
        ("DMs Sent", "dms_sent", metrics.dms_sent as f64, Unit::Count),
        (
            "Follow-ups Sent",
            "follow_ups_sent",
            metrics.follow_ups_sent as f64,
            Unit::Count,
        ),
        (
            "Hours Saved by Automation",
            "hours_saved",
            metrics.hours_saved,
            Unit::Hours,
        ),
        (
            "Interview Rate",
            "interview_rate",
            metrics.interview_rate,
            Unit::Percent,
        ),
        ("Offer Rate", "offer_rate", metrics.offer_rate, Unit::Percent),
        (
            "Offer/Interview Rate",
            "offer_to_interview_rate",
            metrics.offer_to_interview_rate,
            Unit::Percent,
        ),
    ];

    let mut section = String::new();

    section.push_str("## Key Metrics\n\n");
    section.push_str("| Metric | Value | Change |\n");
    section.push_str("|:---|---:|---:|\n");

    for (label, key, value, unit) in rows {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            label,
            format_value(value, unit),
            format_delta(deltas.get(key).copied(), unit)
        ));
    }
    section.push('\n');

    section
}

fn format_value(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Count => format!("{}", value),
        Unit::Hours => format!("{:.1}", value),
        Unit::Percent => format!("{:.1}%", value),
    }
}

/// Signed delta; a metric with no previous value shows as unchanged.
fn format_delta(delta: Option<f64>, unit: Unit) -> String {
    let Some(delta) = delta else {
        return match unit {
            Unit::Percent => "0%".to_string(),
            _ => "0".to_string(),
        };
    };

    match unit {
        Unit::Count => format!("{:+}", delta),
        Unit::Hours => format!("{:+.1}", delta),
        Unit::Percent => format!("{:+.1}%", delta),
    }
}

/// Generate the outcome distribution table.
fn generate_distribution_section(dashboard: &Dashboard) -> String {
    let mut section = String::new();

    section.push_str("## Application Outcome Distribution\n\n");

    if dashboard.status_distribution.is_empty() {
        section.push_str("No applications recorded yet.\n\n");
        return section;
    }

    section.push_str("| Status | Count | Share |\n");
    section.push_str("|:---|---:|---:|\n");

    let total = dashboard.metrics.total_applications;
    let mut statuses: Vec<_> = dashboard.status_distribution.iter().collect();
    statuses.sort_by_key(|(_, count)| std::cmp::Reverse(**count));

    for (status, count) in statuses {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            status,
            count,
            percentage(*count as u64, total)
        ));
    }
    section.push('\n');

    section
}

/// Generate the applications-over-time table.
fn generate_timeline_section(dashboard: &Dashboard) -> String {
    if dashboard.applications_per_day.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Applications Over Time\n\n");
    section.push_str("| Date Applied | Applications |\n");
    section.push_str("|:---|---:|\n");

    for (date, count) in &dashboard.applications_per_day {
        section.push_str(&format!("| {} | {} |\n", date.format("%Y-%m-%d"), count));
    }
    section.push('\n');

    section
}

/// Generate the raw records table, newest first.
fn generate_raw_data_section(records: &[ApplicationRecord], max_rows: usize) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Raw Application Data\n\n");
    section.push_str("| Date Applied | Company | Position | Status | DM | Follow-up | Hours Saved |\n");
    section.push_str("|:---|:---|:---|:---|:---:|:---:|---:|\n");

    let shown = if max_rows == 0 {
        records.len()
    } else {
        max_rows.min(records.len())
    };

    for record in &records[..shown] {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {:.1} |\n",
            record.date_applied.format("%Y-%m-%d"),
            escape_cell(&record.company),
            escape_cell(&record.position),
            record.status,
            yes_no(record.dm_sent),
            yes_no(record.follow_up_sent),
            record.hours_saved_by_automation
        ));
    }

    if shown < records.len() {
        section.push_str(&format!(
            "\n*Showing {} of {} applications.*\n",
            shown,
            records.len()
        ));
    }
    section.push('\n');

    section
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Generate the report footer.
fn generate_footer(history_len: usize) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Generated by opsmetrics v{} from {} recorded snapshot(s).*\n",
        env!("CARGO_PKG_VERSION"),
        history_len
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

/// Write a rendered report to a file, creating parent directories.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
