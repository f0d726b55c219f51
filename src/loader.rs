//! Application records loading and validation.
//!
//! Every record is checked eagerly: a missing field, an unknown status
//! or a bad value fails the whole load, so no snapshot is ever computed
//! from partially understood data.

use crate::error::DataFormatError;
use crate::models::{ApplicationRecord, Status};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Load and validate all records from a JSON file.
pub fn load_applications(path: &Path) -> Result<Vec<ApplicationRecord>, DataFormatError> {
    let content = std::fs::read_to_string(path).map_err(|source| DataFormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_applications(&content)?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse and validate records from a JSON string.
pub fn parse_applications(json: &str) -> Result<Vec<ApplicationRecord>, DataFormatError> {
    let raw: Vec<Value> =
        serde_json::from_str(json).map_err(|source| DataFormatError::Parse { source })?;

    raw.into_iter()
        .enumerate()
        .map(|(index, value)| parse_record(index, value))
        .collect()
}

fn parse_record(index: usize, value: Value) -> Result<ApplicationRecord, DataFormatError> {
    let Value::Object(ref object) = value else {
        return Err(DataFormatError::NotAnObject { index });
    };

    for field in ApplicationRecord::REQUIRED_FIELDS {
        if object.get(field).map_or(true, Value::is_null) {
            return Err(DataFormatError::MissingField { index, field });
        }
    }

    if let Some(status) = object.get("status") {
        if serde_json::from_value::<Status>(status.clone()).is_err() {
            return Err(DataFormatError::UnknownStatus {
                index,
                value: status.as_str().map_or_else(|| status.to_string(), str::to_string),
            });
        }
    }

    let record: ApplicationRecord = serde_json::from_value(value)
        .map_err(|source| DataFormatError::InvalidRecord { index, source })?;

    let hours = record.hours_saved_by_automation;
    if !hours.is_finite() || hours < 0.0 {
        return Err(DataFormatError::InvalidField {
            index,
            field: "hours_saved_by_automation",
            reason: format!("must be a non-negative number, got {}", hours),
        });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const VALID: &str = r#"[
        {
            "company": "Acme",
            "position": "Operator",
            "date_applied": "2024-03-01",
            "dm_sent": true,
            "follow_up_sent": false,
            "status": "interview",
            "hours_saved_by_automation": 1.5
        },
        {
            "company": "Globex",
            "position": "Analyst",
            "date_applied": "2024-03-02",
            "dm_sent": false,
            "follow_up_sent": true,
            "status": "applied",
            "hours_saved_by_automation": 0,
            "notes": "extra fields are ignored"
        }
    ]"#;

    fn record_json(overrides: &[(&str, Value)], remove: &[&str]) -> String {
        let mut object = serde_json::json!({
            "company": "Acme",
            "position": "Operator",
            "date_applied": "2024-03-01",
            "dm_sent": false,
            "follow_up_sent": false,
            "status": "applied",
            "hours_saved_by_automation": 1.0
        });
        let map = object.as_object_mut().unwrap();
        for (key, value) in overrides {
            map.insert(key.to_string(), value.clone());
        }
        for key in remove {
            map.remove(*key);
        }
        Value::Array(vec![object]).to_string()
    }

    #[test]
    fn test_parse_valid_records() {
        let records = parse_applications(VALID).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].company, "Acme");
        assert_eq!(records[0].status, Status::Interview);
        assert_eq!(
            records[0].date_applied,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(records[1].follow_up_sent);
        assert_eq!(records[1].hours_saved_by_automation, 0.0);
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(parse_applications("[]").unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_reports_name() {
        let json = record_json(&[], &["hours_saved_by_automation"]);
        let err = parse_applications(&json).unwrap_err();

        assert!(matches!(
            err,
            DataFormatError::MissingField {
                index: 0,
                field: "hours_saved_by_automation"
            }
        ));
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let json = record_json(&[("status", Value::Null)], &[]);
        let err = parse_applications(&json).unwrap_err();

        assert!(matches!(
            err,
            DataFormatError::MissingField { field: "status", .. }
        ));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let json = record_json(&[("status", Value::from("ghosted"))], &[]);
        let err = parse_applications(&json).unwrap_err();

        match err {
            DataFormatError::UnknownStatus { index, value } => {
                assert_eq!(index, 0);
                assert_eq!(value, "ghosted");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_hours_rejected() {
        let json = record_json(&[("hours_saved_by_automation", Value::from(-2.0))], &[]);
        let err = parse_applications(&json).unwrap_err();

        assert!(matches!(
            err,
            DataFormatError::InvalidField {
                field: "hours_saved_by_automation",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_date_rejected() {
        let json = record_json(&[("date_applied", Value::from("03/01/2024"))], &[]);
        let err = parse_applications(&json).unwrap_err();

        assert!(matches!(err, DataFormatError::InvalidRecord { index: 0, .. }));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let json = record_json(&[("dm_sent", Value::from("yes"))], &[]);
        let err = parse_applications(&json).unwrap_err();

        match err {
            DataFormatError::InvalidRecord { index, source } => {
                assert_eq!(index, 0);
                assert!(source.to_string().contains("expected a boolean"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_object_and_non_list() {
        assert!(matches!(
            parse_applications("[1]").unwrap_err(),
            DataFormatError::NotAnObject { index: 0 }
        ));
        assert!(matches!(
            parse_applications("{}").unwrap_err(),
            DataFormatError::Parse { .. }
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("applications.json");
        std::fs::write(&path, VALID).unwrap();

        let records = load_applications(&path).unwrap();
        assert_eq!(records.len(), 2);

        let missing = dir.path().join("nope.json");
        assert!(matches!(
            load_applications(&missing).unwrap_err(),
            DataFormatError::Io { .. }
        ));
    }
}
