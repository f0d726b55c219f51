//! Metric aggregation over application records.
//!
//! This module turns a set of records into a flat metrics snapshot plus
//! the breakdowns used by the report. Nothing here performs I/O.

use crate::error::DataFormatError;
use crate::models::{ApplicationRecord, MetricsSnapshot, Status};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Compute the aggregate metrics for a record set.
///
/// Rates whose denominator is zero are reported as 0. Fails if the hours
/// total overflows to a non-finite number.
pub fn compute_metrics(records: &[ApplicationRecord]) -> Result<MetricsSnapshot, DataFormatError> {
    let total_applications = records.len() as u64;
    let interviews = count_where(records, |r| r.status == Status::Interview);
    let offers = count_where(records, |r| r.status == Status::Offer);

    let hours_saved: f64 = records.iter().map(|r| r.hours_saved_by_automation).sum();
    if !hours_saved.is_finite() {
        return Err(DataFormatError::HoursOverflow);
    }

    Ok(MetricsSnapshot {
        total_applications,
        interviews,
        offers,
        dms_sent: count_where(records, |r| r.dm_sent),
        follow_ups_sent: count_where(records, |r| r.follow_up_sent),
        interview_rate: percentage(interviews, total_applications),
        offer_rate: percentage(offers, total_applications),
        offer_to_interview_rate: percentage(offers, interviews),
        hours_saved,
    })
}

fn count_where(records: &[ApplicationRecord], pred: impl Fn(&ApplicationRecord) -> bool) -> u64 {
    records.iter().filter(|r| pred(r)).count() as u64
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Count records by status. Statuses with no records are omitted.
pub fn status_distribution(records: &[ApplicationRecord]) -> BTreeMap<Status, usize> {
    let mut dist: BTreeMap<Status, usize> = BTreeMap::new();

    for record in records {
        *dist.entry(record.status).or_default() += 1;
    }

    dist
}

/// Count records per application date.
pub fn applications_per_day(records: &[ApplicationRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for record in records {
        *per_day.entry(record.date_applied).or_default() += 1;
    }

    per_day
}

/// Records sorted newest first; records on the same day keep their order.
pub fn sort_by_date_desc(records: &[ApplicationRecord]) -> Vec<ApplicationRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.date_applied.cmp(&a.date_applied));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(status: Status, day: u32) -> ApplicationRecord {
        ApplicationRecord {
            company: format!("Company {}", day),
            position: "Operator".to_string(),
            date_applied: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            dm_sent: false,
            follow_up_sent: false,
            status,
            hours_saved_by_automation: 0.0,
        }
    }

    fn assert_rates_in_range(snapshot: &MetricsSnapshot) {
        for rate in [snapshot.interview_rate, snapshot.offer_rate] {
            assert!((0.0..=100.0).contains(&rate), "rate out of range: {}", rate);
        }
        assert!(snapshot.offer_to_interview_rate >= 0.0);
    }

    #[test]
    fn test_empty_records() {
        let metrics = compute_metrics(&[]).unwrap();

        assert_eq!(metrics.total_applications, 0);
        assert_eq!(metrics.interview_rate, 0.0);
        assert_eq!(metrics.offer_rate, 0.0);
        assert_eq!(metrics.offer_to_interview_rate, 0.0);
        assert_eq!(metrics.hours_saved, 0.0);
    }

    #[test]
    fn test_single_applied_record() {
        let mut record = create_test_record(Status::Applied, 1);
        record.dm_sent = true;
        record.hours_saved_by_automation = 1.0;

        let metrics = compute_metrics(&[record]).unwrap();

        assert_eq!(metrics.total_applications, 1);
        assert_eq!(metrics.interviews, 0);
        assert_eq!(metrics.offers, 0);
        assert_eq!(metrics.interview_rate, 0.0);
        assert_eq!(metrics.offer_rate, 0.0);
        assert_eq!(metrics.offer_to_interview_rate, 0.0);
        assert_eq!(metrics.dms_sent, 1);
        assert_eq!(metrics.follow_ups_sent, 0);
        assert_eq!(metrics.hours_saved, 1.0);
    }

    #[test]
    fn test_interview_and_offer() {
        let records = vec![
            create_test_record(Status::Interview, 1),
            create_test_record(Status::Offer, 2),
        ];

        let metrics = compute_metrics(&records).unwrap();

        assert_eq!(metrics.total_applications, 2);
        assert_eq!(metrics.interviews, 1);
        assert_eq!(metrics.offers, 1);
        assert_eq!(metrics.interview_rate, 50.0);
        assert_eq!(metrics.offer_rate, 50.0);
        assert_eq!(metrics.offer_to_interview_rate, 100.0);
        assert_eq!(metrics.dms_sent, 0);
        assert_eq!(metrics.follow_ups_sent, 0);
    }

    #[test]
    fn test_offer_without_interview_stays_zero() {
        let metrics = compute_metrics(&[create_test_record(Status::Offer, 1)]).unwrap();

        assert_eq!(metrics.offer_rate, 100.0);
        assert_eq!(metrics.offer_to_interview_rate, 0.0);
    }

    #[test]
    fn test_more_offers_than_interviews() {
        let records = vec![
            create_test_record(Status::Offer, 1),
            create_test_record(Status::Offer, 2),
            create_test_record(Status::Interview, 3),
        ];

        let metrics = compute_metrics(&records).unwrap();

        assert_eq!(metrics.offers, 2);
        assert_eq!(metrics.interviews, 1);
        assert_eq!(metrics.offer_to_interview_rate, 200.0);
    }

    #[test]
    fn test_hours_overflow_is_rejected() {
        let mut first = create_test_record(Status::Applied, 1);
        let mut second = create_test_record(Status::Applied, 2);
        first.hours_saved_by_automation = 1e308;
        second.hours_saved_by_automation = 1e308;

        let err = compute_metrics(&[first, second]).unwrap_err();

        assert!(matches!(err, DataFormatError::HoursOverflow));
    }

    #[test]
    fn test_rates_stay_within_bounds() {
        let cases = vec![
            vec![Status::Offer, Status::Offer, Status::Interview],
            vec![Status::Rejected, Status::Applied],
            vec![Status::Interview; 5],
            vec![Status::Offer, Status::Interview, Status::Rejected, Status::Applied],
        ];

        for statuses in cases {
            let records: Vec<_> = statuses
                .into_iter()
                .enumerate()
                .map(|(i, s)| create_test_record(s, i as u32 + 1))
                .collect();
            assert_rates_in_range(&compute_metrics(&records).unwrap());
        }
    }

    #[test]
    fn test_compute_metrics_is_deterministic() {
        let mut records = vec![
            create_test_record(Status::Interview, 1),
            create_test_record(Status::Applied, 2),
            create_test_record(Status::Offer, 3),
        ];
        records[0].hours_saved_by_automation = 0.1;
        records[1].hours_saved_by_automation = 0.2;
        records[2].follow_up_sent = true;

        let first = compute_metrics(&records).unwrap();
        let second = compute_metrics(&records).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.hours_saved.to_bits(), second.hours_saved.to_bits());
        assert_eq!(first.follow_ups_sent, 1);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn test_status_distribution() {
        let records = vec![
            create_test_record(Status::Applied, 1),
            create_test_record(Status::Applied, 2),
            create_test_record(Status::Rejected, 3),
        ];

        let dist = status_distribution(&records);

        assert_eq!(dist.get(&Status::Applied), Some(&2));
        assert_eq!(dist.get(&Status::Rejected), Some(&1));
        assert_eq!(dist.get(&Status::Offer), None);
    }

    #[test]
    fn test_applications_per_day() {
        let records = vec![
            create_test_record(Status::Applied, 2),
            create_test_record(Status::Applied, 1),
            create_test_record(Status::Interview, 2),
        ];

        let per_day = applications_per_day(&records);
        let days: Vec<_> = per_day.iter().map(|(d, c)| (d.to_string(), *c)).collect();

        assert_eq!(
            days,
            vec![("2024-05-01".to_string(), 1), ("2024-05-02".to_string(), 2)]
        );
    }

    #[test]
    fn test_sort_by_date_desc() {
        let records = vec![
            create_test_record(Status::Applied, 1),
            create_test_record(Status::Offer, 3),
            create_test_record(Status::Interview, 2),
        ];

        let sorted = sort_by_date_desc(&records);

        assert_eq!(sorted[0].status, Status::Offer);
        assert_eq!(sorted[1].status, Status::Interview);
        assert_eq!(sorted[2].status, Status::Applied);
    }
}
