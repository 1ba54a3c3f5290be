//! Derived views over the unified commit list.
//!
//! Both aggregations are plain counting passes into ordered maps, so output
//! iterates in ascending key order and repeated runs over the same input
//! produce identical results.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use std::collections::BTreeMap;

use crate::models::CommitRecord;

/// Commits per calendar day, keyed `YYYY-MM-DD`.
///
/// The day is taken in the timestamp's own offset; nothing is converted to
/// UTC or local time. A record whose datetime does not parse fails the whole
/// run rather than being skipped.
pub fn per_day_counts(records: &[CommitRecord]) -> Result<BTreeMap<String, u64>> {
    let mut counts = BTreeMap::new();

    for record in records {
        let day = commit_day(&record.datetime).with_context(|| {
            format!(
                "Unparsable commit datetime '{}' (commit {})",
                record.datetime, record.hash
            )
        })?;
        *counts.entry(day).or_insert(0) += 1;
    }

    Ok(counts)
}

/// Commits per repository full name.
///
/// Records without project attribution (`repo` absent) are skipped.
pub fn per_project_counts(records: &[CommitRecord]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();

    for record in records {
        if let Some(repo) = &record.repo {
            *counts.entry(repo.clone()).or_insert(0) += 1;
        }
    }

    counts
}

fn commit_day(datetime: &str) -> Result<String> {
    // Offset-bearing form first; both live strategies produce it.
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime) {
        return Ok(dt.date_naive().to_string());
    }

    // Offset-less ISO-8601, with or without fractional seconds.
    let naive = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M:%S%.f")
        .with_context(|| "expected an ISO-8601 timestamp")?;
    Ok(naive.date().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(datetime: &str, repo: Option<&str>) -> CommitRecord {
        CommitRecord {
            datetime: datetime.to_string(),
            hash: format!("hash-{}", datetime),
            public: true,
            repo: repo.map(str::to_string),
            message: Some("change".to_string()),
            link: None,
            additions: None,
            deletions: None,
        }
    }

    #[test]
    fn daily_and_project_counts_for_a_small_history() {
        let records = vec![
            rec("2024-01-01T10:00:00", Some("a")),
            rec("2024-01-01T23:00:00", Some("a")),
            rec("2024-01-02T01:00:00", Some("b")),
        ];

        let daily = per_day_counts(&records).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily["2024-01-01"], 2);
        assert_eq!(daily["2024-01-02"], 1);

        let projects = per_project_counts(&records);
        assert_eq!(projects["a"], 2);
        assert_eq!(projects["b"], 1);
    }

    #[test]
    fn day_is_truncated_in_the_embedded_offset() {
        // 23:30 at UTC-5 is already Jan 2 in UTC; the local date must win.
        let records = vec![
            rec("2024-01-01T23:30:00-05:00", None),
            rec("2024-01-01T10:00:00Z", None),
            rec("2024-01-01T10:00:00.123456", None),
        ];

        let daily = per_day_counts(&records).unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily["2024-01-01"], 3);
    }

    #[test]
    fn malformed_datetime_is_fatal_and_names_the_value() {
        let records = vec![
            rec("2024-01-01T10:00:00", Some("a")),
            rec("last tuesday", Some("a")),
        ];

        let err = per_day_counts(&records).unwrap_err();
        assert!(err.to_string().contains("last tuesday"));
    }

    #[test]
    fn daily_totals_cover_every_record() {
        let records = vec![
            rec("2024-02-01T08:00:00+01:00", Some("a")),
            rec("2024-02-01T09:00:00+01:00", Some("b")),
            rec("2024-02-03T10:00:00+01:00", None),
            rec("2024-02-11T11:00:00+01:00", Some("a")),
        ];

        let daily = per_day_counts(&records).unwrap();
        let total: u64 = daily.values().sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn unattributed_records_are_skipped_in_project_counts() {
        let records = vec![
            rec("2024-02-01T08:00:00", Some("a")),
            rec("2024-02-01T09:00:00", None),
            rec("2024-02-01T10:00:00", None),
        ];

        let projects = per_project_counts(&records);
        let total: u64 = projects.values().sum();
        assert_eq!(total, 1);
        assert!(!projects.contains_key(""));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = vec![
            rec("2024-03-05T12:00:00+02:00", Some("a")),
            rec("2024-03-06T12:00:00+02:00", Some("b")),
        ];

        assert_eq!(
            per_day_counts(&records).unwrap(),
            per_day_counts(&records).unwrap()
        );
        assert_eq!(per_project_counts(&records), per_project_counts(&records));
    }

    #[test]
    fn empty_input_yields_empty_maps() {
        assert!(per_day_counts(&[]).unwrap().is_empty());
        assert!(per_project_counts(&[]).is_empty());
    }
}
