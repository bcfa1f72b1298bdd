//! Record classifier: derives view buckets from record state and today's date.
//!
//! Bucket membership is never stored. Every function here is a pure function
//! of `(stage, primary date, secondary date, today)` and is re-evaluated on
//! each read, so views stay correct across day boundaries.
//!
//! Malformed dates never make a record fail classification; they only exclude
//! it from the date-derived part of a predicate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{days_until, parse_date};

/// Number of days ahead of the service start at which a lead needs a reminder.
pub const DEFAULT_REMINDER_LEAD_DAYS: i64 = 3;

/// The lifecycle stage a status value maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Open,
    Completed,
    Cancelled,
}

/// A record the classifier can bucket.
pub trait Classifiable {
    /// Start of the validity or service window, as stored.
    fn primary_date(&self) -> &str;
    /// End of the validity or service window, as stored.
    fn secondary_date(&self) -> &str;
    /// Lifecycle stage of the current status.
    fn stage(&self) -> Stage;
}

/// A named, derived subset of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Upcoming,
    Archived,
    Completed,
    NeedsReminder,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Upcoming,
        Bucket::Archived,
        Bucket::Completed,
        Bucket::NeedsReminder,
    ];

    /// Whether `record` belongs to this bucket on `today`.
    pub fn contains<T: Classifiable>(self, record: &T, today: NaiveDate) -> bool {
        match self {
            Bucket::Upcoming => is_upcoming(record, today),
            Bucket::Archived => is_archived(record, today),
            Bucket::Completed => is_completed(record, today),
            Bucket::NeedsReminder => {
                is_due_in(record, today, DEFAULT_REMINDER_LEAD_DAYS)
            }
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::Upcoming => write!(f, "Upcoming"),
            Bucket::Archived => write!(f, "Archived"),
            Bucket::Completed => write!(f, "Completed"),
            Bucket::NeedsReminder => write!(f, "Needs reminder"),
        }
    }
}

fn primary<T: Classifiable>(record: &T) -> Option<NaiveDate> {
    parse_date(record.primary_date())
}

fn secondary<T: Classifiable>(record: &T) -> Option<NaiveDate> {
    parse_date(record.secondary_date())
}

/// Starts today or later and is neither completed nor cancelled.
pub fn is_upcoming<T: Classifiable>(record: &T, today: NaiveDate) -> bool {
    record.stage() == Stage::Open && primary(record).is_some_and(|d| d >= today)
}

/// Explicitly cancelled, or its window ended before today without completion.
pub fn is_archived<T: Classifiable>(record: &T, today: NaiveDate) -> bool {
    match record.stage() {
        Stage::Cancelled => true,
        Stage::Completed => false,
        Stage::Open => secondary(record).is_some_and(|d| d < today),
    }
}

/// Explicitly completed, or it started before today without cancellation.
///
/// Overlaps with [`is_archived`] for open records whose whole window lies in
/// the past; both predicates hold for such records.
pub fn is_completed<T: Classifiable>(record: &T, today: NaiveDate) -> bool {
    match record.stage() {
        Stage::Completed => true,
        Stage::Cancelled => false,
        Stage::Open => primary(record).is_some_and(|d| d < today),
    }
}

/// Starts exactly `lead_days` after today and is still open.
pub fn is_due_in<T: Classifiable>(record: &T, today: NaiveDate, lead_days: i64) -> bool {
    record.stage() == Stage::Open
        && primary(record).is_some_and(|d| days_until(d, today) == lead_days)
}

/// Every bucket `record` belongs to on `today`.
pub fn buckets_of<T: Classifiable>(record: &T, today: NaiveDate) -> Vec<Bucket> {
    Bucket::ALL
        .into_iter()
        .filter(|b| b.contains(record, today))
        .collect()
}

/// Records of `bucket`, in input order.
pub fn classify<T: Classifiable + Clone>(
    records: &[T],
    bucket: Bucket,
    today: NaiveDate,
) -> Vec<T> {
    records
        .iter()
        .filter(|r| bucket.contains(*r, today))
        .cloned()
        .collect()
}

pub fn classify_upcoming<T: Classifiable + Clone>(records: &[T], today: NaiveDate) -> Vec<T> {
    classify(records, Bucket::Upcoming, today)
}

pub fn classify_archived<T: Classifiable + Clone>(records: &[T], today: NaiveDate) -> Vec<T> {
    classify(records, Bucket::Archived, today)
}

pub fn classify_completed<T: Classifiable + Clone>(records: &[T], today: NaiveDate) -> Vec<T> {
    classify(records, Bucket::Completed, today)
}

pub fn classify_needs_reminder<T: Classifiable + Clone>(
    records: &[T],
    today: NaiveDate,
) -> Vec<T> {
    classify_due_in(records, today, DEFAULT_REMINDER_LEAD_DAYS)
}

/// Like [`classify_needs_reminder`] with a configurable lead time.
pub fn classify_due_in<T: Classifiable + Clone>(
    records: &[T],
    today: NaiveDate,
    lead_days: i64,
) -> Vec<T> {
    records
        .iter()
        .filter(|r| is_due_in(*r, today, lead_days))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: &'static str,
        start: &'static str,
        end: &'static str,
        stage: Stage,
    }

    impl Classifiable for Item {
        fn primary_date(&self) -> &str {
            self.start
        }
        fn secondary_date(&self) -> &str {
            self.end
        }
        fn stage(&self) -> Stage {
            self.stage
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn item(id: &'static str, start: &'static str, end: &'static str, stage: Stage) -> Item {
        Item { id, start, end, stage }
    }

    fn ids(items: Vec<Item>) -> Vec<&'static str> {
        items.into_iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_upcoming_includes_today_and_excludes_closed() {
        let items = vec![
            item("today", "2026-10-19", "2026-10-20", Stage::Open),
            item("future", "2026-11-01", "2026-11-02", Stage::Open),
            item("past", "2026-10-18", "2026-10-25", Stage::Open),
            item("done", "2026-11-01", "2026-11-02", Stage::Completed),
            item("cancelled", "2026-11-01", "2026-11-02", Stage::Cancelled),
        ];
        assert_eq!(ids(classify_upcoming(&items, today())), vec!["today", "future"]);
    }

    #[test]
    fn test_archived_by_cancellation_or_expiry() {
        let items = vec![
            item("cancelled-future", "2026-11-01", "2026-11-02", Stage::Cancelled),
            item("expired", "2026-10-01", "2026-10-18", Stage::Open),
            item("ends-today", "2026-10-01", "2026-10-19", Stage::Open),
            item("expired-but-done", "2026-10-01", "2026-10-18", Stage::Completed),
        ];
        assert_eq!(
            ids(classify_archived(&items, today())),
            vec!["cancelled-future", "expired"]
        );
    }

    #[test]
    fn test_completed_by_status_or_start_in_past() {
        let items = vec![
            item("done-future", "2026-11-01", "2026-11-02", Stage::Completed),
            item("started", "2026-10-18", "2026-10-25", Stage::Open),
            item("cancelled-past", "2026-10-01", "2026-10-02", Stage::Cancelled),
            item("future", "2026-10-20", "2026-10-21", Stage::Open),
        ];
        assert_eq!(
            ids(classify_completed(&items, today())),
            vec!["done-future", "started"]
        );
    }

    #[test]
    fn test_past_open_record_is_both_archived_and_completed() {
        let past = item("past", "2026-10-01", "2026-10-05", Stage::Open);
        assert_eq!(
            buckets_of(&past, today()),
            vec![Bucket::Archived, Bucket::Completed]
        );
    }

    #[test]
    fn test_every_record_lands_somewhere() {
        let items = vec![
            item("a", "2026-10-19", "2026-10-19", Stage::Open),
            item("b", "2026-10-10", "2026-10-25", Stage::Open),
            item("c", "2026-10-01", "2026-10-05", Stage::Open),
            item("d", "2026-12-01", "2026-12-05", Stage::Completed),
            item("e", "2026-12-01", "2026-12-05", Stage::Cancelled),
        ];
        for it in &items {
            let buckets: Vec<Bucket> = buckets_of(it, today())
                .into_iter()
                .filter(|b| *b != Bucket::NeedsReminder)
                .collect();
            assert!(!buckets.is_empty(), "{} has no bucket", it.id);
        }
    }

    #[test]
    fn test_reminder_window_is_exact() {
        let items = vec![
            item("plus2", "2026-10-21", "2026-10-22", Stage::Open),
            item("plus3", "2026-10-22", "2026-10-23", Stage::Open),
            item("plus4", "2026-10-23", "2026-10-24", Stage::Open),
            item("plus3-done", "2026-10-22", "2026-10-23", Stage::Completed),
            item("plus3-cancelled", "2026-10-22", "2026-10-23", Stage::Cancelled),
        ];
        assert_eq!(ids(classify_needs_reminder(&items, today())), vec!["plus3"]);
        assert_eq!(ids(classify_due_in(&items, today(), 2)), vec!["plus2"]);
    }

    #[test]
    fn test_malformed_dates_are_excluded_not_fatal() {
        let items = vec![
            item("bad", "soon", "later", Stage::Open),
            item("empty", "", "", Stage::Open),
            item("bad-cancelled", "??", "??", Stage::Cancelled),
        ];
        assert!(classify_upcoming(&items, today()).is_empty());
        assert!(classify_completed(&items, today()).is_empty());
        assert!(classify_needs_reminder(&items, today()).is_empty());
        assert_eq!(ids(classify_archived(&items, today())), vec!["bad-cancelled"]);
    }

    #[test]
    fn test_membership_follows_today() {
        let it = item("x", "2026-10-22", "2026-10-24", Stage::Open);
        let later = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
        assert_eq!(buckets_of(&it, today()), vec![Bucket::Upcoming, Bucket::NeedsReminder]);
        assert_eq!(buckets_of(&it, later), vec![Bucket::Archived, Bucket::Completed]);
    }
}
