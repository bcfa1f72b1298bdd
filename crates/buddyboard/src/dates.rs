//! Calendar-date helpers shared by the classifier and the table engine.
//!
//! Records store dates as date-only strings (`YYYY-MM-DD`), but values that
//! came through other clients may carry a time part. Everything here is total:
//! unparsable input yields `None` rather than an error.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

/// Today's date in the local time zone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a calendar date from a date-only or date-time string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    parse_naive_datetime(value).map(|dt| dt.date())
}

/// Parses an instant as milliseconds since the Unix epoch.
///
/// Date-only values resolve to midnight UTC.
pub fn parse_instant_millis(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    if let Some(dt) = parse_naive_datetime(value) {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Whole days from `today` to `date`. Negative when `date` is in the past.
///
/// Both sides are calendar dates, so daylight-saving shifts cannot skew
/// the result.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    date.signed_duration_since(today).num_days()
}

/// Formats a date as the `MM/YYYY` token used by month filters.
pub fn month_token(date: NaiveDate) -> String {
    format!("{:02}/{}", date.month(), date.year())
}

/// Parses an `MM/YYYY` token into `(year, month)`.
pub fn parse_month_token(token: &str) -> Option<(i32, u32)> {
    let (month, year) = token.split_once('/')?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}
