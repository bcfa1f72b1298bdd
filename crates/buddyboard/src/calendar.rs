//! Month grid and per-day grouping for the calendar view.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::classifier::Classifiable;
use crate::dates::parse_date;

/// One week row of the grid, Sunday first. `None` pads days outside the month.
pub type Week = [Option<NaiveDate>; 7];

/// The weeks covering `year`/`month`, or `None` for an invalid month.
pub fn month_grid(year: i32, month: u32) -> Option<Vec<Week>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = days_in_month(year, month)?;
    let offset = first.weekday().num_days_from_sunday() as usize;

    let mut cells: Vec<Option<NaiveDate>> = vec![None; offset];
    cells.extend((1..=days).map(|day| NaiveDate::from_ymd_opt(year, month, day)));
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    Some(
        cells
            .chunks(7)
            .map(|chunk| {
                let mut week: Week = [None; 7];
                week.copy_from_slice(chunk);
                week
            })
            .collect(),
    )
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = shift_month(year, month, 1);
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Moves `delta` months forward (or back when negative). Years saturate at
/// the `i32` range.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(delta);
    let year = index
        .div_euclid(12)
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    (year, index.rem_euclid(12) as u32 + 1)
}

/// Groups records by their primary date. Records whose date does not parse
/// are left out; input order is kept within a day.
pub fn group_by_day<T: Classifiable + Clone>(records: &[T]) -> BTreeMap<NaiveDate, Vec<T>> {
    let mut days: BTreeMap<NaiveDate, Vec<T>> = BTreeMap::new();
    for record in records {
        if let Some(date) = parse_date(record.primary_date()) {
            days.entry(date).or_default().push(record.clone());
        }
    }
    days
}

/// Records starting on a day of `year`/`month`, grouped by day.
pub fn month_events<T: Classifiable + Clone>(
    records: &[T],
    year: i32,
    month: u32,
) -> BTreeMap<NaiveDate, Vec<T>> {
    let mut days = group_by_day(records);
    days.retain(|date, _| date.year() == year && date.month() == month);
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Stage;

    #[derive(Debug, Clone, PartialEq)]
    struct Event(&'static str, &'static str);

    impl Classifiable for Event {
        fn primary_date(&self) -> &str {
            self.1
        }
        fn secondary_date(&self) -> &str {
            self.1
        }
        fn stage(&self) -> Stage {
            Stage::Open
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_october_2026_grid() {
        // 1 October 2026 is a Thursday.
        let grid = month_grid(2026, 10).unwrap();
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0][..4], [None, None, None, None]);
        assert_eq!(grid[0][4], Some(date(2026, 10, 1)));
        assert_eq!(grid[4][6], Some(date(2026, 10, 31)));
        let filled = grid.iter().flatten().filter(|c| c.is_some()).count();
        assert_eq!(filled, 31);
    }

    #[test]
    fn test_february_grid_and_invalid_month() {
        // February 2026 starts on a Sunday and fills exactly four weeks.
        let grid = month_grid(2026, 2).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0][0], Some(date(2026, 2, 1)));
        assert!(month_grid(2026, 13).is_none());
        assert_eq!(days_in_month(2028, 2), Some(29));
    }

    #[test]
    fn test_shift_month_wraps_years() {
        assert_eq!(shift_month(2026, 12, 1), (2027, 1));
        assert_eq!(shift_month(2026, 1, -1), (2025, 12));
        assert_eq!(shift_month(2026, 10, -22), (2024, 12));
        assert_eq!(shift_month(2026, 10, 0), (2026, 10));
        assert_eq!(shift_month(i32::MAX, 12, i32::MAX).0, i32::MAX);
        assert_eq!(shift_month(i32::MIN, 1, i32::MIN).0, i32::MIN);
        assert_eq!(days_in_month(i32::MAX, 12), None);
    }

    #[test]
    fn test_group_by_day_skips_bad_dates() {
        let events = vec![
            Event("a", "2026-10-20"),
            Event("b", "2026-10-19"),
            Event("c", "2026-10-20"),
            Event("d", "TBD"),
            Event("e", "2026-11-02"),
        ];
        let days = group_by_day(&events);
        assert_eq!(days.len(), 3);
        assert_eq!(days[&date(2026, 10, 20)], vec![events[0].clone(), events[2].clone()]);

        let october = month_events(&events, 2026, 10);
        assert_eq!(october.len(), 2);
        assert!(!october.contains_key(&date(2026, 11, 2)));
    }
}
