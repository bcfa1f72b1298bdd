//! Dashboard figures over leads.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::shift_month;
use crate::classifier::{is_upcoming, Classifiable, Stage};
use crate::dates::parse_date;
use crate::record::{Lead, LeadStatus};

/// Look-back window of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    All,
    Month,
    Quarter,
    Year,
}

impl Period {
    /// First day included, or `None` for no lower bound.
    pub fn start(self, today: NaiveDate) -> Option<NaiveDate> {
        let months = match self {
            Period::All => return None,
            Period::Month => 1,
            Period::Quarter => 3,
            Period::Year => 12,
        };
        today.checked_sub_months(Months::new(months))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_leads: usize,
    pub total_sales: f64,
    pub completed: usize,
    pub upcoming: usize,
    /// Percentage of leads cancelled, 0 to 100.
    pub cancellation_rate: f64,
    /// Percentage of leads completed, 0 to 100.
    pub completion_rate: f64,
    pub status_counts: BTreeMap<String, usize>,
}

fn in_period(lead: &Lead, from: Option<NaiveDate>) -> bool {
    match from {
        None => true,
        Some(from) => parse_date(&lead.service_start_date).is_some_and(|d| d >= from),
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

pub fn summarize(leads: &[Lead], today: NaiveDate, period: Period) -> Summary {
    let from = period.start(today);
    let selected: Vec<&Lead> = leads.iter().filter(|l| in_period(l, from)).collect();

    let mut status_counts = BTreeMap::new();
    for lead in &selected {
        *status_counts.entry(lead.status.to_string()).or_insert(0) += 1;
    }

    let total = selected.len();
    let completed = selected
        .iter()
        .filter(|l| l.status.stage() == Stage::Completed)
        .count();
    let cancelled = selected
        .iter()
        .filter(|l| l.status.stage() == Stage::Cancelled)
        .count();

    Summary {
        total_leads: total,
        total_sales: selected.iter().map(|l| l.total_price).sum(),
        completed,
        upcoming: selected.iter().filter(|l| is_upcoming(**l, today)).count(),
        cancellation_rate: percent(cancelled, total),
        completion_rate: percent(completed, total),
        status_counts,
    }
}

/// Revenue of completed leads per month for the 12 months ending with
/// `today`'s month, oldest first, keyed `YYYY-MM`.
pub fn monthly_revenue(leads: &[Lead], today: NaiveDate) -> Vec<(String, f64)> {
    let mut months: Vec<(i32, u32, f64)> = (-11..=0)
        .map(|delta| {
            let (year, month) = shift_month(today.year(), today.month(), delta);
            (year, month, 0.0)
        })
        .collect();

    for lead in leads.iter().filter(|l| l.status == LeadStatus::Completed) {
        let Some(date) = parse_date(&lead.service_start_date) else {
            continue;
        };
        if let Some(slot) = months
            .iter_mut()
            .find(|(y, m, _)| *y == date.year() && *m == date.month())
        {
            slot.2 += lead.total_price;
        }
    }

    months
        .into_iter()
        .map(|(year, month, total)| (format!("{}-{:02}", year, month), total))
        .collect()
}

/// Open leads starting between `today` and `today + days`, soonest first.
/// A negative `days` selects nothing; a window past the calendar's end is
/// open-ended.
pub fn upcoming_within(leads: &[Lead], today: NaiveDate, days: i64) -> Vec<Lead> {
    if days < 0 {
        return Vec::new();
    }
    let until = Duration::try_days(days)
        .and_then(|span| today.checked_add_signed(span))
        .unwrap_or(NaiveDate::MAX);
    let mut upcoming: Vec<(NaiveDate, &Lead)> = leads
        .iter()
        .filter(|l| l.stage() == Stage::Open)
        .filter_map(|l| parse_date(l.primary_date()).map(|d| (d, l)))
        .filter(|(d, _)| *d >= today && *d <= until)
        .collect();
    upcoming.sort_by_key(|(d, _)| *d);
    upcoming.into_iter().map(|(_, l)| l.clone()).collect()
}
