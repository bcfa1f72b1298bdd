//! Type-aware stable sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{FieldKind, TableField, Tabular};
use crate::dates::parse_instant_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: F,
    pub direction: SortDirection,
}

enum SortKey {
    Instant(i64),
    Number(f64),
    Text(String),
}

impl SortKey {
    fn of<T: Tabular>(record: &T, field: T::Field) -> Self {
        let value = record.field_value(field);
        let raw = value.as_deref().unwrap_or("");
        match field.kind() {
            FieldKind::Date => SortKey::Instant(parse_instant_millis(raw).unwrap_or(0)),
            FieldKind::Numeric => {
                let n = raw.trim().parse::<f64>().unwrap_or(0.0);
                SortKey::Number(if n.is_finite() { n } else { 0.0 })
            }
            FieldKind::Text => SortKey::Text(raw.to_lowercase()),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Instant(a), SortKey::Instant(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Keys of one sort always share a kind.
            _ => Ordering::Equal,
        }
    }
}

/// Returns a sorted copy of `records`; the input is untouched.
///
/// The sort is stable in both directions, and descending is the exact
/// reverse of ascending's ordering, so rows with equal keys keep their
/// relative input order either way.
pub fn sort_records<T>(records: &[T], field: T::Field, direction: SortDirection) -> Vec<T>
where
    T: Tabular + Clone,
{
    let mut keyed: Vec<(SortKey, &T)> = records
        .iter()
        .map(|r| (SortKey::of(r, field), r))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ord = a.compare(b);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}
