//! Column filters, free-text search and filter-option extraction.

use std::collections::{BTreeSet, HashMap};

use chrono::Datelike;

use super::{TableField, Tabular};
use crate::dates::{month_token, parse_date};

/// What a filter constrains: a column's raw value, or the `MM/YYYY` month of
/// a date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey<F> {
    Value(F),
    Month(F),
}

/// Per-column sets of allowed values. A column with no entry, or with an
/// empty set, does not constrain anything.
#[derive(Debug, Clone)]
pub struct ActiveFilters<F: TableField> {
    allowed: HashMap<FilterKey<F>, BTreeSet<String>>,
}

impl<F: TableField> Default for ActiveFilters<F> {
    fn default() -> Self {
        Self {
            allowed: HashMap::new(),
        }
    }
}

impl<F: TableField> ActiveFilters<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the allowed set for `key`.
    pub fn set<I>(&mut self, key: FilterKey<F>, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.allowed.insert(key, values.into_iter().collect());
    }

    /// Adds `value` to the allowed set, or removes it if already present.
    pub fn toggle(&mut self, key: FilterKey<F>, value: &str) {
        let set = self.allowed.entry(key).or_default();
        if !set.remove(value) {
            set.insert(value.to_string());
        }
    }

    pub fn clear(&mut self, key: FilterKey<F>) {
        self.allowed.remove(&key);
    }

    pub fn clear_all(&mut self) {
        self.allowed.clear();
    }

    pub fn allowed(&self, key: FilterKey<F>) -> Option<&BTreeSet<String>> {
        self.allowed.get(&key)
    }

    /// True when no column is constrained.
    pub fn is_empty(&self) -> bool {
        self.allowed.values().all(|set| set.is_empty())
    }

    fn admits<T: Tabular<Field = F>>(&self, record: &T) -> bool {
        self.allowed
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .all(|(key, values)| match *key {
                FilterKey::Value(field) => {
                    let value = record.field_value(field).unwrap_or_default();
                    values.contains(&*value)
                }
                FilterKey::Month(field) => record
                    .field_value(field)
                    .and_then(|v| parse_date(&v))
                    .is_some_and(|d| values.contains(&month_token(d))),
            })
    }
}

/// Distinct non-empty values of `field`, sorted lexically.
pub fn unique_values<T: Tabular>(records: &[T], field: T::Field) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.field_value(field))
        .map(|v| v.into_owned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Distinct `MM/YYYY` months of a date field, newest first.
///
/// Values that do not parse as dates are skipped.
pub fn unique_months<T: Tabular>(records: &[T], field: T::Field) -> Vec<String> {
    let months: BTreeSet<(i32, u32)> = records
        .iter()
        .filter_map(|r| r.field_value(field))
        .filter_map(|v| parse_date(&v))
        .map(|d| (d.year(), d.month()))
        .collect();

    months
        .into_iter()
        .rev()
        .map(|(year, month)| format!("{:02}/{}", month, year))
        .collect()
}

/// Keeps the records admitted by every active column filter, in input order.
pub fn apply_filters<T>(records: &[T], filters: &ActiveFilters<T::Field>) -> Vec<T>
where
    T: Tabular + Clone,
{
    if filters.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| filters.admits(*r))
        .cloned()
        .collect()
}

/// Case-insensitive substring search across `fields`; a blank term keeps all.
pub fn apply_search<T>(records: &[T], term: &str, fields: &[T::Field]) -> Vec<T>
where
    T: Tabular + Clone,
{
    let term = term.trim();
    if term.is_empty() {
        return records.to_vec();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|r| {
            fields.iter().any(|f| {
                r.field_value(*f)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            })
        })
        .cloned()
        .collect()
}
