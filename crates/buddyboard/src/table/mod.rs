//! Table state engine: search, column filters and sorting over record lists.
//!
//! Field access is typed. Each record type exposes a field-key enum
//! implementing [`TableField`], so an unknown column cannot be named.

use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;

pub mod filter;
pub mod sort;

pub use filter::{apply_filters, apply_search, unique_months, unique_values, ActiveFilters, FilterKey};
pub use sort::{sort_records, SortDirection, SortSpec};

/// How a column's values compare when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Compared as instants; unparsable values count as the epoch.
    Date,
    /// Compared numerically; unparsable values count as zero.
    Numeric,
    /// Compared case-insensitively.
    Text,
}

/// A typed column key.
pub trait TableField: Copy + Eq + Hash + Debug {
    fn kind(self) -> FieldKind;
    /// The stored key name, as it appears in documents.
    fn key(self) -> &'static str;
}

/// A record whose columns can be read by typed key.
pub trait Tabular {
    type Field: TableField;

    /// String form of a column, or `None` when it is absent or empty.
    fn field_value(&self, field: Self::Field) -> Option<Cow<'_, str>>;
}

/// The user-controlled view state of one table.
#[derive(Debug, Clone)]
pub struct TableState<F: TableField> {
    pub search_term: String,
    pub search_fields: Vec<F>,
    pub filters: ActiveFilters<F>,
    pub sort: Option<SortSpec<F>>,
}

impl<F: TableField> Default for TableState<F> {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            search_fields: Vec::new(),
            filters: ActiveFilters::new(),
            sort: None,
        }
    }
}

impl<F: TableField> TableState<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: &str, fields: &[F]) -> Self {
        self.search_term = term.to_string();
        self.search_fields = fields.to_vec();
        self
    }

    pub fn with_filter(mut self, key: FilterKey<F>, values: &[&str]) -> Self {
        self.filters.set(key, values.iter().map(|v| v.to_string()));
        self
    }

    pub fn with_sort(mut self, field: F, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec { field, direction });
        self
    }

    /// Header click: a new column sorts ascending, the active column flips.
    pub fn toggle_sort(&mut self, field: F) {
        self.sort = match self.sort {
            Some(current) if current.field == field => Some(SortSpec {
                field,
                direction: current.direction.reversed(),
            }),
            _ => Some(SortSpec {
                field,
                direction: SortDirection::Asc,
            }),
        };
    }

    /// Applies search, then column filters, then sorting.
    pub fn apply<T>(&self, records: &[T]) -> Vec<T>
    where
        T: Tabular<Field = F> + Clone,
    {
        let searched = apply_search(records, &self.search_term, &self.search_fields);
        let filtered = apply_filters(&searched, &self.filters);
        match self.sort {
            Some(sort) => sort_records(&filtered, sort.field, sort.direction),
            None => filtered,
        }
    }
}
