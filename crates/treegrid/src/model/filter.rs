//! Row filters.
//!
//! A [`FilterChain`] holds keyed [`RowFilter`]s. A row passes the chain when
//! every filter accepts it. Applying the chain marks each row
//! filter-accepted when it passes itself or when any descendant passes, so
//! the ancestors of a match stay reachable.
//!
//! Built-in filters can be described declaratively with [`FilterSpec`]:
//!
//! ```
//! use treegrid::model::FilterSpec;
//!
//! let spec: FilterSpec = serde_json::from_str(
//!     r#"{"kind": "columnValues", "column": 1, "values": ["open"]}"#,
//! ).unwrap();
//! let filter = spec.build();
//! assert_eq!(filter.key(), "column:1");
//! ```

use std::fmt;

use serde::Deserialize;
use treegrid_core::logging::targets;

use super::cell::CellValue;
use super::row::{Row, RowKey};
use super::store::RowStore;

/// A predicate over rows, identified by a key.
pub trait RowFilter: Send + Sync {
    /// Identifies the filter in its chain; adding a filter with an existing
    /// key replaces the old one.
    fn key(&self) -> &str;

    /// Returns `true` if the row passes this filter.
    fn accept(&self, row: &Row) -> bool;
}

/// Case-insensitive substring match over the text of all cells.
#[derive(Debug, Clone)]
pub struct TextFilter {
    needle: String,
}

impl TextFilter {
    /// Key used by text filters.
    pub const KEY: &'static str = "text";

    /// Creates a text filter; matching ignores case.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            needle: text.as_ref().to_lowercase(),
        }
    }
}

impl RowFilter for TextFilter {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn accept(&self, row: &Row) -> bool {
        self.needle.is_empty()
            || row
                .cells()
                .iter()
                .any(|cell| cell.text().to_lowercase().contains(&self.needle))
    }
}

/// Accepts rows whose cell in one column equals one of the allowed values.
#[derive(Debug, Clone)]
pub struct ColumnValueFilter {
    key: String,
    column: usize,
    values: Vec<CellValue>,
}

impl ColumnValueFilter {
    /// Creates a column filter keyed `column:<index>`.
    pub fn new(column: usize, values: impl IntoIterator<Item = CellValue>) -> Self {
        Self {
            key: format!("column:{column}"),
            column,
            values: values.into_iter().collect(),
        }
    }

    /// The filtered column.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl RowFilter for ColumnValueFilter {
    fn key(&self) -> &str {
        &self.key
    }

    fn accept(&self, row: &Row) -> bool {
        let cell = row.cell(self.column).unwrap_or(&CellValue::Empty);
        self.values.iter().any(|value| value == cell)
    }
}

/// A filter backed by a closure.
pub struct FnFilter<F> {
    key: String,
    predicate: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&Row) -> bool + Send + Sync,
{
    /// Creates a closure filter.
    pub fn new(key: impl Into<String>, predicate: F) -> Self {
        Self {
            key: key.into(),
            predicate,
        }
    }
}

impl<F> RowFilter for FnFilter<F>
where
    F: Fn(&Row) -> bool + Send + Sync,
{
    fn key(&self) -> &str {
        &self.key
    }

    fn accept(&self, row: &Row) -> bool {
        (self.predicate)(row)
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter").field("key", &self.key).finish()
    }
}

/// Declarative description of a built-in filter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterSpec {
    /// See [`TextFilter`].
    Text {
        /// Text to search for.
        text: String,
    },
    /// See [`ColumnValueFilter`].
    ColumnValues {
        /// Column index.
        column: usize,
        /// Allowed values.
        values: Vec<CellValue>,
    },
}

impl FilterSpec {
    /// Creates the filter described by this spec.
    pub fn build(self) -> Box<dyn RowFilter> {
        match self {
            Self::Text { text } => Box::new(TextFilter::new(text)),
            Self::ColumnValues { column, values } => {
                Box::new(ColumnValueFilter::new(column, values))
            }
        }
    }
}

/// An ordered set of filters keyed by [`RowFilter::key`].
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn RowFilter>>,
}

impl FilterChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter, replacing any filter with the same key in place.
    pub fn add(&mut self, filter: Box<dyn RowFilter>) {
        match self.filters.iter().position(|f| f.key() == filter.key()) {
            Some(pos) => self.filters[pos] = filter,
            None => self.filters.push(filter),
        }
    }

    /// Removes the filter with the given key.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.key() != key);
        self.filters.len() != before
    }

    /// Removes every filter.
    pub fn clear(&mut self) -> bool {
        let had_filters = !self.filters.is_empty();
        self.filters.clear();
        had_filters
    }

    /// Returns `true` if at least one filter is installed.
    pub fn is_active(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Keys of the installed filters, in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.key()).collect()
    }

    /// Returns `true` if every filter accepts the row.
    pub fn accepts(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.accept(row))
    }

    /// Recomputes the filter-accepted flag of every row reachable from
    /// `roots`. Returns the number of accepted rows.
    ///
    /// A row is accepted when every filter accepts it or when any of its
    /// children is accepted. Rows are visited children first with an
    /// explicit stack, so hierarchy depth is bounded only by memory.
    pub fn apply(&self, store: &mut RowStore, roots: &[RowKey]) -> usize {
        let mut accepted = 0;
        let mut stack: Vec<(RowKey, bool)> = roots.iter().rev().map(|&k| (k, false)).collect();
        while let Some((key, children_done)) = stack.pop() {
            if !children_done {
                let Some(row) = store.get(key) else { continue };
                stack.push((key, true));
                stack.extend(row.children.iter().rev().map(|&child| (child, false)));
                continue;
            }

            let Some(row) = store.get(key) else { continue };
            let is_accepted = self.accepts(row)
                || row
                    .children
                    .iter()
                    .any(|&child| store.get(child).is_some_and(|c| c.filter_accepted));
            if let Some(row) = store.get_mut(key) {
                row.filter_accepted = is_accepted;
            }
            if is_accepted {
                accepted += 1;
            }
        }
        tracing::debug!(
            target: targets::FILTER,
            filters = self.filters.len(),
            accepted,
            rows = store.len(),
            "filters applied"
        );
        accepted
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("keys", &self.keys())
            .finish()
    }
}
