//! Selection state for table rows.
//!
//! [`SelectionTracker`] keeps the selected rows in selection order. It does
//! not know about visibility: callers pass the predicate deciding which rows
//! may be selected, and call [`SelectionTracker::retain`] after the visible
//! projection changes. Every mutating operation returns a [`SelectionDelta`]
//! describing what changed.

use std::collections::HashSet;

use treegrid_core::logging::targets;

use super::row::RowKey;

/// Rows added to and removed from the selection by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDelta {
    /// Newly selected rows, in selection order.
    pub selected: Vec<RowKey>,
    /// Rows no longer selected, in their previous selection order.
    pub deselected: Vec<RowKey>,
}

impl SelectionDelta {
    /// Returns `true` if the operation changed nothing.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }
}

/// Ordered, duplicate-free set of selected rows.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    selected: Vec<RowKey>,
    set: HashSet<RowKey>,
    multi_select: bool,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SelectionTracker {
    /// Creates an empty selection.
    pub fn new(multi_select: bool) -> Self {
        Self {
            selected: Vec::new(),
            set: HashSet::new(),
            multi_select,
        }
    }

    /// Whether more than one row may be selected.
    pub fn is_multi_select(&self) -> bool {
        self.multi_select
    }

    /// Selected rows in selection order.
    pub fn selected(&self) -> &[RowKey] {
        &self.selected
    }

    /// Returns `true` if `key` is selected.
    pub fn is_selected(&self, key: RowKey) -> bool {
        self.set.contains(&key)
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Replaces the selection with the selectable rows of `keys`.
    pub fn select(
        &mut self,
        keys: &[RowKey],
        selectable: impl Fn(RowKey) -> bool,
    ) -> SelectionDelta {
        let requested = self.normalize(keys, &selectable);
        self.replace(requested)
    }

    /// Adds the selectable rows of `keys` to the selection.
    ///
    /// In single-select mode this behaves like [`SelectionTracker::select`].
    pub fn add(&mut self, keys: &[RowKey], selectable: impl Fn(RowKey) -> bool) -> SelectionDelta {
        if !self.multi_select {
            return self.select(keys, selectable);
        }
        let mut next = self.selected.clone();
        next.extend(self.normalize(keys, &selectable));
        self.replace(next)
    }

    /// Removes `keys` from the selection.
    pub fn deselect(&mut self, keys: &[RowKey]) -> SelectionDelta {
        let doomed: HashSet<RowKey> = keys.iter().copied().collect();
        self.retain(|key| !doomed.contains(&key))
    }

    /// Clears the selection.
    pub fn clear(&mut self) -> SelectionDelta {
        self.replace(Vec::new())
    }

    /// Drops every selected row for which `keep` returns `false`.
    pub fn retain(&mut self, keep: impl Fn(RowKey) -> bool) -> SelectionDelta {
        let next = self.selected.iter().copied().filter(|&key| keep(key)).collect();
        self.replace(next)
    }

    fn normalize(&self, keys: &[RowKey], selectable: &impl Fn(RowKey) -> bool) -> Vec<RowKey> {
        let mut dropped = 0usize;
        let mut result: Vec<RowKey> = keys
            .iter()
            .copied()
            .filter(|&key| {
                let ok = selectable(key);
                if !ok {
                    dropped += 1;
                }
                ok
            })
            .collect();
        if dropped > 0 {
            tracing::debug!(
                target: targets::SELECTION,
                dropped,
                "ignoring selection of rows that are not visible"
            );
        }
        if !self.multi_select && result.len() > 1 {
            result.drain(..result.len() - 1);
        }
        result
    }

    fn replace(&mut self, next: Vec<RowKey>) -> SelectionDelta {
        let mut seen = HashSet::with_capacity(next.len());
        let next: Vec<RowKey> = next.into_iter().filter(|key| seen.insert(*key)).collect();

        let delta = SelectionDelta {
            selected: next
                .iter()
                .copied()
                .filter(|key| !self.set.contains(key))
                .collect(),
            deselected: self
                .selected
                .iter()
                .copied()
                .filter(|key| !seen.contains(key))
                .collect(),
        };

        if !delta.is_empty() {
            tracing::trace!(
                target: targets::SELECTION,
                selected = delta.selected.len(),
                deselected = delta.deselected.len(),
                "selection changed"
            );
        }
        self.selected = next;
        self.set = seen;
        delta
    }
}
