//! The visible row projection.
//!
//! Visible rows are the pre-order traversal of the hierarchy that includes
//! only filter-accepted rows and descends only into expanded rows. The
//! projection is recomputed from scratch after every structural change.

use std::collections::HashMap;

use super::hierarchy::Hierarchy;
use super::row::RowKey;
use super::store::RowStore;

/// One entry of the visible projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibleRow {
    /// The visible row.
    pub key: RowKey,
    /// Depth in the hierarchy, used for indentation.
    pub level: usize,
}

/// The ordered list of rows a renderer should display.
#[derive(Debug, Default, Clone)]
pub struct VisibleRows {
    rows: Vec<VisibleRow>,
    positions: HashMap<RowKey, usize>,
}

impl VisibleRows {
    /// Computes the projection of `store`.
    pub fn compute(store: &RowStore, hierarchy: &Hierarchy) -> Self {
        let mut rows = Vec::new();
        let mut stack: Vec<RowKey> = hierarchy.roots().iter().rev().copied().collect();

        while let Some(key) = stack.pop() {
            let Some(row) = store.get(key) else {
                continue;
            };
            if row.filter_accepted {
                rows.push(VisibleRow {
                    key,
                    level: row.level,
                });
            }
            if row.expanded {
                stack.extend(row.children.iter().rev().copied());
            }
        }

        let positions = rows
            .iter()
            .enumerate()
            .map(|(index, row)| (row.key, index))
            .collect();
        Self { rows, positions }
    }

    /// Visible rows in display order.
    pub fn as_slice(&self) -> &[VisibleRow] {
        &self.rows
    }

    /// Keys of the visible rows in display order.
    pub fn keys(&self) -> Vec<RowKey> {
        self.rows.iter().map(|row| row.key).collect()
    }

    /// Returns `true` if `key` is visible.
    pub fn contains(&self, key: RowKey) -> bool {
        self.positions.contains_key(&key)
    }

    /// Display index of a visible row.
    pub fn index_of(&self, key: RowKey) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    /// The visible row displayed after `key`.
    pub fn next(&self, key: RowKey) -> Option<RowKey> {
        let index = self.index_of(key)?;
        self.rows.get(index + 1).map(|row| row.key)
    }

    /// The visible row displayed before `key`.
    pub fn previous(&self, key: RowKey) -> Option<RowKey> {
        let index = self.index_of(key)?;
        index.checked_sub(1).map(|i| self.rows[i].key)
    }

    /// Siblings of `key` that are visible, in sibling order, including `key`
    /// itself when it is visible.
    pub fn visible_siblings(
        &self,
        store: &RowStore,
        hierarchy: &Hierarchy,
        key: RowKey,
    ) -> Vec<RowKey> {
        hierarchy
            .siblings(store, key)
            .iter()
            .copied()
            .filter(|&sibling| self.contains(sibling))
            .collect()
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
