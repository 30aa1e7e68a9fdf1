//! Buffering of row updates while deferred cell content is outstanding.
//!
//! Cells whose content arrives later (images, lazily computed text) are
//! registered with [`UpdateBuffer::begin`]. Rows updated while any token is
//! pending are collected instead of re-rendered one by one. Once the last
//! token resolves, the buffer hands back every collected row exactly once.

use std::collections::HashSet;

use slotmap::{SlotMap, new_key_type};

use super::row::RowKey;
use crate::error::{Result, TableError};

new_key_type! {
    /// Handle of a pending deferred cell.
    pub struct DeferredToken;
}

/// Pending deferred cells and the rows updated while they are outstanding.
#[derive(Debug, Default)]
pub struct UpdateBuffer {
    pending: SlotMap<DeferredToken, (RowKey, usize)>,
    buffered: Vec<RowKey>,
    buffered_set: HashSet<RowKey>,
}

impl UpdateBuffer {
    /// Creates an idle buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a deferred cell.
    pub fn begin(&mut self, row: RowKey, column: usize) -> DeferredToken {
        self.pending.insert((row, column))
    }

    /// Marks a deferred cell as resolved and returns its position.
    pub fn resolve(&mut self, token: DeferredToken) -> Result<(RowKey, usize)> {
        self.pending.remove(token).ok_or(TableError::UnknownToken)
    }

    /// Drops a deferred cell without resolving it.
    pub fn cancel(&mut self, token: DeferredToken) -> bool {
        self.pending.remove(token).is_some()
    }

    /// Drops every deferred cell belonging to `rows`.
    pub fn cancel_rows(&mut self, rows: &HashSet<RowKey>) {
        self.pending.retain(|_, (row, _)| !rows.contains(row));
    }

    /// Collects an updated row.
    pub fn buffer(&mut self, row: RowKey) {
        if self.buffered_set.insert(row) {
            self.buffered.push(row);
        }
    }

    /// Returns `true` if no deferred cell is pending.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of pending deferred cells.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Takes the collected rows in the order they were first buffered.
    pub fn take_buffered(&mut self) -> Vec<RowKey> {
        self.buffered_set.clear();
        std::mem::take(&mut self.buffered)
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.buffered.clear();
        self.buffered_set.clear();
    }
}
