//! The hierarchical table.
//!
//! `Table` owns the rows of one table and keeps every derived structure in
//! sync with them: child lists, filter flags, the visible projection and the
//! selection. Each public mutating method completes all of these updates
//! before it emits signals and returns.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use treegrid::Session;
//! use treegrid::model::{RowDescriptor, Table};
//!
//! let mut table = Table::new(Arc::new(Session::new()));
//! let keys = table.insert_rows([
//!     RowDescriptor::new(["Inbox"]).with_id("inbox"),
//!     RowDescriptor::new(["Spam"]).with_id("spam").with_parent("inbox"),
//! ]).unwrap();
//!
//! table.collapse_row(keys[0]);
//! assert_eq!(table.visible_row_keys(), vec![keys[0]]);
//!
//! table.delete_row(keys[0]);
//! assert_eq!(table.row_count(), 0);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use treegrid_core::logging::targets;
use treegrid_core::{Session, TreeDump, TreeFormatOptions, TreeSource};

use super::cell::CellValue;
use super::descriptor::RowDescriptor;
use super::filter::{FilterChain, FilterSpec, RowFilter};
use super::hierarchy::Hierarchy;
use super::projection::{VisibleRow, VisibleRows};
use super::row::{Row, RowKey, RowStatus};
use super::selection::{SelectionDelta, SelectionTracker};
use super::signals::TableSignals;
use super::store::RowStore;
use super::update_buffer::{DeferredToken, UpdateBuffer};
use crate::config::TableConfig;
use crate::error::{Result, TableError};

/// Row counts for footer displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStats {
    /// All rows.
    pub rows: usize,
    /// Filter-accepted rows, collapsed or not.
    pub filtered_rows: usize,
    /// Rows in the visible projection.
    pub visible_rows: usize,
    /// Selected rows.
    pub selected_rows: usize,
    /// Checked rows.
    pub checked_rows: usize,
}

/// A hierarchical table of rows.
pub struct Table {
    session: Arc<Session>,
    config: TableConfig,
    store: RowStore,
    hierarchy: Hierarchy,
    filters: FilterChain,
    visible: VisibleRows,
    selection: SelectionTracker,
    updates: UpdateBuffer,
    deleted_rows: Vec<Row>,
    signals: TableSignals,
}

impl Table {
    /// Creates an empty table with the default configuration.
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_config(session, TableConfig::default())
    }

    /// Creates an empty table.
    pub fn with_config(session: Arc<Session>, config: TableConfig) -> Self {
        Self {
            session,
            selection: SelectionTracker::new(config.multi_select),
            config,
            store: RowStore::new(),
            hierarchy: Hierarchy::new(),
            filters: FilterChain::new(),
            visible: VisibleRows::default(),
            updates: UpdateBuffer::new(),
            deleted_rows: Vec::new(),
            signals: TableSignals::new(),
        }
    }

    /// The session this table generates row ids from.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The table configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Signals emitted by this table.
    pub fn signals(&self) -> &TableSignals {
        &self.signals
    }

    // -------------------------------------------------------------------------
    // Insert, update, delete
    // -------------------------------------------------------------------------

    /// Inserts rows at the end of the flat row list.
    ///
    /// Parent references may point to rows inserted earlier in the same
    /// batch or to rows later in it. References that do not resolve make
    /// the row a root row. Fails without inserting anything if an id is
    /// already taken.
    pub fn insert_rows(
        &mut self,
        descriptors: impl IntoIterator<Item = RowDescriptor>,
    ) -> Result<Vec<RowKey>> {
        let descriptors: Vec<RowDescriptor> = descriptors.into_iter().collect();

        let mut batch_ids = HashSet::new();
        for id in descriptors.iter().filter_map(|d| d.id.as_deref()) {
            if self.store.contains_id(id) || !batch_ids.insert(id.to_string()) {
                return Err(TableError::DuplicateRowId(id.to_string()));
            }
        }

        let mut inserted = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            let id = match &descriptor.id {
                Some(id) => id.clone(),
                None => self.generate_id(&batch_ids),
            };
            let mut row = Row::new(id, descriptor.cells.clone());
            row.expanded = descriptor.expanded.unwrap_or(self.config.default_expanded);
            row.enabled = descriptor.enabled.unwrap_or(true);
            row.checked = self.config.checkable && row.enabled && descriptor.checked.unwrap_or(false);
            inserted.push(self.store.insert(row));
        }

        for (&key, descriptor) in inserted.iter().zip(&descriptors) {
            let parent = Hierarchy::resolve_parent(&self.store, descriptor.parent_row.as_ref(), key);
            if let Some(row) = self.store.get_mut(key) {
                row.parent = parent;
            }
        }

        let delta = self.refresh(true);
        tracing::debug!(
            target: targets::TABLE,
            inserted = inserted.len(),
            rows = self.store.len(),
            "rows inserted"
        );

        self.signals.rows_inserted.emit(inserted.clone());
        self.emit_selection(delta);
        Ok(inserted)
    }

    /// Inserts a single row.
    pub fn insert_row(&mut self, descriptor: RowDescriptor) -> Result<RowKey> {
        let mut keys = self.insert_rows([descriptor])?;
        Ok(keys.remove(0))
    }

    /// Replaces the state of existing rows, looked up by descriptor id.
    ///
    /// Cells and the parent link are taken from the descriptor; a missing
    /// parent makes the row a root row. `expanded`, `checked` and `enabled`
    /// are only changed when present. Descriptors without a known id are
    /// skipped.
    pub fn update_rows(
        &mut self,
        descriptors: impl IntoIterator<Item = RowDescriptor>,
    ) -> Vec<RowKey> {
        let mut updated = Vec::new();
        let mut expansion_changes = Vec::new();

        for descriptor in descriptors {
            let Some(key) = descriptor.id.as_deref().and_then(|id| self.store.key_of(id)) else {
                tracing::warn!(
                    target: targets::TABLE,
                    id = ?descriptor.id,
                    "update for unknown row ignored"
                );
                continue;
            };

            let parent = Hierarchy::resolve_parent(&self.store, descriptor.parent_row.as_ref(), key);
            let checkable = self.config.checkable;
            let Some(row) = self.store.get_mut(key) else {
                continue;
            };
            row.cells = descriptor.cells;
            row.parent = parent;
            if let Some(enabled) = descriptor.enabled {
                row.enabled = enabled;
            }
            if let Some(checked) = descriptor.checked {
                row.checked = checkable && row.enabled && checked;
            }
            if let Some(expanded) = descriptor.expanded
                && row.expanded != expanded
            {
                row.expanded = expanded;
                expansion_changes.push((key, expanded));
            }
            row.mark_updated();
            updated.push(key);
        }

        if updated.is_empty() {
            return updated;
        }

        let delta = self.refresh(true);
        tracing::debug!(target: targets::TABLE, updated = updated.len(), "rows updated");

        self.notify_updated(updated.clone());
        for change in expansion_changes {
            self.signals.row_expanded.emit(change);
        }
        self.emit_selection(delta);
        updated
    }

    /// Sets the value of one cell. Returns `false` if the row does not exist.
    ///
    /// Rows shorter than `column` are padded with empty cells.
    pub fn set_cell_value(&mut self, key: RowKey, column: usize, value: impl Into<CellValue>) -> bool {
        if !self.write_cell(key, column, value.into()) {
            return false;
        }
        let delta = self.refresh(false);
        self.notify_updated(vec![key]);
        self.emit_selection(delta);
        true
    }

    /// Deletes rows together with all their descendants.
    ///
    /// Descendants are removed before their ancestors. Unknown keys are
    /// ignored. Returns the number of removed rows.
    pub fn delete_rows(&mut self, keys: &[RowKey]) -> usize {
        let mut doomed = Vec::new();
        let mut seen = HashSet::new();
        for &key in keys {
            if !self.store.contains(key) {
                tracing::warn!(target: targets::TABLE, ?key, "delete of unknown row ignored");
                continue;
            }
            if seen.contains(&key) {
                continue;
            }
            for row in Hierarchy::post_order(&self.store, key) {
                if seen.insert(row) {
                    doomed.push(row);
                }
            }
        }
        if doomed.is_empty() {
            return 0;
        }

        let removed = self.store.remove_many(&doomed);
        self.record_deleted(removed);
        self.updates.cancel_rows(&seen);

        let delta = self.refresh(true);
        tracing::debug!(
            target: targets::TABLE,
            deleted = doomed.len(),
            rows = self.store.len(),
            "rows deleted"
        );

        let count = doomed.len();
        self.signals.rows_deleted.emit(doomed);
        self.emit_selection(delta);
        count
    }

    /// Deletes one row and its descendants.
    pub fn delete_row(&mut self, key: RowKey) -> usize {
        self.delete_rows(&[key])
    }

    /// Deletes every row.
    pub fn delete_all_rows(&mut self) -> usize {
        if self.store.is_empty() {
            return 0;
        }
        let keys = self.store.order().to_vec();
        let removed = self.store.clear();
        self.record_deleted(removed);
        self.updates.clear();

        let delta = self.refresh(true);
        tracing::debug!(target: targets::TABLE, deleted = keys.len(), "all rows deleted");

        let count = keys.len();
        self.signals.all_rows_deleted.emit(keys);
        self.emit_selection(delta);
        count
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns a row.
    pub fn row(&self, key: RowKey) -> Option<&Row> {
        self.store.get(key)
    }

    /// Returns the key of the row with the given id.
    pub fn key_of(&self, id: &str) -> Option<RowKey> {
        self.store.key_of(id)
    }

    /// Returns the row with the given id.
    pub fn row_by_id(&self, id: &str) -> Option<&Row> {
        self.store.key_of(id).and_then(|key| self.store.get(key))
    }

    /// All rows in flat-list order.
    pub fn rows(&self) -> impl Iterator<Item = (RowKey, &Row)> + '_ {
        self.store.iter()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.store.len()
    }

    /// Root rows in sibling order.
    pub fn root_rows(&self) -> &[RowKey] {
        self.hierarchy.roots()
    }

    /// Children of a row in sibling order.
    pub fn children(&self, key: RowKey) -> &[RowKey] {
        self.store.get(key).map_or(&[][..], Row::children)
    }

    /// Parent of a row.
    pub fn parent(&self, key: RowKey) -> Option<RowKey> {
        self.store.get(key).and_then(Row::parent)
    }

    /// Ancestors of a row, nearest first.
    pub fn ancestors(&self, key: RowKey) -> Vec<RowKey> {
        Hierarchy::ancestors(&self.store, key)
    }

    /// Whether `ancestor` lies on the parent chain of `key`.
    pub fn is_ancestor(&self, ancestor: RowKey, key: RowKey) -> bool {
        Hierarchy::is_ancestor(&self.store, ancestor, key)
    }

    /// Descendants of a row in pre-order.
    pub fn descendants(&self, key: RowKey) -> Vec<RowKey> {
        Hierarchy::descendants(&self.store, key)
    }

    /// Filter-accepted rows in flat-list order, including rows hidden by a
    /// collapsed ancestor.
    pub fn filtered_rows(&self) -> Vec<RowKey> {
        self.store
            .iter()
            .filter(|(_, row)| row.filter_accepted)
            .map(|(key, _)| key)
            .collect()
    }

    /// The visible projection in display order.
    pub fn visible_rows(&self) -> &[VisibleRow] {
        self.visible.as_slice()
    }

    /// Keys of the visible rows in display order.
    pub fn visible_row_keys(&self) -> Vec<RowKey> {
        self.visible.keys()
    }

    /// Returns `true` if the row is part of the visible projection.
    pub fn is_row_visible(&self, key: RowKey) -> bool {
        self.visible.contains(key)
    }

    /// Display index of a visible row.
    pub fn visible_index_of(&self, key: RowKey) -> Option<usize> {
        self.visible.index_of(key)
    }

    /// The visible row below `key`.
    pub fn next_visible_row(&self, key: RowKey) -> Option<RowKey> {
        self.visible.next(key)
    }

    /// The visible row above `key`.
    pub fn previous_visible_row(&self, key: RowKey) -> Option<RowKey> {
        self.visible.previous(key)
    }

    /// Current row counts.
    pub fn stats(&self) -> TableStats {
        let (filtered_rows, checked_rows) =
            self.store
                .iter()
                .fold((0, 0), |(filtered, checked), (_, row)| {
                    (
                        filtered + usize::from(row.filter_accepted),
                        checked + usize::from(row.checked),
                    )
                });
        TableStats {
            rows: self.store.len(),
            filtered_rows,
            visible_rows: self.visible.len(),
            selected_rows: self.selection.len(),
            checked_rows,
        }
    }

    // -------------------------------------------------------------------------
    // Expansion
    // -------------------------------------------------------------------------

    /// Expands or collapses a row. Returns `true` if the state changed.
    ///
    /// Collapsing drops selected descendants from the selection; expanding
    /// again does not restore them.
    pub fn set_row_expanded(&mut self, key: RowKey, expanded: bool) -> bool {
        let Some(row) = self.store.get_mut(key) else {
            tracing::warn!(target: targets::TABLE, ?key, "expansion of unknown row ignored");
            return false;
        };
        if row.expanded == expanded {
            return false;
        }
        row.expanded = expanded;

        let delta = self.reproject();
        tracing::trace!(target: targets::TABLE, ?key, expanded, "row expansion changed");

        self.signals.row_expanded.emit((key, expanded));
        self.emit_selection(delta);
        true
    }

    /// Expands a row.
    pub fn expand_row(&mut self, key: RowKey) -> bool {
        self.set_row_expanded(key, true)
    }

    /// Collapses a row.
    pub fn collapse_row(&mut self, key: RowKey) -> bool {
        self.set_row_expanded(key, false)
    }

    /// Flips the expanded state of a row.
    pub fn toggle_row_expanded(&mut self, key: RowKey) -> bool {
        match self.store.get(key) {
            Some(row) => {
                let expanded = !row.expanded;
                self.set_row_expanded(key, expanded)
            }
            None => false,
        }
    }

    /// Expands every row that has children.
    pub fn expand_all(&mut self) -> usize {
        self.set_all_expanded(true)
    }

    /// Collapses every row that has children.
    pub fn collapse_all(&mut self) -> usize {
        self.set_all_expanded(false)
    }

    fn set_all_expanded(&mut self, expanded: bool) -> usize {
        let changed: Vec<RowKey> = self
            .store
            .iter()
            .filter(|(_, row)| row.has_children() && row.expanded != expanded)
            .map(|(key, _)| key)
            .collect();
        if changed.is_empty() {
            return 0;
        }
        for &key in &changed {
            if let Some(row) = self.store.get_mut(key) {
                row.expanded = expanded;
            }
        }

        let delta = self.reproject();
        tracing::debug!(
            target: targets::TABLE,
            rows = changed.len(),
            expanded,
            "expansion changed for all rows"
        );

        let count = changed.len();
        for key in changed {
            self.signals.row_expanded.emit((key, expanded));
        }
        self.emit_selection(delta);
        count
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Adds a filter, replacing one with the same key, and re-filters.
    pub fn add_filter(&mut self, filter: Box<dyn RowFilter>) {
        self.filters.add(filter);
        self.filter();
    }

    /// Adds a built-in filter described by `spec`.
    pub fn add_filter_spec(&mut self, spec: FilterSpec) {
        self.add_filter(spec.build());
    }

    /// Removes the filter with the given key and re-filters.
    pub fn remove_filter(&mut self, key: &str) -> bool {
        if !self.filters.remove(key) {
            return false;
        }
        self.filter();
        true
    }

    /// Removes every filter.
    pub fn clear_filters(&mut self) -> bool {
        if !self.filters.clear() {
            return false;
        }
        self.filter();
        true
    }

    /// Keys of the installed filters.
    pub fn filter_keys(&self) -> Vec<&str> {
        self.filters.keys()
    }

    /// Returns `true` if any filter is installed.
    pub fn is_filter_active(&self) -> bool {
        self.filters.is_active()
    }

    /// Re-applies the filter chain, e.g. after the state a closure filter
    /// reads has changed.
    pub fn filter(&mut self) {
        let delta = self.refresh(false);
        self.signals.filter_changed.emit(());
        self.emit_selection(delta);
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Replaces the selection. Rows that are not visible are ignored.
    pub fn select_rows(&mut self, keys: &[RowKey]) {
        let visible = &self.visible;
        let delta = self.selection.select(keys, |key| visible.contains(key));
        self.emit_selection(delta);
    }

    /// Selects a single row.
    pub fn select_row(&mut self, key: RowKey) {
        self.select_rows(&[key]);
    }

    /// Adds visible rows to the selection.
    pub fn add_to_selection(&mut self, keys: &[RowKey]) {
        let visible = &self.visible;
        let delta = self.selection.add(keys, |key| visible.contains(key));
        self.emit_selection(delta);
    }

    /// Removes rows from the selection.
    pub fn deselect_rows(&mut self, keys: &[RowKey]) {
        let delta = self.selection.deselect(keys);
        self.emit_selection(delta);
    }

    /// Selects every visible row.
    pub fn select_all(&mut self) {
        let keys = self.visible.keys();
        self.select_rows(&keys);
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        let delta = self.selection.clear();
        self.emit_selection(delta);
    }

    /// Selected rows in selection order.
    pub fn selected_rows(&self) -> &[RowKey] {
        self.selection.selected()
    }

    /// The first selected row.
    pub fn selected_row(&self) -> Option<RowKey> {
        self.selection.selected().first().copied()
    }

    /// Returns `true` if the row is selected.
    pub fn is_selected(&self, key: RowKey) -> bool {
        self.selection.is_selected(key)
    }

    // -------------------------------------------------------------------------
    // Check state
    // -------------------------------------------------------------------------

    /// Checks or unchecks rows. Returns the rows whose state changed.
    ///
    /// Does nothing unless the table is checkable. Disabled rows keep their
    /// state. Without multi-check, checking a row unchecks every other row
    /// and only the last enabled row of `keys` is checked.
    pub fn check_rows(&mut self, keys: &[RowKey], checked: bool) -> Vec<RowKey> {
        if !self.config.checkable {
            tracing::warn!(target: targets::TABLE, "check state change on non-checkable table ignored");
            return Vec::new();
        }

        let mut requested: Vec<RowKey> = keys
            .iter()
            .copied()
            .filter(|&key| self.store.get(key).is_some_and(Row::is_enabled))
            .collect();

        let mut changed = Vec::new();
        if checked && !self.config.multi_check {
            requested.drain(..requested.len().saturating_sub(1));
            let others: Vec<RowKey> = self
                .store
                .iter()
                .filter(|(key, row)| row.checked && !requested.contains(key))
                .map(|(key, _)| key)
                .collect();
            for key in others {
                if self.set_checked(key, false) {
                    changed.push(key);
                }
            }
        }
        for key in requested {
            if self.set_checked(key, checked) && !changed.contains(&key) {
                changed.push(key);
            }
        }

        if !changed.is_empty() {
            tracing::trace!(target: targets::TABLE, changed = changed.len(), checked, "rows checked");
            self.signals.rows_checked.emit(changed.clone());
        }
        changed
    }

    /// Checks or unchecks a single row.
    pub fn check_row(&mut self, key: RowKey, checked: bool) -> bool {
        !self.check_rows(&[key], checked).is_empty()
    }

    /// Unchecks every row.
    pub fn uncheck_all_rows(&mut self) -> Vec<RowKey> {
        let checked = self.checked_rows();
        self.check_rows(&checked, false)
    }

    /// Checked rows in flat-list order.
    pub fn checked_rows(&self) -> Vec<RowKey> {
        self.store
            .iter()
            .filter(|(_, row)| row.checked)
            .map(|(key, _)| key)
            .collect()
    }

    fn set_checked(&mut self, key: RowKey, checked: bool) -> bool {
        match self.store.get_mut(key) {
            Some(row) if row.checked != checked => {
                row.checked = checked;
                true
            }
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Moves
    // -------------------------------------------------------------------------

    /// Moves a row above its previous sibling.
    pub fn move_row_up(&mut self, key: RowKey) -> bool {
        let siblings = self.hierarchy.siblings(&self.store, key).to_vec();
        match sibling_before(&siblings, key) {
            Some(neighbor) => self.move_next_to(key, neighbor),
            None => false,
        }
    }

    /// Moves a row below its next sibling.
    pub fn move_row_down(&mut self, key: RowKey) -> bool {
        let siblings = self.hierarchy.siblings(&self.store, key).to_vec();
        match sibling_after(&siblings, key) {
            Some(neighbor) => self.move_next_to(key, neighbor),
            None => false,
        }
    }

    /// Moves a visible row above its previous visible sibling. Invisible
    /// siblings keep their relative order.
    pub fn move_visible_row_up(&mut self, key: RowKey) -> bool {
        let siblings = self.visible.visible_siblings(&self.store, &self.hierarchy, key);
        match sibling_before(&siblings, key) {
            Some(neighbor) => self.move_next_to(key, neighbor),
            None => false,
        }
    }

    /// Moves a visible row below its next visible sibling.
    pub fn move_visible_row_down(&mut self, key: RowKey) -> bool {
        let siblings = self.visible.visible_siblings(&self.store, &self.hierarchy, key);
        match sibling_after(&siblings, key) {
            Some(neighbor) => self.move_next_to(key, neighbor),
            None => false,
        }
    }

    /// Moves a row above all its siblings.
    pub fn move_row_to_top(&mut self, key: RowKey) -> bool {
        match self.hierarchy.siblings(&self.store, key).first().copied() {
            Some(first) if first != key => self.move_next_to(key, first),
            _ => false,
        }
    }

    /// Moves a row below all its siblings.
    pub fn move_row_to_bottom(&mut self, key: RowKey) -> bool {
        match self.hierarchy.siblings(&self.store, key).last().copied() {
            Some(last) if last != key => self.move_next_to(key, last),
            _ => false,
        }
    }

    /// Splices `key` into the flat list at the position of `neighbor`, which
    /// lands it directly before a preceding neighbor or directly after a
    /// following one.
    fn move_next_to(&mut self, key: RowKey, neighbor: RowKey) -> bool {
        let (Some(from), Some(to)) = (self.store.position(key), self.store.position(neighbor)) else {
            return false;
        };
        self.store.move_row(from, to);

        let delta = self.refresh(true);
        tracing::trace!(target: targets::TABLE, ?key, from, to, "row moved");

        self.signals.row_order_changed.emit(key);
        self.emit_selection(delta);
        true
    }

    // -------------------------------------------------------------------------
    // Deferred cells
    // -------------------------------------------------------------------------

    /// Registers a cell whose content arrives later.
    ///
    /// Until every registered cell is resolved or cancelled, row updates are
    /// buffered and reported in a single `rows_updated` signal.
    pub fn begin_deferred_cell(&mut self, key: RowKey, column: usize) -> Option<DeferredToken> {
        if !self.store.contains(key) {
            tracing::warn!(target: targets::TABLE, ?key, "deferred cell for unknown row ignored");
            return None;
        }
        Some(self.updates.begin(key, column))
    }

    /// Stores the content of a deferred cell.
    pub fn resolve_deferred_cell(
        &mut self,
        token: DeferredToken,
        value: impl Into<CellValue>,
    ) -> Result<()> {
        let (key, column) = self.updates.resolve(token)?;
        if self.write_cell(key, column, value.into()) {
            let delta = self.refresh(false);
            self.updates.buffer(key);
            self.emit_selection(delta);
        }
        self.flush_updates();
        Ok(())
    }

    /// Drops a deferred cell without content.
    pub fn cancel_deferred(&mut self, token: DeferredToken) -> bool {
        let cancelled = self.updates.cancel(token);
        if cancelled {
            self.flush_updates();
        }
        cancelled
    }

    /// Number of deferred cells still outstanding.
    pub fn pending_deferred_cells(&self) -> usize {
        self.updates.pending_count()
    }

    fn notify_updated(&mut self, keys: Vec<RowKey>) {
        if self.updates.is_idle() {
            self.signals.rows_updated.emit(keys);
        } else {
            for key in keys {
                self.updates.buffer(key);
            }
        }
    }

    fn flush_updates(&mut self) {
        if !self.updates.is_idle() {
            return;
        }
        let store = &self.store;
        let rows: Vec<RowKey> = self
            .updates
            .take_buffered()
            .into_iter()
            .filter(|&key| store.contains(key))
            .collect();
        if !rows.is_empty() {
            tracing::debug!(target: targets::TABLE, rows = rows.len(), "buffered updates flushed");
            self.signals.rows_updated.emit(rows);
        }
    }

    fn write_cell(&mut self, key: RowKey, column: usize, value: CellValue) -> bool {
        let Some(row) = self.store.get_mut(key) else {
            tracing::warn!(target: targets::TABLE, ?key, column, "cell update of unknown row ignored");
            return false;
        };
        if row.cells.len() <= column {
            row.cells.resize(column + 1, CellValue::Empty);
        }
        row.cells[column] = value;
        row.mark_updated();
        true
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Rows with the given status, in flat-list order.
    pub fn rows_with_status(&self, status: RowStatus) -> Vec<RowKey> {
        self.store
            .iter()
            .filter(|(_, row)| row.status == status)
            .map(|(key, _)| key)
            .collect()
    }

    /// Rows that existed before the last [`Table::mark_rows_as_non_changed`]
    /// and were deleted since.
    pub fn deleted_rows(&self) -> &[Row] {
        &self.deleted_rows
    }

    /// Ids of [`Table::deleted_rows`].
    pub fn deleted_row_ids(&self) -> Vec<&str> {
        self.deleted_rows.iter().map(Row::id).collect()
    }

    /// Resets every row to [`RowStatus::NonChanged`] and forgets deleted rows.
    pub fn mark_rows_as_non_changed(&mut self) {
        for row in self.store.values_mut() {
            row.status = RowStatus::NonChanged;
        }
        self.deleted_rows.clear();
    }

    fn record_deleted(&mut self, removed: Vec<Row>) {
        self.deleted_rows.extend(
            removed
                .into_iter()
                .filter(|row| row.status != RowStatus::Inserted)
                .map(|mut row| {
                    row.status = RowStatus::Deleted;
                    row.parent = None;
                    row.children.clear();
                    row
                }),
        );
    }

    // -------------------------------------------------------------------------
    // Debugging
    // -------------------------------------------------------------------------

    /// Renders the hierarchy as text.
    pub fn dump(&self) -> String {
        TreeDump::new().format(self)
    }

    /// Renders the hierarchy as text with custom options.
    pub fn dump_with(&self, options: TreeFormatOptions) -> String {
        TreeDump::with_options(options).format(self)
    }

    // -------------------------------------------------------------------------
    // Derived state
    // -------------------------------------------------------------------------

    fn generate_id(&self, reserved: &HashSet<String>) -> String {
        loop {
            let id = self.session.next_id();
            if !self.store.contains_id(&id) && !reserved.contains(&id) {
                return id;
            }
        }
    }

    /// Recomputes filter flags, the projection and the selection. With
    /// `structure`, child lists are rebuilt first.
    fn refresh(&mut self, structure: bool) -> SelectionDelta {
        if structure {
            self.hierarchy.rebuild(&mut self.store);
        }
        self.filters.apply(&mut self.store, self.hierarchy.roots());
        self.reproject()
    }

    fn reproject(&mut self) -> SelectionDelta {
        self.visible = VisibleRows::compute(&self.store, &self.hierarchy);
        let visible = &self.visible;
        self.selection.retain(|key| visible.contains(key))
    }

    fn emit_selection(&self, delta: SelectionDelta) {
        if !delta.is_empty() {
            self.signals.selection_changed.emit(delta);
        }
    }
}

fn sibling_before(siblings: &[RowKey], key: RowKey) -> Option<RowKey> {
    let index = siblings.iter().position(|&k| k == key)?;
    index.checked_sub(1).map(|i| siblings[i])
}

fn sibling_after(siblings: &[RowKey], key: RowKey) -> Option<RowKey> {
    let index = siblings.iter().position(|&k| k == key)?;
    siblings.get(index + 1).copied()
}

impl TreeSource for Table {
    type Node = RowKey;

    fn roots(&self) -> Vec<RowKey> {
        self.hierarchy.roots().to_vec()
    }

    fn children(&self, node: RowKey) -> Vec<RowKey> {
        Table::children(self, node).to_vec()
    }

    fn label(&self, node: RowKey) -> String {
        let Some(row) = self.store.get(node) else {
            return String::from("?");
        };
        let mut label = row.id.clone();
        if row.has_children() && !row.expanded {
            label.push_str(" [collapsed]");
        }
        if !row.filter_accepted {
            label.push_str(" [filtered]");
        }
        label
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("rows", &self.store.len())
            .field("visible", &self.visible.len())
            .field("selected", &self.selection.len())
            .field("filters", &self.filters)
            .finish()
    }
}
