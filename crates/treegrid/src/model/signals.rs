//! Change notifications emitted by a table.

use treegrid_core::{Signal, SignalBlocker};

use super::row::RowKey;
use super::selection::SelectionDelta;

/// Signals emitted by a [`Table`](super::Table).
///
/// Every signal fires after the mutation that caused it has completed:
/// hierarchy, filter flags, visible projection and selection are already
/// consistent when a slot runs. Keys passed to `rows_deleted` and
/// `all_rows_deleted` no longer resolve.
pub struct TableSignals {
    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------
    /// Emitted after rows have been inserted.
    /// Args: keys of the new rows, in insertion order
    pub rows_inserted: Signal<Vec<RowKey>>,

    /// Emitted after rows have been deleted, descendants included.
    /// Args: keys of the deleted rows, children before parents
    pub rows_deleted: Signal<Vec<RowKey>>,

    /// Emitted after every row has been deleted at once.
    /// Args: keys of the deleted rows
    pub all_rows_deleted: Signal<Vec<RowKey>>,

    /// Emitted after row content or links changed.
    /// Args: keys of the updated rows
    pub rows_updated: Signal<Vec<RowKey>>,

    /// Emitted after a row moved among its siblings.
    /// Args: key of the moved row
    pub row_order_changed: Signal<RowKey>,

    // -------------------------------------------------------------------------
    // View state
    // -------------------------------------------------------------------------
    /// Emitted after a row was expanded or collapsed.
    /// Args: (row, expanded)
    pub row_expanded: Signal<(RowKey, bool)>,

    /// Emitted after filters were added, removed or re-applied.
    pub filter_changed: Signal<()>,

    /// Emitted after the selection changed.
    pub selection_changed: Signal<SelectionDelta>,

    /// Emitted after rows were checked or unchecked.
    /// Args: keys of the rows whose check state changed
    pub rows_checked: Signal<Vec<RowKey>>,
}

impl Default for TableSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSignals {
    /// Creates a new set of table signals.
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_deleted: Signal::new(),
            all_rows_deleted: Signal::new(),
            rows_updated: Signal::new(),
            row_order_changed: Signal::new(),
            row_expanded: Signal::new(),
            filter_changed: Signal::new(),
            selection_changed: Signal::new(),
            rows_checked: Signal::new(),
        }
    }

    /// Suppresses every signal until the returned guard is dropped.
    pub fn block(&self) -> TableSignalsBlocker<'_> {
        TableSignalsBlocker {
            _guards: (
                self.rows_inserted.block(),
                self.rows_deleted.block(),
                self.all_rows_deleted.block(),
                self.rows_updated.block(),
                self.row_order_changed.block(),
                self.row_expanded.block(),
                self.filter_changed.block(),
                self.selection_changed.block(),
                self.rows_checked.block(),
            ),
        }
    }
}

/// Guard returned by [`TableSignals::block`].
pub struct TableSignalsBlocker<'a> {
    #[allow(clippy::type_complexity)]
    _guards: (
        SignalBlocker<'a, Vec<RowKey>>,
        SignalBlocker<'a, Vec<RowKey>>,
        SignalBlocker<'a, Vec<RowKey>>,
        SignalBlocker<'a, Vec<RowKey>>,
        SignalBlocker<'a, RowKey>,
        SignalBlocker<'a, (RowKey, bool)>,
        SignalBlocker<'a, ()>,
        SignalBlocker<'a, SelectionDelta>,
        SignalBlocker<'a, Vec<RowKey>>,
    ),
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_block_suppresses_all_signals() {
        let signals = TableSignals::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        signals.filter_changed.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = count.clone();
        signals.rows_updated.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        {
            let _blocked = signals.block();
            signals.filter_changed.emit(());
            signals.rows_updated.emit(Vec::new());
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        signals.filter_changed.emit(());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
