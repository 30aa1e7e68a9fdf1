//! Row records.

use slotmap::new_key_type;

use super::cell::CellValue;

new_key_type! {
    /// A stable handle for a row inside one table.
    ///
    /// Keys are versioned: a key of a deleted row never aliases a row
    /// inserted later.
    pub struct RowKey;
}

/// Dirty-tracking state of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowStatus {
    /// Unchanged since the last time the table was marked clean.
    #[default]
    NonChanged,
    /// Inserted since the last time the table was marked clean.
    Inserted,
    /// Updated since the last time the table was marked clean.
    Updated,
    /// Removed from the table; only seen on rows returned by `deleted_rows`.
    Deleted,
}

/// A single data record of the hierarchical table.
///
/// Structural fields (`parent`, `children`, `level`) and the filter result
/// are maintained by the table; callers read them through accessors.
#[derive(Debug, Clone)]
pub struct Row {
    pub(crate) id: String,
    pub(crate) cells: Vec<CellValue>,
    pub(crate) parent: Option<RowKey>,
    pub(crate) children: Vec<RowKey>,
    pub(crate) expanded: bool,
    pub(crate) status: RowStatus,
    pub(crate) checked: bool,
    pub(crate) enabled: bool,
    pub(crate) filter_accepted: bool,
    pub(crate) level: usize,
}

impl Row {
    pub(crate) fn new(id: String, cells: Vec<CellValue>) -> Self {
        Self {
            id,
            cells,
            parent: None,
            children: Vec::new(),
            expanded: true,
            status: RowStatus::Inserted,
            checked: false,
            enabled: true,
            filter_accepted: true,
            level: 0,
        }
    }

    /// The row identifier, unique within its table.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All cell values in column order.
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    /// The value of one cell, or `None` if the column is out of range.
    pub fn cell(&self, column: usize) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// The parent row, `None` for root rows.
    pub fn parent(&self) -> Option<RowKey> {
        self.parent
    }

    /// Child rows in display order.
    pub fn children(&self) -> &[RowKey] {
        &self.children
    }

    /// Returns `true` if the row has child rows.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether the children of this row are part of the visible projection.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Dirty-tracking status.
    pub fn status(&self) -> RowStatus {
        self.status
    }

    /// Check state, only meaningful in checkable tables.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Disabled rows cannot be checked.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the row passed the filter chain itself or through a descendant.
    pub fn is_filter_accepted(&self) -> bool {
        self.filter_accepted
    }

    /// Depth in the hierarchy, 0 for root rows.
    pub fn level(&self) -> usize {
        self.level
    }

    pub(crate) fn mark_updated(&mut self) {
        if self.status != RowStatus::Inserted {
            self.status = RowStatus::Updated;
        }
    }

    /// Text of all cells joined by a single space.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(CellValue::text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
