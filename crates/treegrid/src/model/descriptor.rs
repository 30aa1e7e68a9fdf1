//! Row descriptors: the ingestion format of the table.
//!
//! A descriptor carries what the model side knows about a row. The parent is
//! given as a [`ParentRef`], which the table resolves once into a [`RowKey`].
//!
//! ```
//! use treegrid::model::{ParentRef, RowDescriptor};
//!
//! let rows = RowDescriptor::list_from_json(r#"[
//!     {"id": "a", "cells": ["Folder"]},
//!     {"id": "b", "cells": ["File"], "parentRow": "a"},
//!     {"id": "c", "cells": ["Other"], "parentRow": {"id": "a"}, "expanded": false}
//! ]"#).unwrap();
//!
//! assert_eq!(rows[1].parent_row, Some(ParentRef::ById("a".into())));
//! assert_eq!(rows[2].parent_row, Some(ParentRef::ByKey { id: "a".into() }));
//! ```

use serde::Deserialize;

use super::cell::CellValue;
use super::row::RowKey;
use crate::error::Result;

/// Reference from a row to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ParentRef {
    /// The parent's row id.
    ById(String),
    /// An object carrying the parent's id.
    ByKey {
        /// The parent's row id.
        id: String,
    },
    /// A row of the same table, already resolved.
    #[serde(skip)]
    Resolved(RowKey),
    /// Any other JSON value. Never resolves, so the row becomes a root.
    Unresolvable(serde_json::Value),
}

impl From<&str> for ParentRef {
    fn from(id: &str) -> Self {
        Self::ById(id.to_string())
    }
}

impl From<String> for ParentRef {
    fn from(id: String) -> Self {
        Self::ById(id)
    }
}

impl From<RowKey> for ParentRef {
    fn from(key: RowKey) -> Self {
        Self::Resolved(key)
    }
}

/// Description of a row to insert, or of the new state of a row to update.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowDescriptor {
    /// Row identifier; generated by the session when absent on insert.
    pub id: Option<String>,
    /// Cell values in column order.
    pub cells: Vec<CellValue>,
    /// Parent reference; `None` makes the row a root row.
    pub parent_row: Option<ParentRef>,
    /// Expanded state; the table default applies when absent.
    pub expanded: Option<bool>,
    /// Check state; unchanged on update when absent.
    pub checked: Option<bool>,
    /// Enabled state; unchanged on update when absent.
    pub enabled: Option<bool>,
}

impl RowDescriptor {
    /// Creates a descriptor with the given cells.
    pub fn new<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the row id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the parent reference.
    pub fn with_parent(mut self, parent: impl Into<ParentRef>) -> Self {
        self.parent_row = Some(parent.into());
        self
    }

    /// Sets the expanded state.
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    /// Sets the check state.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Sets the enabled state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Parses a JSON array of descriptors.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }
}
