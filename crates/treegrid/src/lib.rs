//! treegrid - a hierarchical table row model.
//!
//! Rows form a forest through parent references. The table keeps child
//! lists, filter results, the visible row projection and the selection
//! consistent across inserts, updates, deletes, moves, filtering and
//! expand/collapse, and reports each change through signals.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use treegrid::Session;
//! use treegrid::model::{FilterSpec, RowDescriptor, Table};
//!
//! let mut table = Table::new(Arc::new(Session::new()));
//! let rows = RowDescriptor::list_from_json(r#"[
//!     {"id": "docs", "cells": ["Documents"]},
//!     {"id": "cv", "cells": ["resume.pdf"], "parentRow": "docs"},
//!     {"id": "pics", "cells": ["Pictures"]}
//! ]"#).unwrap();
//! table.insert_rows(rows).unwrap();
//!
//! table.add_filter_spec(FilterSpec::Text { text: "resume".into() });
//! let visible: Vec<&str> = table
//!     .visible_row_keys()
//!     .into_iter()
//!     .map(|key| table.row(key).unwrap().id())
//!     .collect();
//! assert_eq!(visible, ["docs", "cv"]);
//! ```

pub use treegrid_core::*;

mod config;
mod error;
pub mod model;

pub use config::TableConfig;
pub use error::{Result, TableError};
