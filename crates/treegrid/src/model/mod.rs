//! Hierarchical row model.
//!
//! A [`Table`] owns rows linked into a forest through parent references and
//! derives everything a view needs from them:
//!
//! - **Row store**: the flat row list and the id lookup
//! - **Hierarchy**: child lists and root rows, in flat-list order
//! - **Filters**: a keyed chain of predicates; ancestors of a match stay
//! - **Visible rows**: the pre-order projection over expanded, accepted rows
//! - **Selection**: always a subset of the visible rows
//!
//! [`RowRenderer`] diffs successive projections into element operations for
//! a view.
//!
//! # Architecture Overview
//!
//! ```text
//! RowDescriptor ──> RowStore ──> Hierarchy ──> FilterChain ──> VisibleRows
//!                                                                  │
//!                        SelectionTracker <── prune ───────────────┤
//!                                                                  v
//!                                                             RowRenderer
//! ```

mod cell;
mod descriptor;
mod filter;
mod hierarchy;
mod projection;
mod render;
mod row;
mod selection;
mod signals;
mod store;
mod table;
mod update_buffer;

pub use cell::CellValue;
pub use descriptor::{ParentRef, RowDescriptor};
pub use filter::{ColumnValueFilter, FilterChain, FilterSpec, FnFilter, RowFilter, TextFilter};
pub use hierarchy::Hierarchy;
pub use projection::{VisibleRow, VisibleRows};
pub use render::{ElementId, RenderOp, RowRenderer, TransitionKind};
pub use row::{Row, RowKey, RowStatus};
pub use selection::{SelectionDelta, SelectionTracker};
pub use signals::{TableSignals, TableSignalsBlocker};
pub use store::RowStore;
pub use table::{Table, TableStats};
pub use update_buffer::{DeferredToken, UpdateBuffer};
