//! Row renderer diffing.
//!
//! [`RowRenderer`] remembers which rows it rendered last time and which
//! element handle displays each of them. [`RowRenderer::sync`] compares that
//! with a new visible projection and produces the edit script a view has to
//! apply: removals first, then insertions and moves from the last row to the
//! first, each anchored before the element that follows it in the new order.
//!
//! Rows that stay visible keep their element. Elements whose old positions
//! form the longest increasing subsequence of the new order stay in place;
//! only the others are moved.
//!
//! Expand and collapse transitions are scheduled per row and fire from
//! [`RowRenderer::poll_transitions`]. They are presentation only: the visible
//! projection has already changed when a transition is scheduled.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};
use treegrid_core::Debouncer;
use treegrid_core::logging::targets;

use super::row::RowKey;
use crate::config::TableConfig;

new_key_type! {
    /// Handle of a rendered row element.
    pub struct ElementId;
}

/// One step of the edit script produced by [`RowRenderer::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOp {
    /// Remove the element of a row that is no longer visible.
    Remove {
        /// The row that was displayed.
        row: RowKey,
        /// Its element, now released.
        element: ElementId,
    },
    /// Create an element for a newly visible row.
    Insert {
        /// The row to display.
        row: RowKey,
        /// The new element.
        element: ElementId,
        /// Insert before this element, or append when `None`.
        before: Option<ElementId>,
    },
    /// Reposition the existing element of a row.
    Move {
        /// The moved row.
        row: RowKey,
        /// Its element.
        element: ElementId,
        /// Move before this element, or to the end when `None`.
        before: Option<ElementId>,
    },
}

/// Kind of a presentation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Children of the row are being revealed.
    Expand,
    /// Children of the row are being hidden.
    Collapse,
}

/// Tracks rendered rows and turns projection changes into edit scripts.
#[derive(Debug)]
pub struct RowRenderer {
    rendered: Vec<RowKey>,
    elements: HashMap<RowKey, ElementId>,
    element_rows: SlotMap<ElementId, RowKey>,
    transitions: Debouncer<RowKey>,
    transition_kinds: HashMap<RowKey, TransitionKind>,
}

impl RowRenderer {
    /// Creates a renderer whose transitions last `transition_delay`.
    pub fn new(transition_delay: Duration) -> Self {
        Self {
            rendered: Vec::new(),
            elements: HashMap::new(),
            element_rows: SlotMap::with_key(),
            transitions: Debouncer::new(transition_delay),
            transition_kinds: HashMap::new(),
        }
    }

    /// Creates a renderer using the transition delay of `config`.
    pub fn from_config(config: &TableConfig) -> Self {
        Self::new(config.transition_delay())
    }

    /// Rows in the order they are currently rendered.
    pub fn rendered(&self) -> &[RowKey] {
        &self.rendered
    }

    /// The element displaying `row`.
    pub fn element_of(&self, row: RowKey) -> Option<ElementId> {
        self.elements.get(&row).copied()
    }

    /// The row displayed by `element`.
    pub fn row_of(&self, element: ElementId) -> Option<RowKey> {
        self.element_rows.get(element).copied()
    }

    /// Brings the rendered rows in line with `visible` and returns the
    /// operations that do the same to the view.
    pub fn sync(&mut self, visible: &[RowKey]) -> Vec<RenderOp> {
        let mut ops = Vec::new();
        let next: HashSet<RowKey> = visible.iter().copied().collect();

        let removed: Vec<RowKey> = self
            .rendered
            .iter()
            .copied()
            .filter(|row| !next.contains(row))
            .collect();
        for row in removed {
            if let Some(element) = self.elements.remove(&row) {
                self.element_rows.remove(element);
                ops.push(RenderOp::Remove { row, element });
            }
            self.cancel_transition(row);
        }

        let old_positions: HashMap<RowKey, usize> = self
            .rendered
            .iter()
            .filter(|row| next.contains(row))
            .enumerate()
            .map(|(index, &row)| (row, index))
            .collect();

        // Old position per new index; `None` for rows that were not rendered.
        let sources: Vec<Option<usize>> = visible
            .iter()
            .map(|row| old_positions.get(row).copied())
            .collect();
        let stationary = longest_increasing_subsequence(&sources);

        let mut before: Option<ElementId> = None;
        for (index, &row) in visible.iter().enumerate().rev() {
            let element = match self.elements.get(&row) {
                Some(&element) => {
                    if !stationary.contains(&index) {
                        ops.push(RenderOp::Move {
                            row,
                            element,
                            before,
                        });
                    }
                    element
                }
                None => {
                    let element = self.element_rows.insert(row);
                    self.elements.insert(row, element);
                    ops.push(RenderOp::Insert {
                        row,
                        element,
                        before,
                    });
                    element
                }
            };
            before = Some(element);
        }

        tracing::debug!(
            target: targets::RENDER,
            rows = visible.len(),
            ops = ops.len(),
            "rendered rows synchronized"
        );
        self.rendered = visible.to_vec();
        ops
    }

    /// Schedules a transition for `row`, cancelling its pending one.
    pub fn schedule_transition(&mut self, row: RowKey, kind: TransitionKind, now: Instant) {
        if self.transitions.schedule(row, now) {
            tracing::trace!(target: targets::RENDER, ?row, ?kind, "transition replaced");
        }
        self.transition_kinds.insert(row, kind);
    }

    /// Cancels the pending transition of `row`.
    pub fn cancel_transition(&mut self, row: RowKey) -> bool {
        self.transition_kinds.remove(&row);
        self.transitions.cancel(&row)
    }

    /// Cancels the transitions of rows that were deleted from the table.
    pub fn rows_deleted(&mut self, rows: &[RowKey]) {
        for &row in rows {
            self.cancel_transition(row);
        }
    }

    /// Returns `true` if `row` has a pending transition.
    pub fn has_pending_transition(&self, row: RowKey) -> bool {
        self.transitions.is_pending(&row)
    }

    /// Returns the transitions that completed by `now`.
    pub fn poll_transitions(&mut self, now: Instant) -> Vec<(RowKey, TransitionKind)> {
        self.transitions
            .poll(now)
            .into_iter()
            .filter_map(|row| {
                let kind = self.transition_kinds.remove(&row)?;
                Some((row, kind))
            })
            .collect()
    }

    /// Forgets every rendered row and pending transition.
    pub fn reset(&mut self) {
        self.rendered.clear();
        self.elements.clear();
        self.element_rows.clear();
        self.transitions.cancel_all();
        self.transition_kinds.clear();
    }
}

/// Indices into `sources` of one longest strictly increasing subsequence of
/// its `Some` values.
fn longest_increasing_subsequence(sources: &[Option<usize>]) -> HashSet<usize> {
    // tails[len] = index of the smallest tail of an increasing run of len + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessors: Vec<Option<usize>> = vec![None; sources.len()];

    for (index, source) in sources.iter().enumerate() {
        let Some(value) = *source else {
            continue;
        };
        let slot = tails.partition_point(|&tail| sources[tail] < Some(value));
        predecessors[index] = slot.checked_sub(1).map(|prev| tails[prev]);
        if slot == tails.len() {
            tails.push(index);
        } else {
            tails[slot] = index;
        }
    }

    let mut result = HashSet::with_capacity(tails.len());
    let mut current = tails.last().copied();
    while let Some(index) = current {
        result.insert(index);
        current = predecessors[index];
    }
    result
}
