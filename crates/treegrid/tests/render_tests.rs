//! Tests for diffing visible rows into element operations.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use treegrid::model::{ElementId, RenderOp, RowDescriptor, RowKey, RowRenderer, Table, TransitionKind};
use treegrid::{Session, TableConfig};

/// A stand-in for the view: element handles in display order.
#[derive(Default)]
struct View {
    elements: Vec<ElementId>,
    inserted: usize,
    removed: usize,
    moved: usize,
}

impl View {
    fn apply(&mut self, ops: &[RenderOp]) {
        for op in ops {
            match *op {
                RenderOp::Remove { element, .. } => {
                    self.removed += 1;
                    self.elements.retain(|&e| e != element);
                }
                RenderOp::Insert { element, before, .. } => {
                    self.inserted += 1;
                    self.place(element, before);
                }
                RenderOp::Move { element, before, .. } => {
                    self.moved += 1;
                    self.elements.retain(|&e| e != element);
                    self.place(element, before);
                }
            }
        }
    }

    fn place(&mut self, element: ElementId, before: Option<ElementId>) {
        let at = before
            .and_then(|anchor| self.elements.iter().position(|&e| e == anchor))
            .unwrap_or(self.elements.len());
        self.elements.insert(at, element);
    }

    fn rows(&self, renderer: &RowRenderer) -> Vec<RowKey> {
        self.elements
            .iter()
            .map(|&element| renderer.row_of(element).unwrap())
            .collect()
    }
}

fn table() -> Table {
    let mut table = Table::new(Arc::new(Session::new()));
    table
        .insert_rows([
            RowDescriptor::new(["0"]).with_id("0"),
            RowDescriptor::new(["1"]).with_id("1").with_parent("0"),
            RowDescriptor::new(["2"]).with_id("2"),
            RowDescriptor::new(["3"]).with_id("3").with_parent("2"),
            RowDescriptor::new(["4"]).with_id("4").with_parent("2"),
        ])
        .unwrap();
    table
}

#[test]
fn test_view_follows_projection() {
    let mut table = table();
    let mut renderer = RowRenderer::from_config(table.config());
    let mut view = View::default();

    view.apply(&renderer.sync(&table.visible_row_keys()));
    assert_eq!(view.rows(&renderer), table.visible_row_keys());
    assert_eq!(view.inserted, 5);

    let zero = table.key_of("0").unwrap();
    let element = renderer.element_of(zero).unwrap();

    let two = table.key_of("2").unwrap();
    table.collapse_row(two);
    view.apply(&renderer.sync(&table.visible_row_keys()));
    assert_eq!(view.rows(&renderer), table.visible_row_keys());
    assert_eq!(view.removed, 2);

    table.expand_row(two);
    view.apply(&renderer.sync(&table.visible_row_keys()));
    assert_eq!(view.rows(&renderer), table.visible_row_keys());
    assert_eq!(view.inserted, 7);
    assert_eq!(view.moved, 0);

    // Rows that never left the projection keep their element.
    assert_eq!(renderer.element_of(zero), Some(element));
}

#[test]
fn test_moving_a_subtree_moves_few_elements() {
    let mut table = table();
    let mut renderer = RowRenderer::new(Duration::ZERO);
    let mut view = View::default();
    view.apply(&renderer.sync(&table.visible_row_keys()));

    table.move_row_down(table.key_of("0").unwrap());
    let ops = renderer.sync(&table.visible_row_keys());
    view.apply(&ops);

    assert_eq!(view.rows(&renderer), table.visible_row_keys());
    assert_eq!(view.moved, 2);
    assert!(ops.iter().all(|op| matches!(op, RenderOp::Move { .. })));
}

#[test]
fn test_filtering_removes_and_restores_elements() {
    let mut table = table();
    let mut renderer = RowRenderer::new(Duration::ZERO);
    let mut view = View::default();
    view.apply(&renderer.sync(&table.visible_row_keys()));

    table.add_filter_spec(treegrid::model::FilterSpec::Text { text: "4".into() });
    view.apply(&renderer.sync(&table.visible_row_keys()));
    assert_eq!(view.elements.len(), 2);

    table.remove_filter("text");
    view.apply(&renderer.sync(&table.visible_row_keys()));
    assert_eq!(view.rows(&renderer), table.visible_row_keys());
}

#[test]
fn test_transition_cancelled_when_row_is_deleted() {
    let config = TableConfig {
        transition_delay_ms: 200,
        ..TableConfig::default()
    };
    let mut table = Table::with_config(Arc::new(Session::new()), config);
    table
        .insert_rows([
            RowDescriptor::new(["a"]).with_id("a"),
            RowDescriptor::new(["a1"]).with_id("a1").with_parent("a"),
            RowDescriptor::new(["b"]).with_id("b"),
            RowDescriptor::new(["b1"]).with_id("b1").with_parent("b"),
        ])
        .unwrap();

    let renderer = Arc::new(Mutex::new(RowRenderer::from_config(table.config())));
    let slot = renderer.clone();
    table
        .signals()
        .rows_deleted
        .connect(move |rows: &Vec<RowKey>| slot.lock().rows_deleted(rows));

    let start = Instant::now();
    let a = table.key_of("a").unwrap();
    let b = table.key_of("b").unwrap();

    // Structure changes at once; the transition is only scheduled.
    table.collapse_row(a);
    table.collapse_row(b);
    assert!(!table.is_row_visible(table.key_of("a1").unwrap()));
    renderer.lock().schedule_transition(a, TransitionKind::Collapse, start);
    renderer.lock().schedule_transition(b, TransitionKind::Collapse, start);

    table.delete_row(a);
    assert!(!renderer.lock().has_pending_transition(a));

    let fired = renderer.lock().poll_transitions(start + Duration::from_millis(200));
    assert_eq!(fired, vec![(b, TransitionKind::Collapse)]);
}
