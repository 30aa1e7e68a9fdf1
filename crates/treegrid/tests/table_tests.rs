//! Tests for hierarchy, filtering, projection and selection of a table.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use treegrid::model::{
    CellValue, ColumnValueFilter, FilterSpec, FnFilter, Row, RowDescriptor, RowKey, SelectionDelta,
    Table, TableStats, TextFilter,
};
use treegrid::{Session, TableConfig, TableError};

/// Routes log output through the test harness; `RUST_LOG` selects targets.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn new_table() -> Table {
    Table::new(Arc::new(Session::new()))
}

fn row(id: &str, parent: Option<&str>) -> RowDescriptor {
    let descriptor = RowDescriptor::new([id]).with_id(id);
    match parent {
        Some(parent) => descriptor.with_parent(parent),
        None => descriptor,
    }
}

fn key(table: &Table, id: &str) -> RowKey {
    table.key_of(id).unwrap()
}

fn ids(table: &Table, keys: &[RowKey]) -> Vec<String> {
    keys.iter()
        .map(|&k| table.row(k).unwrap().id().to_string())
        .collect()
}

fn visible_ids(table: &Table) -> Vec<String> {
    ids(table, &table.visible_row_keys())
}

fn all_ids(table: &Table) -> Vec<String> {
    table.rows().map(|(_, row)| row.id().to_string()).collect()
}

/// Rows `[0, 1(0), 2, 3(2), 4(2)]`.
fn five_rows() -> Table {
    let mut table = new_table();
    table
        .insert_rows([
            row("0", None),
            row("1", Some("0")),
            row("2", None),
            row("3", Some("2")),
            row("4", Some("2")),
        ])
        .unwrap();
    table
}

#[test]
fn test_collapse_then_delete_collapsed_parent() {
    let mut table = five_rows();
    let deleted = Arc::new(Mutex::new(Vec::new()));
    let sink = deleted.clone();
    table.signals().rows_deleted.connect(move |keys: &Vec<RowKey>| {
        sink.lock().extend(keys.iter().copied());
    });

    table.collapse_row(key(&table, "2"));
    assert_eq!(visible_ids(&table), vec!["0", "1", "2"]);

    let two = key(&table, "2");
    let three = key(&table, "3");
    let four = key(&table, "4");
    assert_eq!(table.delete_row(two), 3);

    assert_eq!(all_ids(&table), vec!["0", "1"]);
    assert_eq!(ids(&table, &table.filtered_rows()), vec!["0", "1"]);
    assert_eq!(visible_ids(&table), vec!["0", "1"]);
    assert_eq!(ids(&table, table.root_rows()), vec!["0"]);

    // Children are reported before their parent.
    assert_eq!(*deleted.lock(), vec![four, three, two]);
}

#[test]
fn test_cascade_delete_removes_subtree() {
    let mut table = new_table();
    table
        .insert_rows([
            row("r", None),
            row("a", Some("r")),
            row("a1", Some("a")),
            row("a2", Some("a")),
            row("b", Some("r")),
            row("s", None),
        ])
        .unwrap();
    let a = key(&table, "a");
    let descendants = table.descendants(a).len();
    let before = table.stats();

    assert_eq!(table.delete_row(a), descendants + 1);

    let after = table.stats();
    assert_eq!(after.rows, before.rows - 3);
    assert_eq!(after.filtered_rows, before.filtered_rows - 3);
    assert_eq!(after.visible_rows, before.visible_rows - 3);
    assert_eq!(ids(&table, table.children(key(&table, "r"))), vec!["b"]);
    assert!(table.row(a).is_none());
}

#[test]
fn test_delete_unknown_row_is_a_noop() {
    let mut table = five_rows();
    let four = key(&table, "4");
    assert_eq!(table.delete_row(four), 1);
    assert_eq!(table.delete_row(four), 0);
    assert_eq!(table.row_count(), 4);
}

#[test]
fn test_collapse_expand_restores_projection() {
    let mut table = five_rows();
    let before: Vec<_> = table.visible_rows().to_vec();

    let two = key(&table, "2");
    assert!(table.collapse_row(two));
    assert!(!table.collapse_row(two));
    assert!(table.expand_row(two));

    assert_eq!(table.visible_rows(), before.as_slice());
}

#[test]
fn test_filter_keeps_ancestors_of_matches() {
    let mut table = new_table();
    table
        .insert_rows([
            row("root", None),
            row("folder", Some("root")),
            row("needle", Some("folder")),
            row("empty", Some("root")),
            row("other", None),
        ])
        .unwrap();

    table.add_filter(Box::new(TextFilter::new("NEEDLE")));

    assert_eq!(visible_ids(&table), vec!["root", "folder", "needle"]);
    assert!(table.is_filter_active());

    assert!(table.remove_filter(TextFilter::KEY));
    assert_eq!(table.row_count(), table.visible_rows().len());
}

#[test]
fn test_collapsed_ancestor_stays_visible_while_filtered() {
    let mut table = new_table();
    table
        .insert_rows([
            row("parent", None),
            row("match", Some("parent")),
            row("miss", None),
        ])
        .unwrap();
    table.collapse_row(key(&table, "parent"));
    table.add_filter_spec(FilterSpec::Text {
        text: "match".into(),
    });

    assert_eq!(visible_ids(&table), vec!["parent"]);
    assert_eq!(ids(&table, &table.filtered_rows()), vec!["parent", "match"]);
}

#[test]
fn test_filter_replaced_by_key() {
    let mut table = five_rows();
    table.add_filter(Box::new(TextFilter::new("3")));
    assert_eq!(visible_ids(&table), vec!["2", "3"]);

    table.add_filter(Box::new(TextFilter::new("1")));
    assert_eq!(visible_ids(&table), vec!["0", "1"]);
    assert_eq!(table.filter_keys(), vec!["text"]);
}

#[test]
fn test_closure_filter_reapplied() {
    let mut table = five_rows();
    let hidden = Arc::new(Mutex::new(String::from("4")));
    let state = hidden.clone();
    table.add_filter(Box::new(FnFilter::new("hide", move |row: &Row| {
        row.id() != state.lock().as_str()
    })));
    assert_eq!(visible_ids(&table), vec!["0", "1", "2", "3"]);

    *hidden.lock() = "1".into();
    table.filter();
    assert_eq!(visible_ids(&table), vec!["0", "2", "3", "4"]);
}

#[test]
fn test_selection_pruned_on_collapse_and_not_restored() {
    let mut table = five_rows();
    let deltas = Arc::new(Mutex::new(Vec::new()));
    let sink = deltas.clone();
    table
        .signals()
        .selection_changed
        .connect(move |delta: &SelectionDelta| sink.lock().push(delta.clone()));

    let two = key(&table, "2");
    let three = key(&table, "3");
    table.select_rows(&[two, three]);
    assert_eq!(table.selected_rows(), &[two, three]);

    table.collapse_row(two);
    assert_eq!(table.selected_rows(), &[two]);

    table.expand_row(two);
    assert_eq!(table.selected_rows(), &[two]);
    assert!(!table.is_selected(three));

    let deltas = deltas.lock();
    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas[1].deselected, vec![three]);
    assert!(deltas[1].selected.is_empty());
}

#[test]
fn test_selection_pruned_by_filter() {
    let mut table = five_rows();
    let one = key(&table, "1");
    let four = key(&table, "4");
    table.select_rows(&[one, four]);

    table.add_filter(Box::new(TextFilter::new("4")));
    assert_eq!(table.selected_rows(), &[four]);
}

#[test]
fn test_selecting_invisible_rows_is_ignored() {
    let mut table = five_rows();
    let two = key(&table, "2");
    let three = key(&table, "3");
    table.collapse_row(two);

    table.select_rows(&[three]);
    assert!(table.selected_rows().is_empty());

    table.select_all();
    assert_eq!(ids(&table, table.selected_rows()), vec!["0", "1", "2"]);
}

#[test]
fn test_deleting_unselected_row_keeps_selection() {
    let mut table = five_rows();
    let changes = Arc::new(Mutex::new(0));
    let sink = changes.clone();
    let zero = key(&table, "0");
    table.select_row(zero);
    table
        .signals()
        .selection_changed
        .connect(move |_| *sink.lock() += 1);

    table.delete_row(key(&table, "3"));
    assert_eq!(table.selected_rows(), &[zero]);
    assert_eq!(*changes.lock(), 0);
}

#[test]
fn test_deleting_selected_descendant_prunes_selection() {
    let mut table = five_rows();
    let zero = key(&table, "0");
    let one = key(&table, "1");
    table.select_rows(&[zero, one]);

    table.delete_row(zero);
    assert!(table.selected_rows().is_empty());
}

#[test]
fn test_single_selection_mode() {
    let config = TableConfig {
        multi_select: false,
        ..TableConfig::default()
    };
    let mut table = Table::with_config(Arc::new(Session::new()), config);
    let keys = table.insert_rows([row("a", None), row("b", None)]).unwrap();

    table.select_rows(&keys);
    assert_eq!(table.selected_rows(), &[keys[1]]);
    table.add_to_selection(&[keys[0]]);
    assert_eq!(table.selected_rows(), &[keys[0]]);
    table.deselect_rows(&[keys[0]]);
    assert_eq!(table.selected_row(), None);
}

#[test]
fn test_move_visible_row_while_filtered() {
    let mut table = new_table();
    let parent = table.insert_row(RowDescriptor::new(["P"]).with_id("p")).unwrap();
    for (id, state) in [("a", "open"), ("b", "closed"), ("c", "open"), ("d", "closed")] {
        table
            .insert_row(RowDescriptor::new([id, state]).with_id(id).with_parent("p"))
            .unwrap();
    }
    table.add_filter(Box::new(ColumnValueFilter::new(1, [CellValue::from("open")])));
    assert_eq!(visible_ids(&table), vec!["p", "a", "c"]);

    let a = key(&table, "a");
    assert!(table.move_visible_row_down(a));
    assert_eq!(ids(&table, table.children(parent)), vec!["b", "c", "a", "d"]);
    assert_eq!(visible_ids(&table), vec!["p", "c", "a"]);
    assert!(!table.move_visible_row_down(a));

    assert!(table.move_visible_row_up(a));
    assert_eq!(ids(&table, table.children(parent)), vec!["b", "a", "c", "d"]);
    assert_eq!(visible_ids(&table), vec!["p", "a", "c"]);
    assert!(!table.move_visible_row_up(a));

    // Among all siblings the hidden row "b" is the previous one.
    assert!(table.move_row_up(a));
    assert_eq!(ids(&table, table.children(parent)), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_moves_stay_within_parent() {
    let mut table = five_rows();
    let three = key(&table, "3");
    let four = key(&table, "4");
    let two = key(&table, "2");

    assert!(table.move_row_down(three));
    assert_eq!(ids(&table, table.children(two)), vec!["4", "3"]);
    assert!(!table.move_row_down(three));
    assert_eq!(visible_ids(&table), vec!["0", "1", "2", "4", "3"]);

    assert!(table.move_row_up(two));
    assert_eq!(visible_ids(&table), vec!["2", "4", "3", "0", "1"]);
    assert_eq!(table.parent(four), Some(two));
}

#[test]
fn test_unresolvable_parent_becomes_root() {
    init_tracing();
    let mut table = new_table();
    table
        .insert_rows([row("a", None), row("b", Some("missing"))])
        .unwrap();

    assert_eq!(ids(&table, table.root_rows()), vec!["a", "b"]);
    assert_eq!(table.parent(key(&table, "b")), None);
}

#[test]
fn test_unrecognized_parent_json_becomes_root() {
    init_tracing();
    let mut table = new_table();
    let rows = RowDescriptor::list_from_json(
        r#"[
            {"id": "a", "cells": ["a"]},
            {"id": "b", "cells": ["b"], "parentRow": 42},
            {"id": "c", "cells": ["c"], "parentRow": {"key": "a"}},
            {"id": "d", "cells": ["d"], "parentRow": {"id": "a"}}
        ]"#,
    )
    .unwrap();
    table.insert_rows(rows).unwrap();

    assert_eq!(ids(&table, table.root_rows()), vec!["a", "b", "c"]);
    assert_eq!(table.parent(key(&table, "d")), Some(key(&table, "a")));
    assert_eq!(visible_ids(&table), vec!["a", "d", "b", "c"]);
}

#[test]
fn test_deep_chain_is_filtered_without_recursion() {
    const DEPTH: usize = 100_000;

    // Each row's parent comes later in the batch; the last row is the root.
    let mut table = new_table();
    let rows: Vec<RowDescriptor> = (0..DEPTH)
        .map(|i| {
            let parent = format!("r{}", i + 1);
            let parent = (i + 1 < DEPTH).then_some(parent.as_str());
            row(&format!("r{i}"), parent)
        })
        .collect();
    table.insert_rows(rows).unwrap();
    assert_eq!(ids(&table, table.root_rows()), vec![format!("r{}", DEPTH - 1)]);
    assert_eq!(table.row(key(&table, "r0")).unwrap().level(), DEPTH - 1);

    // Only the deepest row matches; every ancestor is kept for it.
    table.add_filter(Box::new(TextFilter::new("r0")));
    assert_eq!(table.filtered_rows().len(), DEPTH);
    assert_eq!(table.visible_rows().len(), DEPTH);

    table.add_filter(Box::new(TextFilter::new("no such row")));
    assert!(table.filtered_rows().is_empty());
    assert!(table.visible_rows().is_empty());
}

#[test]
fn test_cycle_in_batch_is_broken() {
    init_tracing();
    let mut table = new_table();
    table
        .insert_rows([row("a", Some("b")), row("b", Some("a"))])
        .unwrap();

    let a = key(&table, "a");
    let b = key(&table, "b");
    assert_eq!(table.parent(a), Some(b));
    assert_eq!(table.parent(b), None);
    assert_eq!(visible_ids(&table), vec!["b", "a"]);
}

#[test]
fn test_json_ingestion() {
    let mut table = new_table();
    let rows = RowDescriptor::list_from_json(
        r#"[
            {"cells": ["Folder", 3]},
            {"id": "x", "cells": ["File", null, true], "parentRow": "ui1", "expanded": false}
        ]"#,
    )
    .unwrap();
    table.insert_rows(rows).unwrap();

    let folder = key(&table, "ui1");
    let file = table.row_by_id("x").unwrap();
    assert_eq!(file.parent(), Some(folder));
    assert_eq!(file.cell(2), Some(&CellValue::Bool(true)));
    assert!(!file.is_expanded());
    assert_eq!(table.row(folder).unwrap().text(), "Folder 3");

    let err = RowDescriptor::list_from_json("[{\"cells\": 3}]").unwrap_err();
    assert!(matches!(err, TableError::Descriptor(_)));
}

#[test]
fn test_row_expanded_signal() {
    let mut table = five_rows();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    table
        .signals()
        .row_expanded
        .connect(move |&(row, expanded)| sink.lock().push((row, expanded)));

    let two = key(&table, "2");
    table.collapse_row(two);
    table.toggle_row_expanded(two);
    table.expand_row(two);

    assert_eq!(*seen.lock(), vec![(two, false), (two, true)]);
}

#[test]
fn test_blocked_signals() {
    let mut table = five_rows();
    let count = Arc::new(Mutex::new(0));
    let sink = count.clone();
    table.signals().rows_inserted.connect(move |_| *sink.lock() += 1);

    {
        let _blocked = table.signals().block();
    }
    table.insert_row(row("5", None)).unwrap();
    assert_eq!(*count.lock(), 1);
}

#[test]
fn test_deferred_cells_coalesce_updates() {
    let mut table = five_rows();
    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();
    table
        .signals()
        .rows_updated
        .connect(move |keys: &Vec<RowKey>| sink.lock().push(keys.clone()));

    let zero = key(&table, "0");
    let one = key(&table, "1");
    let first = table.begin_deferred_cell(zero, 1).unwrap();
    let second = table.begin_deferred_cell(one, 1).unwrap();

    table.resolve_deferred_cell(first, "image").unwrap();
    table.set_cell_value(zero, 0, "zero");
    assert!(updates.lock().is_empty());
    assert_eq!(table.row(zero).unwrap().cell(1), Some(&CellValue::from("image")));

    table.resolve_deferred_cell(second, 42).unwrap();
    assert_eq!(*updates.lock(), vec![vec![zero, one]]);
    assert_eq!(table.pending_deferred_cells(), 0);

    assert!(matches!(
        table.resolve_deferred_cell(first, "late"),
        Err(TableError::UnknownToken)
    ));
}

#[test]
fn test_deleting_row_drops_its_deferred_cells() {
    let mut table = five_rows();
    let four = key(&table, "4");
    let _token = table.begin_deferred_cell(four, 0).unwrap();
    assert_eq!(table.pending_deferred_cells(), 1);

    table.delete_row(key(&table, "2"));
    assert_eq!(table.pending_deferred_cells(), 0);
}

#[test]
fn test_deleting_only_match_hides_filtered_ancestor() {
    let mut table = new_table();
    table
        .insert_rows([row("folder", None), row("needle", Some("folder"))])
        .unwrap();
    table.add_filter(Box::new(TextFilter::new("needle")));
    let folder = key(&table, "folder");
    table.select_row(folder);

    table.delete_row(key(&table, "needle"));
    assert!(table.visible_rows().is_empty());
    assert!(table.selected_rows().is_empty());
}

#[test]
fn test_delete_all_rows() {
    let mut table = five_rows();
    table.mark_rows_as_non_changed();
    table.select_all();

    assert_eq!(table.delete_all_rows(), 5);
    assert_eq!(table.stats(), TableStats::default());
    assert_eq!(table.deleted_row_ids().len(), 5);
    assert!(table.root_rows().is_empty());
}

#[test]
fn test_stats() {
    let mut table = five_rows();
    table.collapse_row(key(&table, "2"));
    table.select_row(key(&table, "1"));
    table.add_filter(Box::new(TextFilter::new("4")));

    assert_eq!(
        table.stats(),
        TableStats {
            rows: 5,
            filtered_rows: 2,
            visible_rows: 1,
            selected_rows: 0,
            checked_rows: 0,
        }
    );
}
