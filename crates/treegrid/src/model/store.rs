//! Row storage.
//!
//! `RowStore` owns every row of a table. It keeps the flat row list (the
//! order rows were inserted in, changed only by moves) and a map from row id
//! to key.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use super::row::{Row, RowKey};

/// Internal storage for table rows.
#[derive(Debug, Default)]
pub struct RowStore {
    rows: SlotMap<RowKey, Row>,
    order: Vec<RowKey>,
    by_id: HashMap<String, RowKey>,
}

impl RowStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row to the flat list and returns its key.
    pub fn insert(&mut self, row: Row) -> RowKey {
        let id = row.id.clone();
        let key = self.rows.insert(row);
        self.order.push(key);
        self.by_id.insert(id, key);
        key
    }

    /// Removes the given rows and returns them in the order of `keys`.
    ///
    /// Unknown keys are skipped.
    pub fn remove_many(&mut self, keys: &[RowKey]) -> Vec<Row> {
        let doomed: HashSet<RowKey> = keys.iter().copied().collect();
        self.order.retain(|key| !doomed.contains(key));

        let mut removed = Vec::with_capacity(keys.len());
        for &key in keys {
            if let Some(row) = self.rows.remove(key) {
                self.by_id.remove(&row.id);
                removed.push(row);
            }
        }
        removed
    }

    /// Removes every row.
    pub fn clear(&mut self) -> Vec<Row> {
        self.by_id.clear();
        self.order.clear();
        self.rows.drain().map(|(_, row)| row).collect()
    }

    /// Returns the row for a key.
    pub fn get(&self, key: RowKey) -> Option<&Row> {
        self.rows.get(key)
    }

    /// Returns the row for a key mutably.
    pub fn get_mut(&mut self, key: RowKey) -> Option<&mut Row> {
        self.rows.get_mut(key)
    }

    /// Returns `true` if the key refers to a live row.
    pub fn contains(&self, key: RowKey) -> bool {
        self.rows.contains_key(key)
    }

    /// Looks a row up by id.
    pub fn key_of(&self, id: &str) -> Option<RowKey> {
        self.by_id.get(id).copied()
    }

    /// Returns `true` if a row with this id exists.
    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// The flat row list.
    pub fn order(&self) -> &[RowKey] {
        &self.order
    }

    /// Position of a row in the flat list.
    pub fn position(&self, key: RowKey) -> Option<usize> {
        self.order.iter().position(|&k| k == key)
    }

    /// Moves the row at `from` to index `to` of the flat list.
    ///
    /// The row is removed first, so moving down lands it directly after the
    /// row that previously sat at `to`.
    pub fn move_row(&mut self, from: usize, to: usize) {
        if from >= self.order.len() || to >= self.order.len() || from == to {
            return;
        }
        let key = self.order.remove(from);
        self.order.insert(to, key);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates rows in flat-list order.
    pub fn iter(&self) -> impl Iterator<Item = (RowKey, &Row)> + '_ {
        self.order
            .iter()
            .filter_map(|&key| self.rows.get(key).map(|row| (key, row)))
    }

    /// Iterates rows mutably, in no particular order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Row> + '_ {
        self.rows.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> Row {
        Row::new(id.to_string(), Vec::new())
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut store = RowStore::new();
        let a = store.insert(row("a"));
        let b = store.insert(row("b"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.key_of("b"), Some(b));
        assert_eq!(store.order(), &[a, b]);
        assert_eq!(store.position(b), Some(1));
    }

    #[test]
    fn test_remove_many_keeps_order_of_survivors() {
        let mut store = RowStore::new();
        let a = store.insert(row("a"));
        let b = store.insert(row("b"));
        let c = store.insert(row("c"));

        let removed = store.remove_many(&[b]);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id(), "b");
        assert_eq!(store.order(), &[a, c]);
        assert!(!store.contains(b));
        assert!(!store.contains_id("b"));
    }

    #[test]
    fn test_move_row() {
        let mut store = RowStore::new();
        let a = store.insert(row("a"));
        let b = store.insert(row("b"));
        let c = store.insert(row("c"));

        store.move_row(0, 2);
        assert_eq!(store.order(), &[b, c, a]);
        store.move_row(2, 0);
        assert_eq!(store.order(), &[a, b, c]);
        store.move_row(5, 0);
        assert_eq!(store.order(), &[a, b, c]);
    }
}
