//! Parent/child links between rows.
//!
//! Each row stores a parent key. [`Hierarchy::rebuild`] derives the root list
//! and every child list from those parent keys, visiting rows in flat-list
//! order. Sibling order therefore always follows the flat list, which is what
//! makes row moves reorder siblings.

use treegrid_core::logging::targets;

use super::descriptor::ParentRef;
use super::row::RowKey;
use super::store::RowStore;

/// Root list and structural queries over a [`RowStore`].
#[derive(Debug, Default)]
pub struct Hierarchy {
    roots: Vec<RowKey>,
}

impl Hierarchy {
    /// Creates an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Root rows in flat-list order.
    pub fn roots(&self) -> &[RowKey] {
        &self.roots
    }

    /// Recomputes child lists, the root list and row levels.
    ///
    /// Rows whose parent no longer exists are promoted to roots.
    pub fn rebuild(&mut self, store: &mut RowStore) {
        let links: Vec<(RowKey, Option<RowKey>)> = store
            .iter()
            .map(|(key, row)| (key, row.parent))
            .collect();

        for row in store.values_mut() {
            row.children.clear();
        }
        self.roots.clear();

        for (key, parent) in links {
            let attached = match parent {
                Some(parent) => match store.get_mut(parent) {
                    Some(parent_row) => {
                        parent_row.children.push(key);
                        true
                    }
                    None => false,
                },
                None => false,
            };
            if !attached {
                if let Some(row) = store.get_mut(key) {
                    row.parent = None;
                }
                self.roots.push(key);
            }
        }

        let mut stack: Vec<(RowKey, usize)> = self.roots.iter().map(|&k| (k, 0)).collect();
        while let Some((key, level)) = stack.pop() {
            if let Some(row) = store.get_mut(key) {
                row.level = level;
                stack.extend(row.children.iter().map(|&child| (child, level + 1)));
            }
        }

        tracing::trace!(
            target: targets::HIERARCHY,
            rows = store.len(),
            roots = self.roots.len(),
            "hierarchy rebuilt"
        );
    }

    /// Resolves a parent reference for `child`.
    ///
    /// Returns `None` (root row) when the reference is absent, does not
    /// resolve to a live row, or would make `child` its own ancestor.
    pub fn resolve_parent(
        store: &RowStore,
        parent: Option<&ParentRef>,
        child: RowKey,
    ) -> Option<RowKey> {
        let parent_ref = parent?;
        let resolved = match parent_ref {
            ParentRef::ById(id) | ParentRef::ByKey { id } => store.key_of(id),
            ParentRef::Resolved(key) => Some(*key).filter(|&k| store.contains(k)),
            ParentRef::Unresolvable(_) => None,
        };

        let Some(key) = resolved else {
            tracing::warn!(
                target: targets::HIERARCHY,
                ?parent_ref,
                "parent row not found, treating row as root"
            );
            return None;
        };

        if key == child || Self::is_ancestor(store, child, key) {
            tracing::warn!(
                target: targets::HIERARCHY,
                ?parent_ref,
                "parent row would create a cycle, treating row as root"
            );
            return None;
        }
        Some(key)
    }

    /// Returns `true` if `ancestor` is a proper ancestor of `key`.
    pub fn is_ancestor(store: &RowStore, ancestor: RowKey, key: RowKey) -> bool {
        let mut current = store.get(key).and_then(|row| row.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = store.get(parent).and_then(|row| row.parent);
        }
        false
    }

    /// Ancestors of `key`, nearest first.
    pub fn ancestors(store: &RowStore, key: RowKey) -> Vec<RowKey> {
        let mut result = Vec::new();
        let mut current = store.get(key).and_then(|row| row.parent);
        while let Some(parent) = current {
            result.push(parent);
            current = store.get(parent).and_then(|row| row.parent);
        }
        result
    }

    /// Descendants of `key` in depth-first pre-order, excluding `key`.
    pub fn descendants(store: &RowStore, key: RowKey) -> Vec<RowKey> {
        let mut result = Vec::new();
        let mut stack: Vec<RowKey> = match store.get(key) {
            Some(row) => row.children.iter().rev().copied().collect(),
            None => return result,
        };
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(row) = store.get(current) {
                stack.extend(row.children.iter().rev().copied());
            }
        }
        result
    }

    /// `key` and its descendants in post-order (children before parents).
    pub fn post_order(store: &RowStore, key: RowKey) -> Vec<RowKey> {
        if !store.contains(key) {
            return Vec::new();
        }
        // Reversed pre-order visits every child before its parent.
        let mut post: Vec<RowKey> = Self::descendants(store, key).into_iter().rev().collect();
        post.push(key);
        post
    }

    /// Rows sharing the parent of `key` (including `key`), in sibling order.
    pub fn siblings<'a>(&'a self, store: &'a RowStore, key: RowKey) -> &'a [RowKey] {
        match store.get(key).and_then(|row| row.parent) {
            Some(parent) => store.get(parent).map_or(&[][..], |row| row.children.as_slice()),
            None => &self.roots,
        }
    }
}
