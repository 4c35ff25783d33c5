//! Stateless preorder traversal of the namespace.
//!
//! [`next_node`] computes the successor of a cursor the caller owns, so a walk
//! can stop early and resume from any node. The root itself is never yielded.

use crate::namespace::{NamespaceStore, NodeId};

/// Returns the node after `node` in depth-first preorder.
///
/// `None` starts a walk at the root's first child. With `descend` unset the
/// children of `node` are skipped. Returns `None` once the walk climbs past
/// the root.
pub fn next_node<S: NamespaceStore + ?Sized>(
    store: &S,
    node: Option<NodeId>,
    descend: bool,
) -> Option<NodeId> {
    let Some(mut node) = node else {
        return store.first_child(store.root());
    };

    if descend {
        if let Some(child) = store.first_child(node) {
            return Some(child);
        }
    }

    loop {
        if let Some(next) = store.next_sibling(node) {
            return Some(next);
        }
        node = store.parent(node)?;
    }
}

/// Iterator over every node below the root, in preorder.
pub struct Walk<'a, S: NamespaceStore + ?Sized> {
    store: &'a S,
    cursor: Option<NodeId>,
    done: bool,
}

impl<'a, S: NamespaceStore + ?Sized> Walk<'a, S> {
    /// Starts a walk over the whole namespace.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            cursor: None,
            done: false,
        }
    }
}

impl<S: NamespaceStore + ?Sized> Iterator for Walk<'_, S> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.done {
            return None;
        }
        self.cursor = next_node(self.store, self.cursor, true);
        self.done = self.cursor.is_none();
        self.cursor
    }
}
