// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key → node storage with tree queries and the layout cache.
//!
//! Lookup by key is O(1). Children are found by filtering all nodes on their
//! parent key, which is O(n) in the number of registered nodes; trees are
//! expected to stay in the hundreds of nodes. Iteration follows registration
//! order, which is also the tie-break order for candidate ranking.

use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::measure::{Measure, normalize};
use crate::node::{FocusKey, FocusNode};

/// Ancestor chain, nearest first.
pub(crate) type Chain = SmallVec<[FocusKey; 8]>;

pub(crate) struct Registry<M: Measure> {
    nodes: HashMap<FocusKey, FocusNode<M>>,
    order: Vec<FocusKey>,
}

impl<M: Measure> core::fmt::Debug for Registry<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("nodes", &self.nodes.len())
            .field("order", &self.order)
            .finish()
    }
}

impl<M: Measure> Default for Registry<M> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<M: Measure> Registry<M> {
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&FocusNode<M>> {
        self.nodes.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut FocusNode<M>> {
        self.nodes.get_mut(key)
    }

    /// Insert or replace. A replaced record keeps its registration position.
    pub(crate) fn insert(&mut self, node: FocusNode<M>) -> Option<FocusNode<M>> {
        let key = node.focus_key.clone();
        let old = self.nodes.insert(key.clone(), node);
        if old.is_none() {
            self.order.push(key);
        }
        old
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<FocusNode<M>> {
        let node = self.nodes.remove(key)?;
        self.order.retain(|k| k != key);
        Some(node)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.order.clear();
    }

    /// Keys in registration order.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &FocusKey> + '_ {
        self.order.iter()
    }

    /// Direct children of `parent`, in registration order.
    pub(crate) fn children<'a>(
        &'a self,
        parent: &'a str,
    ) -> impl Iterator<Item = &'a FocusNode<M>> + 'a {
        self.order
            .iter()
            .filter_map(|k| self.nodes.get(k))
            .filter(move |n| n.parent_focus_key == parent)
    }

    /// Keys of the focusable direct children of `parent`.
    pub(crate) fn focusable_children(&self, parent: &str) -> Vec<FocusKey> {
        self.children(parent)
            .filter(|n| n.focusable())
            .map(|n| n.focus_key.clone())
            .collect()
    }

    pub(crate) fn is_focusable(&self, key: &str) -> bool {
        self.nodes.get(key).is_some_and(|n| n.focusable())
    }

    /// Registered ancestors of `key`, nearest first.
    ///
    /// The walk stops at the first parent key that is not registered (normally
    /// the root), and on any revisited key.
    pub(crate) fn ancestors(&self, key: &str) -> Chain {
        let mut chain = Chain::new();
        let Some(mut current) = self.nodes.get(key) else {
            return chain;
        };
        while let Some(parent) = self.nodes.get(&current.parent_focus_key) {
            if parent.focus_key == key || chain.contains(&parent.focus_key) {
                #[cfg(feature = "tracing")]
                tracing::warn!(key, "parent chain loops back on itself");
                break;
            }
            chain.push(parent.focus_key.clone());
            current = parent;
        }
        chain
    }

    /// Whether `candidate` is a parent link on `key`'s ancestor chain.
    ///
    /// Unlike [`Self::ancestors`], `candidate` itself need not be registered.
    pub(crate) fn is_ancestor_key(&self, key: &str, candidate: &str) -> bool {
        let mut current = self.nodes.get(key);
        let mut steps = 0;
        while let Some(node) = current {
            if node.parent_focus_key == candidate {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
            current = self.nodes.get(&node.parent_focus_key);
        }
        false
    }

    /// Re-measure `key` and overwrite its cached layout.
    ///
    /// Returns `false` if the node is missing or could not be measured.
    pub(crate) fn update_layout(&mut self, measure: &M, key: &str) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            return false;
        };
        let Some(rect) = node.element.as_ref().and_then(|e| measure.measure(e)) else {
            return false;
        };
        node.layout = normalize(rect);
        true
    }
}
