// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus transitions and their propagation up the tree.
//!
//! A transition from `old` to `new` runs in this order:
//! 1. Every ancestor of `old` records the child it was reached through as
//!    its last focused child.
//! 2. The focused key switches to `new`, then `old` is blurred and `new` is
//!    focused (`on_update_focus`, `on_became_blurred`, `on_became_focused`).
//! 3. Ancestors that no longer contain the focus lose `has_focused_child`,
//!    then ancestors that newly contain it gain it. All flags are updated
//!    before the first ancestor handler runs.
//!
//! A handler that moves focus starts a nested transition; the outer one stops
//! at that point.

use smallvec::SmallVec;

use crate::measure::Measure;
use crate::navigator::SpatialNavigation;
use crate::node::{FocusDetails, FocusFlags, FocusKey};

/// How a requested key maps to the node that receives focus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Resolve {
    /// Descend to the deepest focusable target.
    Deepest,
    /// Focus the requested key as is.
    Exact,
}

impl<M: Measure> SpatialNavigation<M> {
    /// Focus `key`, descending into its subtree to the deepest target.
    ///
    /// Does nothing unless the engine is enabled. The key need not be
    /// registered yet; a node registering under it later picks focus up.
    pub fn set_focus(&mut self, key: &str, details: FocusDetails) {
        self.apply_focus(key, details, Resolve::Deepest);
    }

    /// Focus exactly `key`, without descending into its children.
    pub fn steal_focus(&mut self, key: &str, details: FocusDetails) {
        self.apply_focus(key, details, Resolve::Exact);
    }

    pub(crate) fn apply_focus(&mut self, requested: &str, details: FocusDetails, resolve: Resolve) {
        if !self.enabled {
            return;
        }
        let old = self.focus_key.clone();
        let new = match resolve {
            Resolve::Deepest => self.resolve_deepest_focus_target(requested),
            Resolve::Exact => requested.into(),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(requested, target = %new, "set focus");

        if let Some(old) = &old {
            self.registry.update_layout(&self.measure, old);
            self.update_parents_last_focused_child(old);
        }
        if new == requested {
            self.registry.update_layout(&self.measure, &new);
        }

        // Handlers may move focus elsewhere; the nested transition then owns
        // all remaining bookkeeping.
        if self.set_current_focused_key(&new, &details) {
            self.update_parents_has_focused_child(&new, &details);
        }
    }

    fn holds_focus(&self, key: &str) -> bool {
        self.focus_key.as_deref() == Some(key)
    }

    /// Switch the focused key and fire blur/focus handlers.
    ///
    /// Returns `false` if a handler moved focus away from `new`.
    fn set_current_focused_key(&mut self, new: &str, details: &FocusDetails) -> bool {
        let old = self.focus_key.replace(new.into());

        if let Some(old) = old.filter(|old| old != new)
            && let Some(node) = self.registry.get_mut(&old)
            && node.focused
        {
            node.focused = false;
            let notify = node.handlers.on_update_focus.clone();
            let blurred = node.handlers.on_became_blurred.clone();
            let layout = node.layout;
            let props = node.props();
            if let Some(notify) = notify {
                notify(false);
            }
            if let Some(blurred) = blurred {
                blurred(self, layout, &props, details);
                if !self.holds_focus(new) {
                    return false;
                }
            }
        }

        let Some(node) = self.registry.get_mut(new) else {
            return true;
        };
        node.focused = true;
        let notify = node.handlers.on_update_focus.clone();
        let focused = node.handlers.on_became_focused.clone();
        let layout = node.layout;
        let props = node.props();
        if let Some(notify) = notify {
            notify(true);
        }
        if let Some(focused) = focused {
            focused(self, layout, &props, details);
        }
        self.holds_focus(new)
    }

    fn update_parents_has_focused_child(&mut self, new: &str, details: &FocusDetails) {
        let chain = self.registry.ancestors(new);
        let previous = core::mem::replace(&mut self.parents_having_focused_child, chain.clone());

        // Cleared ancestors first, then newly added ones.
        let changes: SmallVec<[(FocusKey, bool); 8]> = previous
            .iter()
            .filter(|k| !chain.contains(*k))
            .map(|k| (k.clone(), false))
            .chain(
                chain
                    .iter()
                    .filter(|k| !previous.contains(*k))
                    .map(|k| (k.clone(), true)),
            )
            .collect();

        // Flags settle before any handler runs.
        for (key, value) in &changes {
            if let Some(node) = self.registry.get_mut(key) {
                node.has_focused_child = *value;
            }
        }
        for (key, value) in &changes {
            self.notify_has_focused_child(key, *value, details);
            if !self.holds_focus(new) {
                return;
            }
        }
    }

    /// Set an ancestor's `has_focused_child` and notify it.
    pub(crate) fn mark_has_focused_child(
        &mut self,
        key: &str,
        value: bool,
        details: &FocusDetails,
    ) {
        let Some(node) = self.registry.get_mut(key) else {
            return;
        };
        node.has_focused_child = value;
        self.notify_has_focused_child(key, value, details);
    }

    /// Owners hear about the change only with [`FocusFlags::TRACK_CHILDREN`].
    /// Focusable ancestors also get `on_became_focused` / `on_became_blurred`
    /// with a freshly measured layout.
    fn notify_has_focused_child(&mut self, key: &str, value: bool, details: &FocusDetails) {
        let Some(node) = self.registry.get(key) else {
            return;
        };
        let notify = if node.has_flag(FocusFlags::TRACK_CHILDREN) {
            node.handlers.on_update_has_focused_child.clone()
        } else {
            None
        };
        let callback = match (node.focusable(), value) {
            (false, _) => None,
            (true, true) => node.handlers.on_became_focused.clone(),
            (true, false) => node.handlers.on_became_blurred.clone(),
        };

        if let Some(notify) = notify {
            notify(value);
        }
        if let Some(callback) = callback {
            self.registry.update_layout(&self.measure, key);
            if let Some(node) = self.registry.get(key) {
                let layout = node.layout;
                let props = node.props();
                callback(self, layout, &props, details);
            }
        }
    }

    fn update_parents_last_focused_child(&mut self, old: &str) {
        let mut child: FocusKey = old.into();
        for parent_key in self.registry.ancestors(old) {
            if let Some(parent) = self.registry.get_mut(&parent_key) {
                parent.last_focused_child_key = Some(child);
            }
            child = parent_key;
        }
    }
}
