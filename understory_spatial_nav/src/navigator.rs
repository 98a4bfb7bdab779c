// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The navigation engine: lifecycle, registration API, and directional search.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::config::Config;
use crate::focus::Resolve;
use crate::geometry::{Direction, distance_from_origin};
use crate::keys::{Action, KeyMap, PressedKeys, RawKey};
use crate::measure::Measure;
use crate::node::{
    FocusDetails, FocusFlags, FocusKey, FocusNode, Handlers, NodeUpdate, Registration,
};
use crate::policy::{DefaultPolicy, FocusEntry, FocusPolicy, FocusSpace};
use crate::registry::{Chain, Registry};
use crate::throttle::Throttle;

/// Spatial navigation engine.
///
/// One instance owns a tree of focusable nodes, the current focus, and the
/// key-routing state. It is single-threaded: every operation runs to
/// completion synchronously, and handlers may call back into the engine.
///
/// A fresh engine is disabled. Call [`Self::init`] before focusing or routing
/// keys; [`Self::destroy`] returns it to the fresh state.
///
/// ## Example
///
/// ```rust
/// use kurbo::Rect;
/// use understory_spatial_nav::{
///     Config, Direction, FocusDetails, Registration, SpatialNavigation, StaticMeasure,
/// };
///
/// let mut nav = SpatialNavigation::new(StaticMeasure);
/// nav.init(Config::default());
///
/// for (key, rect) in [
///     ("a", Rect::new(0.0, 0.0, 10.0, 10.0)),
///     ("b", Rect::new(20.0, 0.0, 30.0, 10.0)),
///     ("c", Rect::new(0.0, 20.0, 10.0, 30.0)),
/// ] {
///     nav.register(Registration {
///         focus_key: Some(key.into()),
///         element: Some(rect),
///         ..Registration::default()
///     });
/// }
///
/// nav.set_focus("a", FocusDetails::default());
/// nav.navigate_by_direction(Direction::Right, FocusDetails::default());
/// assert_eq!(nav.current_focus_key(), Some("b"));
/// ```
pub struct SpatialNavigation<M: Measure> {
    pub(crate) measure: M,
    pub(crate) registry: Registry<M>,
    pub(crate) focus_key: Option<FocusKey>,
    pub(crate) parents_having_focused_child: Chain,
    pub(crate) enabled: bool,
    pub(crate) paused: bool,
    pub(crate) throttle: Option<Throttle>,
    pub(crate) throttle_all_keypresses: bool,
    pub(crate) pressed_keys: PressedKeys,
    pub(crate) key_map: KeyMap,
    policy: Box<dyn FocusPolicy<usize>>,
    next_id: u64,
}

impl<M: Measure> fmt::Debug for SpatialNavigation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialNavigation")
            .field("registry", &self.registry)
            .field("focus_key", &self.focus_key)
            .field("enabled", &self.enabled)
            .field("paused", &self.paused)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

impl<M: Measure> SpatialNavigation<M> {
    /// Create a disabled engine that measures layouts with `measure`.
    pub fn new(measure: M) -> Self {
        Self {
            measure,
            registry: Registry::default(),
            focus_key: None,
            parents_having_focused_child: Chain::new(),
            enabled: false,
            paused: false,
            throttle: None,
            throttle_all_keypresses: false,
            pressed_keys: PressedKeys::default(),
            key_map: KeyMap::default(),
            policy: Box::new(DefaultPolicy::default()),
            next_id: 0,
        }
    }

    /// Enable the engine. Calling it again while enabled does nothing.
    pub fn init(&mut self, config: Config) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        self.throttle_all_keypresses = config.throttle_all_keypresses;
        self.throttle = (config.throttle_interval_ms > 0)
            .then(|| Throttle::new(config.throttle_interval_ms));
    }

    /// Disable the engine and drop all nodes, focus, and key state.
    ///
    /// The key map returns to its defaults. Does nothing when not enabled.
    pub fn destroy(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.throttle = None;
        self.throttle_all_keypresses = false;
        self.focus_key = None;
        self.parents_having_focused_child.clear();
        self.registry.clear();
        self.paused = false;
        self.pressed_keys.clear();
        self.key_map = KeyMap::default();
    }

    /// Whether [`Self::init`] has been called (and not undone by [`Self::destroy`]).
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Suspend key handling and navigation. Other state is untouched.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Undo [`Self::pause`].
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether navigation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Replace the key map with the defaults overridden by `overrides`.
    pub fn set_key_map<I, K>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (Action, K)>,
        K: IntoIterator<Item = RawKey>,
    {
        self.key_map = KeyMap::with_overrides(overrides);
    }

    /// The active key map.
    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    /// Replace the candidate ranking policy.
    ///
    /// Candidate ids handed to the policy are indices into the sibling list.
    pub fn set_policy(&mut self, policy: impl FocusPolicy<usize> + 'static) {
        self.policy = Box::new(policy);
    }

    /// The layout provider.
    pub fn measure(&self) -> &M {
        &self.measure
    }

    /// Mutable access to the layout provider.
    pub fn measure_mut(&mut self) -> &mut M {
        &mut self.measure
    }

    /// Key-down counts per action since the matching key-up.
    pub fn pressed_keys(&self) -> &PressedKeys {
        &self.pressed_keys
    }

    fn issue_key(&mut self) -> FocusKey {
        loop {
            self.next_id += 1;
            let key = format!("sn:focusable-item-{}", self.next_id);
            if !self.registry.contains(&key) {
                return key;
            }
        }
    }

    /// Register a focusable node and return its key.
    ///
    /// Registering an existing key replaces its record. Focus state is
    /// reconciled immediately:
    /// - if the key is the current focus, focus is re-applied to it;
    /// - if the parent is focused and has [`FocusFlags::AUTO_DELAY_FOCUS_TO_CHILD`],
    ///   the new node takes focus (only if it is the parent's preferred child,
    ///   when one is set);
    /// - if the node lies on the focused node's ancestor chain, it is marked as
    ///   having a focused child and, when focusable, receives `on_became_focused`.
    pub fn register(&mut self, registration: Registration<M>) -> FocusKey {
        let key = match registration.focus_key.clone() {
            Some(key) => key,
            None => self.issue_key(),
        };
        let parent_key = registration.parent_focus_key.clone();

        if let Some(replaced) = self.registry.insert(FocusNode::new(key.clone(), registration)) {
            #[cfg(feature = "tracing")]
            tracing::debug!(key = %key, "replaced existing registration");
            // A former parent must not descend into a node it no longer owns.
            if replaced.parent_focus_key != parent_key
                && let Some(old_parent) = self.registry.get_mut(&replaced.parent_focus_key)
                && old_parent.last_focused_child_key.as_deref() == Some(key.as_str())
            {
                old_parent.last_focused_child_key = None;
            }
        }
        self.registry.update_layout(&self.measure, &key);

        if self.focus_key.as_deref() == Some(key.as_str()) {
            self.apply_focus(&key, FocusDetails::default(), Resolve::Deepest);
        }

        if self.focus_key.as_deref() == Some(parent_key.as_str())
            && let Some(parent) = self.registry.get(&parent_key)
            && parent.has_flag(FocusFlags::AUTO_DELAY_FOCUS_TO_CHILD)
            && parent
                .preferred_child_focus_key
                .as_deref()
                .is_none_or(|preferred| preferred == key)
        {
            self.apply_focus(&key, FocusDetails::default(), Resolve::Deepest);
        }

        // Registered after its already-focused descendant.
        if let Some(focused) = self.focus_key.clone()
            && focused != key
            && self.registry.is_ancestor_key(&focused, &key)
        {
            if !self.parents_having_focused_child.contains(&key) {
                self.parents_having_focused_child.push(key.clone());
            }
            self.mark_has_focused_child(&key, true, &FocusDetails::default());
        }

        key
    }

    /// Remove a node. Returns `false` if it was not registered.
    ///
    /// The parent forgets it as last focused child. If it held focus and the
    /// parent has [`FocusFlags::AUTO_RESTORE_FOCUS`], focus moves to the parent.
    pub fn unregister(&mut self, key: &str) -> bool {
        let Some(removed) = self.registry.remove(key) else {
            return false;
        };
        self.parents_having_focused_child.retain(|k| k != key);
        let was_focused = self.focus_key.as_deref() == Some(key);

        let mut restore = false;
        if let Some(parent) = self.registry.get_mut(&removed.parent_focus_key) {
            if parent.last_focused_child_key.as_deref() == Some(key) {
                parent.last_focused_child_key = None;
            }
            restore = was_focused && parent.has_flag(FocusFlags::AUTO_RESTORE_FOCUS);
        }
        if restore {
            self.apply_focus(
                &removed.parent_focus_key,
                FocusDetails::default(),
                Resolve::Deepest,
            );
        }
        true
    }

    /// Re-measure one node. Returns `false` if it is missing or unmeasurable.
    pub fn update_layout(&mut self, key: &str) -> bool {
        self.registry.update_layout(&self.measure, key)
    }

    /// Re-measure every registered node.
    pub fn update_all_layouts(&mut self) {
        let keys: Vec<FocusKey> = self.registry.keys().cloned().collect();
        for key in &keys {
            self.registry.update_layout(&self.measure, key);
        }
    }

    /// Patch the volatile fields of a live node without touching focus state.
    pub fn update_mutable_fields(&mut self, key: &str, update: NodeUpdate<M::Element>) -> bool {
        let Some(node) = self.registry.get_mut(key) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(key, "update for unknown node");
            return false;
        };
        node.preferred_child_focus_key = update.preferred_child_focus_key;
        node.flags.set(FocusFlags::FOCUSABLE, update.focusable);
        node.flags
            .set(FocusFlags::BLOCK_NAVIGATION_OUT, update.block_navigation_out);
        if let Some(element) = update.element {
            node.element = Some(element);
        }
        true
    }

    /// Replace a live node's handler table.
    pub fn set_handlers(&mut self, key: &str, handlers: Handlers<M>) -> bool {
        let Some(node) = self.registry.get_mut(key) else {
            return false;
        };
        node.handlers = handlers;
        true
    }

    /// Key of the focused node, if any.
    ///
    /// This may name a key that is not registered yet; the focus is applied
    /// when a node with that key registers.
    pub fn current_focus_key(&self) -> Option<&str> {
        self.focus_key.as_deref()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Whether `key` is registered.
    pub fn is_registered(&self, key: &str) -> bool {
        self.registry.contains(key)
    }

    /// Whether the node is marked focused.
    pub fn is_focused(&self, key: &str) -> bool {
        self.registry.get(key).is_some_and(|n| n.focused)
    }

    /// Whether the node has a focused descendant.
    pub fn has_focused_child(&self, key: &str) -> bool {
        self.registry.get(key).is_some_and(|n| n.has_focused_child)
    }

    /// Cached layout of the node, as of its last measurement.
    pub fn layout(&self, key: &str) -> Option<Rect> {
        self.registry.get(key).map(|n| n.layout)
    }

    /// The node's remembered child.
    pub fn last_focused_child_key(&self, key: &str) -> Option<&str> {
        self.registry
            .get(key)
            .and_then(|n| n.last_focused_child_key.as_deref())
    }

    /// The node's parent key.
    pub fn parent_focus_key(&self, key: &str) -> Option<&str> {
        self.registry.get(key).map(|n| n.parent_focus_key.as_str())
    }

    /// The node's flags.
    pub fn flags(&self, key: &str) -> Option<FocusFlags> {
        self.registry.get(key).map(|n| n.flags)
    }

    /// Move focus from the current node in `direction`.
    ///
    /// Does nothing while paused, without focus, or when no candidate exists.
    pub fn navigate_by_direction(&mut self, direction: Direction, details: FocusDetails) {
        if self.paused {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(%direction, "navigate");
        self.smart_navigate(direction, &details);
    }

    /// [`Self::navigate_by_direction`] for a textual direction.
    ///
    /// Anything other than `up`, `down`, `left` or `right` is ignored.
    pub fn navigate_by_name(&mut self, direction: &str, details: FocusDetails) {
        match direction.parse::<Direction>() {
            Ok(direction) => self.navigate_by_direction(direction, details),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_err, "ignored navigation request");
            }
        }
    }

    /// Search the siblings of the focused node, escalating one level up each
    /// time no sibling qualifies.
    pub(crate) fn smart_navigate(&mut self, direction: Direction, details: &FocusDetails) {
        let Some(mut target) = self.focus_key.clone() else {
            return;
        };

        for _ in 0..=self.registry.len() {
            // The root, or a stale key.
            if !self.registry.contains(&target) {
                return;
            }
            self.registry.update_layout(&self.measure, &target);
            let Some(node) = self.registry.get(&target) else {
                return;
            };
            let origin = node.layout;
            let parent_key = node.parent_focus_key.clone();

            let siblings: Vec<FocusKey> = self
                .registry
                .children(&parent_key)
                .filter(|n| n.focusable() && n.focus_key != target)
                .map(|n| n.focus_key.clone())
                .collect();
            let mut entries = Vec::with_capacity(siblings.len());
            for (i, key) in siblings.iter().enumerate() {
                self.registry.update_layout(&self.measure, key);
                if let Some(n) = self.registry.get(key) {
                    entries.push(FocusEntry {
                        id: i,
                        rect: n.layout,
                        enabled: true,
                    });
                }
            }

            let space = FocusSpace { nodes: &entries };
            if let Some(next) = self
                .policy
                .next(origin, direction, &space)
                .and_then(|i| siblings.get(i).cloned())
            {
                #[cfg(feature = "tracing")]
                tracing::debug!(from = %target, to = %next, "sibling selected");
                self.apply_focus(&next, details.clone(), Resolve::Deepest);
                return;
            }

            if let Some(parent) = self.registry.get_mut(&parent_key) {
                parent.last_focused_child_key = Some(target.clone());
                if parent.has_flag(FocusFlags::BLOCK_NAVIGATION_OUT) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(parent = %parent_key, "navigation out blocked");
                    return;
                }
            }
            target = parent_key;
        }
    }

    /// Resolve the node that actually receives focus when `key` is requested.
    ///
    /// While the current node has focusable children, descend into, in order:
    /// the last focused child (unless the node forgets it), the preferred
    /// child, or the child whose top-left corner is nearest the coordinate
    /// origin. Unknown keys resolve to themselves.
    pub fn resolve_deepest_focus_target(&mut self, key: &str) -> FocusKey {
        let mut current: FocusKey = key.into();
        let mut visited = Chain::new();
        loop {
            let Some(node) = self.registry.get(&current) else {
                break;
            };
            let children = self.registry.focusable_children(&current);
            if children.is_empty() || visited.contains(&current) {
                break;
            }
            let remembered = node
                .last_focused_child_key
                .clone()
                .filter(|_| !node.has_flag(FocusFlags::FORGET_LAST_FOCUSED_CHILD));
            let preferred = node.preferred_child_focus_key.clone();
            visited.push(current.clone());

            let next = if let Some(last) = remembered.filter(|k| self.registry.is_focusable(k)) {
                #[cfg(feature = "tracing")]
                tracing::trace!(key = %last, "descend into last focused child");
                last
            } else if let Some(preferred) = preferred.filter(|k| self.registry.is_focusable(k)) {
                #[cfg(feature = "tracing")]
                tracing::trace!(key = %preferred, "descend into preferred child");
                preferred
            } else {
                let mut best: Option<(FocusKey, f64)> = None;
                for child in children {
                    self.registry.update_layout(&self.measure, &child);
                    let distance = self
                        .registry
                        .get(&child)
                        .map_or(f64::INFINITY, |n| distance_from_origin(n.layout));
                    if best.as_ref().is_none_or(|(_, d)| distance < *d) {
                        best = Some((child, distance));
                    }
                }
                match best {
                    Some((child, _)) => child,
                    None => break,
                }
            };
            current = next;
        }
        if current != key {
            self.registry.update_layout(&self.measure, &current);
        }
        current
    }
}
