// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node records, registration input, and per-node handler slots.

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use kurbo::Rect;

use crate::geometry::Direction;
use crate::keys::{PressedKeys, RawKey};
use crate::measure::Measure;
use crate::navigator::SpatialNavigation;

/// Unique identifier of a registered node.
pub type FocusKey = String;

/// Parent key of top-level nodes. Never a registered node itself.
pub const ROOT_FOCUS_KEY: &str = "SN:ROOT";

bitflags::bitflags! {
    /// Per-node navigation options.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FocusFlags: u8 {
        /// Node can receive focus and is a navigation candidate.
        const FOCUSABLE                 = 0b0000_0001;
        /// Navigation never escalates past this node's children.
        const BLOCK_NAVIGATION_OUT      = 0b0000_0010;
        /// Owner is notified when `has_focused_child` changes.
        const TRACK_CHILDREN            = 0b0000_0100;
        /// Entering this node ignores the last focused child.
        const FORGET_LAST_FOCUSED_CHILD = 0b0000_1000;
        /// Focus returns here when the focused child unregisters.
        const AUTO_RESTORE_FOCUS        = 0b0001_0000;
        /// Children registering while this node is focused take focus.
        const AUTO_DELAY_FOCUS_TO_CHILD = 0b0010_0000;
    }
}

impl Default for FocusFlags {
    fn default() -> Self {
        Self::FOCUSABLE | Self::AUTO_RESTORE_FOCUS
    }
}

/// Public view of a node handed to its handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusableProps {
    /// The node's key.
    pub focus_key: FocusKey,
    /// Key of the enclosing node, or [`ROOT_FOCUS_KEY`].
    pub parent_focus_key: FocusKey,
    /// Whether the node holds focus.
    pub focused: bool,
    /// Whether a descendant holds focus.
    pub has_focused_child: bool,
}

/// Extra information about what caused a focus change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusDetails {
    /// The raw key that triggered navigation, if any.
    pub key: Option<RawKey>,
}

/// Result of a press handler.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Let the engine run its default behavior.
    #[default]
    Continue,
    /// Suppress the default behavior.
    ///
    /// For arrow presses this cancels navigation. For back presses it leaves
    /// the event unconsumed so the host may propagate it further.
    Stop,
}

/// Enter press handler.
pub type EnterPressHandler<M> =
    Rc<dyn Fn(&mut SpatialNavigation<M>, &FocusableProps, &PressedKeys)>;
/// Enter release handler.
pub type EnterReleaseHandler<M> = Rc<dyn Fn(&mut SpatialNavigation<M>, &FocusableProps)>;
/// Back press handler.
pub type BackPressHandler<M> =
    Rc<dyn Fn(&mut SpatialNavigation<M>, &FocusableProps, &PressedKeys) -> Outcome>;
/// Arrow press handler, called before navigation.
pub type ArrowPressHandler<M> =
    Rc<dyn Fn(&mut SpatialNavigation<M>, Direction, &FocusableProps, &PressedKeys) -> Outcome>;
/// Focus or blur handler, called with the node's cached layout.
pub type FocusChangeHandler<M> =
    Rc<dyn Fn(&mut SpatialNavigation<M>, Rect, &FocusableProps, &FocusDetails)>;
/// Owner notification for a boolean state change.
pub type StateHandler = Rc<dyn Fn(bool)>;

/// Capability table of optional handlers attached to a node.
///
/// Handlers receive the engine, so they may call back into it (for example
/// `navigate_by_direction` from an arrow handler). Replace the table with
/// [`SpatialNavigation::set_handlers`] instead of capturing mutable state.
pub struct Handlers<M: Measure> {
    /// Enter key pressed while this node is focused.
    pub on_enter_press: Option<EnterPressHandler<M>>,
    /// Enter key released while this node is focused.
    pub on_enter_release: Option<EnterReleaseHandler<M>>,
    /// Back key pressed while this node is focused.
    pub on_back_press: Option<BackPressHandler<M>>,
    /// Arrow key pressed while this node is focused.
    pub on_arrow_press: Option<ArrowPressHandler<M>>,
    /// Node (or, for focusable ancestors, its subtree) gained focus.
    pub on_became_focused: Option<FocusChangeHandler<M>>,
    /// Node (or, for focusable ancestors, its subtree) lost focus.
    pub on_became_blurred: Option<FocusChangeHandler<M>>,
    /// The node's own `focused` state changed.
    pub on_update_focus: Option<StateHandler>,
    /// The node's `has_focused_child` state changed (only with
    /// [`FocusFlags::TRACK_CHILDREN`]).
    pub on_update_has_focused_child: Option<StateHandler>,
}

impl<M: Measure> Default for Handlers<M> {
    fn default() -> Self {
        Self {
            on_enter_press: None,
            on_enter_release: None,
            on_back_press: None,
            on_arrow_press: None,
            on_became_focused: None,
            on_became_blurred: None,
            on_update_focus: None,
            on_update_has_focused_child: None,
        }
    }
}

impl<M: Measure> Clone for Handlers<M> {
    fn clone(&self) -> Self {
        Self {
            on_enter_press: self.on_enter_press.clone(),
            on_enter_release: self.on_enter_release.clone(),
            on_back_press: self.on_back_press.clone(),
            on_arrow_press: self.on_arrow_press.clone(),
            on_became_focused: self.on_became_focused.clone(),
            on_became_blurred: self.on_became_blurred.clone(),
            on_update_focus: self.on_update_focus.clone(),
            on_update_has_focused_child: self.on_update_has_focused_child.clone(),
        }
    }
}

impl<M: Measure> fmt::Debug for Handlers<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("on_enter_press", &self.on_enter_press.is_some())
            .field("on_enter_release", &self.on_enter_release.is_some())
            .field("on_back_press", &self.on_back_press.is_some())
            .field("on_arrow_press", &self.on_arrow_press.is_some())
            .field("on_became_focused", &self.on_became_focused.is_some())
            .field("on_became_blurred", &self.on_became_blurred.is_some())
            .field("on_update_focus", &self.on_update_focus.is_some())
            .field(
                "on_update_has_focused_child",
                &self.on_update_has_focused_child.is_some(),
            )
            .finish()
    }
}

impl<M: Measure> Handlers<M> {
    /// Builder: set the enter press handler.
    #[must_use]
    pub fn enter_press(
        mut self,
        f: impl Fn(&mut SpatialNavigation<M>, &FocusableProps, &PressedKeys) + 'static,
    ) -> Self {
        self.on_enter_press = Some(Rc::new(f));
        self
    }

    /// Builder: set the enter release handler.
    #[must_use]
    pub fn enter_release(
        mut self,
        f: impl Fn(&mut SpatialNavigation<M>, &FocusableProps) + 'static,
    ) -> Self {
        self.on_enter_release = Some(Rc::new(f));
        self
    }

    /// Builder: set the back press handler.
    #[must_use]
    pub fn back_press(
        mut self,
        f: impl Fn(&mut SpatialNavigation<M>, &FocusableProps, &PressedKeys) -> Outcome + 'static,
    ) -> Self {
        self.on_back_press = Some(Rc::new(f));
        self
    }

    /// Builder: set the arrow press handler.
    #[must_use]
    pub fn arrow_press(
        mut self,
        f: impl Fn(&mut SpatialNavigation<M>, Direction, &FocusableProps, &PressedKeys) -> Outcome
        + 'static,
    ) -> Self {
        self.on_arrow_press = Some(Rc::new(f));
        self
    }

    /// Builder: set the focus handler.
    #[must_use]
    pub fn became_focused(
        mut self,
        f: impl Fn(&mut SpatialNavigation<M>, Rect, &FocusableProps, &FocusDetails) + 'static,
    ) -> Self {
        self.on_became_focused = Some(Rc::new(f));
        self
    }

    /// Builder: set the blur handler.
    #[must_use]
    pub fn became_blurred(
        mut self,
        f: impl Fn(&mut SpatialNavigation<M>, Rect, &FocusableProps, &FocusDetails) + 'static,
    ) -> Self {
        self.on_became_blurred = Some(Rc::new(f));
        self
    }

    /// Builder: set the focused-state notification.
    #[must_use]
    pub fn update_focus(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.on_update_focus = Some(Rc::new(f));
        self
    }

    /// Builder: set the has-focused-child notification.
    #[must_use]
    pub fn update_has_focused_child(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.on_update_has_focused_child = Some(Rc::new(f));
        self
    }
}

/// Everything a binding layer supplies when a focusable element mounts.
pub struct Registration<M: Measure> {
    /// Requested key; one is generated when `None`.
    pub focus_key: Option<FocusKey>,
    /// Key of the enclosing focusable node.
    pub parent_focus_key: FocusKey,
    /// Handle passed to the [`Measure`] implementation.
    pub element: Option<M::Element>,
    /// Navigation options.
    pub flags: FocusFlags,
    /// Child to enter when this node gains focus with no history.
    pub preferred_child_focus_key: Option<FocusKey>,
    /// Handler slots.
    pub handlers: Handlers<M>,
}

impl<M: Measure> Default for Registration<M> {
    fn default() -> Self {
        Self {
            focus_key: None,
            parent_focus_key: ROOT_FOCUS_KEY.into(),
            element: None,
            flags: FocusFlags::default(),
            preferred_child_focus_key: None,
            handlers: Handlers::default(),
        }
    }
}

impl<M: Measure> fmt::Debug for Registration<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("focus_key", &self.focus_key)
            .field("parent_focus_key", &self.parent_focus_key)
            .field("flags", &self.flags)
            .field("preferred_child_focus_key", &self.preferred_child_focus_key)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

/// Volatile fields refreshed on every render of a mounted element.
#[derive(Clone, Debug)]
pub struct NodeUpdate<E> {
    /// New element handle; `None` keeps the current one.
    pub element: Option<E>,
    /// Preferred child key.
    pub preferred_child_focus_key: Option<FocusKey>,
    /// Whether the node can receive focus.
    pub focusable: bool,
    /// Whether navigation may escalate past this node's children.
    pub block_navigation_out: bool,
}

/// Stored record for a registered node.
pub(crate) struct FocusNode<M: Measure> {
    pub(crate) focus_key: FocusKey,
    pub(crate) parent_focus_key: FocusKey,
    pub(crate) flags: FocusFlags,
    pub(crate) preferred_child_focus_key: Option<FocusKey>,
    pub(crate) last_focused_child_key: Option<FocusKey>,
    pub(crate) layout: Rect,
    pub(crate) element: Option<M::Element>,
    pub(crate) handlers: Handlers<M>,
    pub(crate) focused: bool,
    pub(crate) has_focused_child: bool,
}

impl<M: Measure> fmt::Debug for FocusNode<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusNode")
            .field("focus_key", &self.focus_key)
            .field("parent_focus_key", &self.parent_focus_key)
            .field("flags", &self.flags)
            .field("last_focused_child_key", &self.last_focused_child_key)
            .field("layout", &self.layout)
            .field("focused", &self.focused)
            .field("has_focused_child", &self.has_focused_child)
            .finish_non_exhaustive()
    }
}

impl<M: Measure> FocusNode<M> {
    pub(crate) fn new(focus_key: FocusKey, reg: Registration<M>) -> Self {
        Self {
            focus_key,
            parent_focus_key: reg.parent_focus_key,
            flags: reg.flags,
            preferred_child_focus_key: reg.preferred_child_focus_key,
            last_focused_child_key: None,
            layout: Rect::ZERO,
            element: reg.element,
            handlers: reg.handlers,
            focused: false,
            has_focused_child: false,
        }
    }

    pub(crate) fn focusable(&self) -> bool {
        self.flags.contains(FocusFlags::FOCUSABLE)
    }

    pub(crate) fn has_flag(&self, flag: FocusFlags) -> bool {
        self.flags.contains(flag)
    }

    pub(crate) fn props(&self) -> FocusableProps {
        FocusableProps {
            focus_key: self.focus_key.clone(),
            parent_focus_key: self.parent_focus_key.clone(),
            focused: self.focused,
            has_focused_child: self.has_focused_child,
        }
    }
}
