// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Spatial Nav: remote-control style directional focus navigation.
//!
//! Focusable elements register as nodes in a tree keyed by string
//! [`FocusKey`]s. Exactly one node holds focus at a time, and arrow input
//! moves it to the geometrically best sibling in that direction:
//!
//! - Candidates are the focusable **siblings** of the focused node that lie
//!   ahead of it in the requested [`Direction`].
//! - A [`FocusPolicy`] ranks them ([`DefaultPolicy`] weights the distance
//!   along the movement axis, the perpendicular offset, and how much the two
//!   edges overlap).
//! - With no candidate, the search **escalates** to the parent's siblings
//!   unless the parent sets [`FocusFlags::BLOCK_NAVIGATION_OUT`].
//! - Focusing a container **descends** into it: last focused child, then the
//!   preferred child, then the child nearest the coordinate origin.
//!
//! Layout is read through the [`Measure`] trait, so the engine never touches
//! a rendering tree directly. [`StaticMeasure`] treats the element handle as
//! the rectangle itself, which is what tests and simple hosts need.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_spatial_nav::{
//!     Config, FocusDetails, KeyOutcome, Registration, SpatialNavigation, StaticMeasure,
//! };
//!
//! let mut nav = SpatialNavigation::new(StaticMeasure);
//! nav.init(Config::default());
//!
//! // A row of two buttons.
//! for (key, x) in [("play", 0.0), ("pause", 120.0)] {
//!     nav.register(Registration {
//!         focus_key: Some(key.into()),
//!         element: Some(Rect::new(x, 0.0, x + 100.0, 40.0)),
//!         ..Registration::default()
//!     });
//! }
//! nav.set_focus("play", FocusDetails::default());
//!
//! // ArrowRight (key code 39) at t = 0 ms.
//! assert_eq!(nav.key_down(39_u32, 0), KeyOutcome::Consumed);
//! assert_eq!(nav.current_focus_key(), Some("pause"));
//! ```
//!
//! ## Handlers
//!
//! Each node carries optional [`Handlers`]. They receive the engine by
//! mutable reference and may call back into it, so an arrow handler can
//! redirect focus and return [`Outcome::Stop`] to cancel the default move.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//! - `tracing`: emits navigation diagnostics through the `tracing` crate.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod error;
mod focus;
pub mod geometry;
mod keys;
mod measure;
mod navigator;
mod node;
mod policy;
mod registry;
mod router;
mod throttle;

pub use config::Config;
pub use error::ParseError;
pub use geometry::{Direction, OVERLAP_THRESHOLD};
pub use keys::{Action, KeyMap, PressedKeys, RawKey};
pub use measure::{Measure, Offsets, StaticMeasure, document_rect};
pub use navigator::SpatialNavigation;
pub use node::{
    ArrowPressHandler, BackPressHandler, EnterPressHandler, EnterReleaseHandler,
    FocusChangeHandler, FocusDetails, FocusFlags, FocusKey, FocusableProps, Handlers, NodeUpdate,
    Outcome, ROOT_FOCUS_KEY, Registration, StateHandler,
};
pub use policy::{DefaultPolicy, FocusEntry, FocusPolicy, FocusSpace};
pub use router::KeyOutcome;
pub use throttle::Throttle;
