// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parse errors for textual directions and actions.

use alloc::string::String;

/// Error returned when a string does not name a known direction or action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Only `up`, `down`, `left` and `right` are directions.
    #[error("invalid direction `{0}`, expected one of: up, down, left, right")]
    UnknownDirection(String),
    /// Directions plus `enter` and `back` are actions.
    #[error("invalid action `{0}`, expected one of: left, up, right, down, enter, back")]
    UnknownAction(String),
}
