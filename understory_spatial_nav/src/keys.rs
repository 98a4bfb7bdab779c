// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw key identifiers, semantic actions, and the table between them.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use smallvec::{SmallVec, smallvec};

use crate::error::ParseError;
use crate::geometry::Direction;

/// A raw key identifier as delivered by the host's keyboard source.
///
/// Hosts typically report either a numeric key code or a named key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawKey {
    /// Numeric key code (for example `37` for the left arrow).
    Code(u32),
    /// Named key (for example `"ArrowLeft"`).
    Named(String),
}

impl From<u32> for RawKey {
    fn from(code: u32) -> Self {
        Self::Code(code)
    }
}

impl From<&str> for RawKey {
    fn from(name: &str) -> Self {
        Self::Named(name.into())
    }
}

impl From<String> for RawKey {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// Semantic action a raw key resolves to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move left.
    Left,
    /// Move up.
    Up,
    /// Move right.
    Right,
    /// Move down.
    Down,
    /// Activate the focused node.
    Enter,
    /// Go back.
    Back,
}

impl Action {
    /// All actions, in key-map lookup order.
    pub const ALL: [Self; 6] = [
        Self::Left,
        Self::Up,
        Self::Right,
        Self::Down,
        Self::Enter,
        Self::Back,
    ];

    const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Up => 1,
            Self::Right => 2,
            Self::Down => 3,
            Self::Enter => 4,
            Self::Back => 5,
        }
    }

    /// The navigation direction for arrow actions.
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Left => Some(Direction::Left),
            Self::Up => Some(Direction::Up),
            Self::Right => Some(Direction::Right),
            Self::Down => Some(Direction::Down),
            Self::Enter | Self::Back => None,
        }
    }

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Enter => "enter",
            Self::Back => "back",
        }
    }
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
            Direction::Left => Self::Left,
            Direction::Right => Self::Right,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ParseError::UnknownAction(s.into()))
    }
}

type Bindings = SmallVec<[RawKey; 2]>;

fn default_bindings(action: Action) -> Bindings {
    let (code, name) = match action {
        Action::Left => (37, "ArrowLeft"),
        Action::Up => (38, "ArrowUp"),
        Action::Right => (39, "ArrowRight"),
        Action::Down => (40, "ArrowDown"),
        Action::Enter => (13, "Enter"),
        Action::Back => (8, "Backspace"),
    };
    smallvec![RawKey::Code(code), RawKey::from(name)]
}

/// Table from raw keys to actions.
///
/// Each action may accept several raw keys. Lookup scans actions in
/// [`Action::ALL`] order and the first match wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMap {
    bindings: [Bindings; 6],
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            bindings: Action::ALL.map(default_bindings),
        }
    }
}

impl KeyMap {
    /// Default bindings with the listed actions replaced.
    ///
    /// Actions not mentioned keep their defaults.
    pub fn with_overrides<I, K>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (Action, K)>,
        K: IntoIterator<Item = RawKey>,
    {
        let mut map = Self::default();
        for (action, keys) in overrides {
            map.set(action, keys);
        }
        map
    }

    /// Replace the raw keys accepted for `action`.
    pub fn set(&mut self, action: Action, keys: impl IntoIterator<Item = RawKey>) {
        self.bindings[action.index()] = keys.into_iter().collect();
    }

    /// Raw keys accepted for `action`.
    pub fn keys(&self, action: Action) -> &[RawKey] {
        &self.bindings[action.index()]
    }

    /// Resolve a raw key; `None` for unmapped keys.
    pub fn resolve(&self, key: &RawKey) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|a| self.bindings[a.index()].contains(key))
    }
}

/// How many key-down events each action has received since its last key-up.
///
/// Values above 1 indicate a held key (auto-repeat).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PressedKeys {
    counts: [u32; 6],
}

impl PressedKeys {
    /// Current count for `action`; zero when not held.
    pub fn get(&self, action: Action) -> u32 {
        self.counts[action.index()]
    }

    /// Actions currently held, with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (Action, u32)> + '_ {
        Action::ALL
            .into_iter()
            .map(|a| (a, self.get(a)))
            .filter(|(_, n)| *n > 0)
    }

    pub(crate) fn press(&mut self, action: Action) -> u32 {
        let n = &mut self.counts[action.index()];
        *n = n.saturating_add(1);
        *n
    }

    pub(crate) fn release(&mut self, action: Action) {
        self.counts[action.index()] = 0;
    }

    pub(crate) fn clear(&mut self) {
        self.counts = [0; 6];
    }
}
