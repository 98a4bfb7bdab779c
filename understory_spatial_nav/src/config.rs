// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration applied by [`SpatialNavigation::init`](crate::SpatialNavigation::init).

/// Options accepted at initialization.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Minimum spacing between handled key-down events, in milliseconds.
    ///
    /// `0` disables throttling.
    pub throttle_interval_ms: u64,
    /// Throttle every key-down, including discrete presses.
    ///
    /// When `false`, each key-up reopens the throttle window, so only held
    /// (auto-repeating) keys are throttled.
    pub throttle_all_keypresses: bool,
}
