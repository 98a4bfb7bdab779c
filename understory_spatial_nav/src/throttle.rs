// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leading-edge key-down throttle.
//!
//! Time is supplied by the caller as milliseconds on any monotonic clock, so
//! the throttle stays deterministic and `no_std`.

/// Lets at most one event through per interval.
///
/// The first event in a window fires immediately; later events in the same
/// window are dropped, and nothing fires at the trailing edge.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval_ms: u64,
    last_fired: Option<u64>,
}

impl Throttle {
    /// Create a throttle with the given interval in milliseconds.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired: None,
        }
    }

    /// The configured interval.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns `true` if an event at `now_ms` may fire, and opens a new window if so.
    pub fn try_fire(&mut self, now_ms: u64) -> bool {
        let open = match self.last_fired {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if open {
            self.last_fired = Some(now_ms);
        }
        open
    }

    /// Close the current window so the next event fires immediately.
    pub fn cancel(&mut self) {
        self.last_fired = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_edge_only() {
        let mut t = Throttle::new(100);
        assert!(t.try_fire(1_000));
        assert!(!t.try_fire(1_050));
        assert!(!t.try_fire(1_099));
        assert!(t.try_fire(1_100));
        assert!(!t.try_fire(1_150));
    }

    #[test]
    fn cancel_reopens_window() {
        let mut t = Throttle::new(100);
        assert!(t.try_fire(0));
        t.cancel();
        assert!(t.try_fire(10));
    }
}
