// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw key events → actions → handlers and navigation.

use crate::geometry::Direction;
use crate::keys::{Action, PressedKeys, RawKey};
use crate::measure::Measure;
use crate::navigator::SpatialNavigation;
use crate::node::{FocusDetails, Outcome};

/// What the host should do with a key-down event after routing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not handled: the engine is disabled or paused, nothing is focused, or
    /// the key is unmapped.
    Ignored,
    /// Dropped by the key-down throttle.
    Throttled,
    /// Handled; suppress the platform default and stop propagation.
    Consumed,
    /// Handled; suppress the platform default but let the event propagate.
    DefaultPrevented,
}

impl KeyOutcome {
    /// Whether the platform default should be suppressed.
    pub fn prevents_default(self) -> bool {
        matches!(self, Self::Consumed | Self::DefaultPrevented)
    }

    /// Whether propagation should stop.
    pub fn stops_propagation(self) -> bool {
        self == Self::Consumed
    }
}

impl<M: Measure> SpatialNavigation<M> {
    /// Route a key-down event observed at `now_ms`.
    ///
    /// The throttle runs first, so a throttled event is dropped even when it
    /// would otherwise have been ignored. Arrows call the focused node's arrow
    /// handler and then navigate unless it returns [`Outcome::Stop`]. Enter
    /// and back call their handlers; a back handler returning
    /// [`Outcome::Continue`] consumes the event.
    pub fn key_down(&mut self, key: impl Into<RawKey>, now_ms: u64) -> KeyOutcome {
        if !self.enabled {
            return KeyOutcome::Ignored;
        }
        if let Some(throttle) = &mut self.throttle
            && !throttle.try_fire(now_ms)
        {
            return KeyOutcome::Throttled;
        }
        if self.paused {
            return KeyOutcome::Ignored;
        }
        let Some(focus_key) = self.focus_key.clone() else {
            return KeyOutcome::Ignored;
        };
        let key = key.into();
        let Some(action) = self.key_map.resolve(&key) else {
            return KeyOutcome::Ignored;
        };
        let _count = self.pressed_keys.press(action);
        #[cfg(feature = "tracing")]
        tracing::trace!(%action, count = _count, "key down");
        let pressed = self.pressed_keys;

        match (action, action.direction()) {
            (_, Some(direction)) => {
                if self.on_arrow_press(&focus_key, direction, &pressed) == Outcome::Stop {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%direction, "navigation cancelled by arrow handler");
                } else {
                    self.smart_navigate(direction, &FocusDetails { key: Some(key) });
                }
                KeyOutcome::Consumed
            }
            (Action::Enter, None) => {
                self.on_enter_press(&focus_key, &pressed);
                KeyOutcome::Consumed
            }
            (_, None) => match self.on_back_press(&focus_key, &pressed) {
                Outcome::Continue => KeyOutcome::Consumed,
                Outcome::Stop => KeyOutcome::DefaultPrevented,
            },
        }
    }

    /// Route a key-up event.
    ///
    /// Clears the action's press count and, unless every key-down is
    /// throttled, reopens the throttle window. Enter release reaches the
    /// focused node's handler.
    pub fn key_up(&mut self, key: impl Into<RawKey>) {
        if !self.enabled || self.paused {
            return;
        }
        let Some(focus_key) = self.focus_key.clone() else {
            return;
        };
        let action = self.key_map.resolve(&key.into());
        if let Some(action) = action {
            self.pressed_keys.release(action);
        }
        if !self.throttle_all_keypresses
            && let Some(throttle) = &mut self.throttle
        {
            throttle.cancel();
        }
        if action == Some(Action::Enter) {
            self.on_enter_release(&focus_key);
        }
    }

    fn on_arrow_press(
        &mut self,
        key: &str,
        direction: Direction,
        pressed: &PressedKeys,
    ) -> Outcome {
        let Some(node) = self.registry.get(key) else {
            return Outcome::Stop;
        };
        let Some(handler) = node.handlers.on_arrow_press.clone() else {
            return Outcome::Continue;
        };
        let props = node.props();
        handler(self, direction, &props, pressed)
    }

    fn on_enter_press(&mut self, key: &str, pressed: &PressedKeys) {
        let Some(node) = self.registry.get(key).filter(|n| n.focusable()) else {
            return;
        };
        if let Some(handler) = node.handlers.on_enter_press.clone() {
            let props = node.props();
            handler(self, &props, pressed);
        }
    }

    fn on_enter_release(&mut self, key: &str) {
        let Some(node) = self.registry.get(key).filter(|n| n.focusable()) else {
            return;
        };
        if let Some(handler) = node.handlers.on_enter_release.clone() {
            let props = node.props();
            handler(self, &props);
        }
    }

    fn on_back_press(&mut self, key: &str, pressed: &PressedKeys) -> Outcome {
        let Some(node) = self.registry.get(key).filter(|n| n.focusable()) else {
            return Outcome::Stop;
        };
        let Some(handler) = node.handlers.on_back_press.clone() else {
            return Outcome::Stop;
        };
        let props = node.props();
        handler(self, &props, pressed)
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use kurbo::Rect;

    use super::KeyOutcome;
    use crate::config::Config;
    use crate::keys::{Action, RawKey};
    use crate::measure::StaticMeasure;
    use crate::node::{FocusDetails, Handlers, Outcome, Registration};
    use crate::{Direction, SpatialNavigation};

    fn engine(config: Config, a: Handlers<StaticMeasure>) -> SpatialNavigation<StaticMeasure> {
        let mut nav = SpatialNavigation::new(StaticMeasure);
        nav.init(config);
        nav.register(Registration {
            focus_key: Some("a".into()),
            element: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            handlers: a,
            ..Registration::default()
        });
        nav.register(Registration {
            focus_key: Some("b".into()),
            element: Some(Rect::new(20.0, 0.0, 30.0, 10.0)),
            ..Registration::default()
        });
        nav.set_focus("a", FocusDetails::default());
        nav
    }

    #[test]
    fn arrows_navigate() {
        let mut nav = engine(Config::default(), Handlers::default());
        assert_eq!(nav.key_down(39_u32, 0), KeyOutcome::Consumed);
        assert_eq!(nav.current_focus_key(), Some("b"));
        assert_eq!(nav.key_down("ArrowLeft", 1), KeyOutcome::Consumed);
        assert_eq!(nav.current_focus_key(), Some("a"));
        assert_eq!(nav.key_down("KeyQ", 2), KeyOutcome::Ignored);
    }

    #[test]
    fn arrow_handler_can_cancel() {
        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        let handlers = Handlers::default().arrow_press(move |_, direction, _, _| {
            s.set(Some(direction));
            Outcome::Stop
        });
        let mut nav = engine(Config::default(), handlers);
        assert_eq!(nav.key_down(39_u32, 0), KeyOutcome::Consumed);
        assert_eq!(seen.get(), Some(Direction::Right));
        assert_eq!(nav.current_focus_key(), Some("a"));
    }

    #[test]
    fn arrow_handler_may_navigate_itself() {
        let handlers = Handlers::default().arrow_press(|nav, _, _, _| {
            nav.set_focus("b", FocusDetails::default());
            Outcome::Stop
        });
        let mut nav = engine(Config::default(), handlers);
        nav.key_down(40_u32, 0);
        assert_eq!(nav.current_focus_key(), Some("b"));
    }

    #[test]
    fn enter_press_and_release() {
        let presses = Rc::new(Cell::new(0_u32));
        let releases = Rc::new(Cell::new(0_u32));
        let (p, r) = (presses.clone(), releases.clone());
        let handlers = Handlers::default()
            .enter_press(move |_, props, keys| {
                assert_eq!(props.focus_key, "a");
                p.set(keys.get(Action::Enter));
            })
            .enter_release(move |_, _| r.set(r.get() + 1));
        let mut nav = engine(Config::default(), handlers);

        assert_eq!(nav.key_down(13_u32, 0), KeyOutcome::Consumed);
        assert_eq!(nav.key_down("Enter", 1), KeyOutcome::Consumed);
        assert_eq!(presses.get(), 2);
        nav.key_up(13_u32);
        assert_eq!(releases.get(), 1);
        assert_eq!(nav.pressed_keys().get(Action::Enter), 0);
    }

    #[test]
    fn back_press_outcomes() {
        let mut nav = engine(Config::default(), Handlers::default());
        assert_eq!(nav.key_down(8_u32, 0), KeyOutcome::DefaultPrevented);

        let handlers = Handlers::default().back_press(|_, _, _| Outcome::Continue);
        let mut nav = engine(Config::default(), handlers);
        let outcome = nav.key_down("Backspace", 0);
        assert_eq!(outcome, KeyOutcome::Consumed);
        assert!(outcome.prevents_default());
        assert!(outcome.stops_propagation());
        assert!(!KeyOutcome::DefaultPrevented.stops_propagation());
    }

    #[test]
    fn throttle_drops_repeats_until_key_up() {
        let config = Config {
            throttle_interval_ms: 100,
            throttle_all_keypresses: false,
        };
        let mut nav = engine(config, Handlers::default());
        assert_eq!(nav.key_down(39_u32, 0), KeyOutcome::Consumed);
        assert_eq!(nav.key_down(37_u32, 50), KeyOutcome::Throttled);
        assert_eq!(nav.current_focus_key(), Some("b"));
        nav.key_up(39_u32);
        assert_eq!(nav.key_down(37_u32, 60), KeyOutcome::Consumed);
        assert_eq!(nav.current_focus_key(), Some("a"));
    }

    #[test]
    fn throttle_all_keypresses_ignores_key_up() {
        let config = Config {
            throttle_interval_ms: 100,
            throttle_all_keypresses: true,
        };
        let mut nav = engine(config, Handlers::default());
        assert_eq!(nav.key_down(39_u32, 0), KeyOutcome::Consumed);
        nav.key_up(39_u32);
        assert_eq!(nav.key_down(37_u32, 60), KeyOutcome::Throttled);
        assert_eq!(nav.key_down(37_u32, 100), KeyOutcome::Consumed);
        assert_eq!(nav.current_focus_key(), Some("a"));
    }

    #[test]
    fn paused_and_unfocused_engines_ignore_keys() {
        let mut nav = engine(Config::default(), Handlers::default());
        nav.pause();
        assert_eq!(nav.key_down(39_u32, 0), KeyOutcome::Ignored);
        assert_eq!(nav.current_focus_key(), Some("a"));
        nav.resume();

        let mut fresh = SpatialNavigation::new(StaticMeasure);
        assert_eq!(fresh.key_down(39_u32, 0), KeyOutcome::Ignored);
        fresh.init(Config::default());
        assert_eq!(fresh.key_down(39_u32, 0), KeyOutcome::Ignored);
    }

    #[test]
    fn custom_key_map() {
        let mut nav = engine(Config::default(), Handlers::default());
        nav.set_key_map([(Action::Right, [RawKey::from("d"), RawKey::Code(68)])]);
        assert_eq!(nav.key_down(39_u32, 0), KeyOutcome::Ignored);
        assert_eq!(nav.key_down("d", 1), KeyOutcome::Consumed);
        assert_eq!(nav.current_focus_key(), Some("b"));
        // Other actions keep their defaults.
        assert_eq!(nav.key_down(37_u32, 2), KeyOutcome::Consumed);
        assert_eq!(nav.current_focus_key(), Some("a"));
    }

    #[test]
    fn held_keys_count_up() {
        let mut nav = engine(Config::default(), Handlers::default());
        nav.key_down(40_u32, 0);
        nav.key_down(40_u32, 1);
        nav.key_down(40_u32, 2);
        assert_eq!(nav.pressed_keys().get(Action::Down), 3);
        nav.key_up("ArrowDown");
        assert_eq!(nav.pressed_keys().get(Action::Down), 0);
    }
}
