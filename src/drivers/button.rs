//! Polled button debouncer with short and long press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch with a pull-up.  The board adapter inverts
//! the level, so this driver only ever sees `pressed: bool`.  `tick()` is
//! called once per poll-loop iteration with the raw level.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                            | Event        |
//! |-------------|--------------------------------------|--------------|
//! | Short press | Released before the long threshold   | `ShortPress` |
//! | Long press  | Held for the long threshold          | `LongPress`  |
//!
//! A long press fires once while the button is still held; the release
//! that follows produces nothing.

use crate::config::SystemConfig;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

/// Debounced gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Released,
    Pressed { since_ms: u32, long_sent: bool },
}

pub struct InputDebouncer {
    debounce_ms: u32,
    long_press_ms: u32,
    /// Last raw level and when it last changed.
    raw: bool,
    raw_since_ms: u32,
    state: GestureState,
}

impl InputDebouncer {
    pub fn new(debounce_ms: u32, long_press_ms: u32) -> Self {
        Self {
            debounce_ms,
            long_press_ms,
            raw: false,
            raw_since_ms: 0,
            state: GestureState::Released,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.debounce_ms, config.long_press_ms)
    }

    /// Feed the raw level sampled at `now_ms`.
    /// Returns a classified gesture event, if any.
    pub fn tick(&mut self, now_ms: u32, pressed: bool) -> Option<ButtonEvent> {
        if pressed != self.raw {
            self.raw = pressed;
            self.raw_since_ms = now_ms;
        }
        let stable = now_ms.wrapping_sub(self.raw_since_ms) >= self.debounce_ms;

        match self.state {
            GestureState::Released => {
                if stable && self.raw {
                    self.state = GestureState::Pressed {
                        since_ms: now_ms,
                        long_sent: false,
                    };
                }
                None
            }

            GestureState::Pressed { since_ms, long_sent } => {
                if stable && !self.raw {
                    self.state = GestureState::Released;
                    return (!long_sent).then_some(ButtonEvent::ShortPress);
                }
                if !long_sent && now_ms.wrapping_sub(since_ms) >= self.long_press_ms {
                    self.state = GestureState::Pressed {
                        since_ms,
                        long_sent: true,
                    };
                    return Some(ButtonEvent::LongPress);
                }
                None
            }
        }
    }

    /// Debounced level.
    pub fn is_pressed(&self) -> bool {
        matches!(self.state, GestureState::Pressed { .. })
    }
}
