//! Two-LED status indicator patterns.
//!
//! The indicator is recomputed from scratch every poll iteration from the
//! door state, the lockdown flag, and the uptime clock.  Nothing is
//! latched, so a missed iteration only delays the next frame.
//!
//! | State        | Blue          | Red                      |
//! |--------------|---------------|--------------------------|
//! | WatchDoor    | on            | blinks while locked down |
//! | Wait2Minutes | off           | on                       |
//! | DoorClosing  | blinks        | off                      |
//! | CloseError   | alternates with red ("pink")             |
//! | others       | off           | off                      |

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::fsm::DoorState;

/// LED levels for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorFrame {
    pub blue: bool,
    pub red: bool,
}

impl IndicatorFrame {
    pub const OFF: Self = Self {
        blue: false,
        red: false,
    };
}

/// Pattern generator for the blue/red indicator pair.
pub struct StatusIndicator {
    blink_period_ms: u32,
}

impl StatusIndicator {
    pub fn new(blink_period_ms: u32) -> Self {
        Self {
            blink_period_ms: blink_period_ms.max(2),
        }
    }

    /// LED levels for `state` at `now_ms`.
    pub fn render(&self, state: DoorState, lockdown: bool, now_ms: u32) -> IndicatorFrame {
        match state {
            DoorState::WatchDoor => IndicatorFrame {
                blue: true,
                red: lockdown && self.blink_on(now_ms),
            },
            DoorState::Wait2Minutes => IndicatorFrame {
                blue: false,
                red: true,
            },
            DoorState::DoorClosing => IndicatorFrame {
                blue: self.blink_on(now_ms),
                red: false,
            },
            DoorState::CloseError => {
                let red = now_ms % 3 == 0;
                IndicatorFrame { blue: !red, red }
            }
            _ => IndicatorFrame::OFF,
        }
    }

    /// Square wave: on for the second half of each period.
    fn blink_on(&self, now_ms: u32) -> bool {
        now_ms % self.blink_period_ms > self.blink_period_ms / 2
    }
}

/// The blue and red LEDs, active high.
pub struct IndicatorLeds<B: OutputPin, R: OutputPin> {
    blue: B,
    red: R,
    shown: Option<IndicatorFrame>,
}

impl<B: OutputPin, R: OutputPin> IndicatorLeds<B, R> {
    pub fn new(blue: B, red: R) -> Self {
        let mut leds = Self {
            blue,
            red,
            shown: None,
        };
        leds.show(IndicatorFrame::OFF);
        leds
    }

    /// Drive both LEDs.  Pins are only written when the frame changes.
    pub fn show(&mut self, frame: IndicatorFrame) {
        if self.shown == Some(frame) {
            return;
        }
        let blue = self.blue.set_state(PinState::from(frame.blue));
        let red = self.red.set_state(PinState::from(frame.red));
        match (blue, red) {
            (Ok(()), Ok(())) => self.shown = Some(frame),
            (b, r) => {
                warn!("indicator: pin write failed (blue={:?}, red={:?})", b.err(), r.err());
                self.shown = None;
            }
        }
    }
}
