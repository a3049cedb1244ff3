//! Digital input drivers: door position switch and front-panel button.
//!
//! ## Hardware
//!
//! - Door switch: reed contact to ground with pull-up.  High = magnet away
//!   = door open.
//! - Button: momentary to ground with pull-up.  Low = pressed.
//!
//! A failed read is logged and treated as the safe reading: door closed
//! (no automatic close is started) and button released.

use embedded_hal::digital::InputPin;
use log::warn;

/// Door position switch.
pub struct DoorSensor<P: InputPin> {
    pin: P,
}

impl<P: InputPin> DoorSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn is_open(&mut self) -> bool {
        self.pin.is_high().unwrap_or_else(|e| {
            warn!("door_sensor: read failed: {:?}", e);
            false
        })
    }
}

/// Active-low push button line.
pub struct ButtonLine<P: InputPin> {
    pin: P,
}

impl<P: InputPin> ButtonLine<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn is_pressed(&mut self) -> bool {
        self.pin.is_low().unwrap_or_else(|e| {
            warn!("button: read failed: {:?}", e);
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    /// Pin that returns a fixed level, or fails.
    struct FakeInput(Option<bool>);

    impl ErrorType for FakeInput {
        type Error = ErrorKind;
    }

    impl InputPin for FakeInput {
        fn is_high(&mut self) -> Result<bool, ErrorKind> {
            self.0.ok_or(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, ErrorKind> {
            self.0.map(|h| !h).ok_or(ErrorKind::Other)
        }
    }

    #[test]
    fn high_means_open() {
        assert!(DoorSensor::new(FakeInput(Some(true))).is_open());
        assert!(!DoorSensor::new(FakeInput(Some(false))).is_open());
    }

    #[test]
    fn low_means_pressed() {
        assert!(ButtonLine::new(FakeInput(Some(false))).is_pressed());
        assert!(!ButtonLine::new(FakeInput(Some(true))).is_pressed());
    }

    #[test]
    fn read_failure_is_safe() {
        assert!(!DoorSensor::new(FakeInput(None)).is_open());
        assert!(!ButtonLine::new(FakeInput(None)).is_pressed());
    }
}
