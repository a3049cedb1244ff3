//! Door actuator relay driver.
//!
//! ## Hardware
//!
//! A relay wired across the door opener's wall-button contacts.  Driving
//! the GPIO high closes the contacts; the opener treats that as a press.
//! The door controller bounds every closure to one pulse.
//!
//! GPIO errors are logged and otherwise ignored: the poll loop keeps
//! running and the next step re-drives the pin.

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

pub struct Relay<P: OutputPin> {
    pin: P,
    closed: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Take the pin and force the contacts open.
    pub fn new(pin: P) -> Self {
        let mut relay = Self { pin, closed: true };
        relay.open();
        relay
    }

    /// Energise the coil (contacts closed).
    pub fn close(&mut self) {
        match self.pin.set_high() {
            Ok(()) => {
                self.closed = true;
                debug!("relay: closed");
            }
            Err(e) => warn!("relay: set_high failed: {:?}", e),
        }
    }

    /// Release the coil (contacts open).
    pub fn open(&mut self) {
        match self.pin.set_low() {
            Ok(()) => {
                self.closed = false;
                debug!("relay: open");
            }
            Err(e) => warn!("relay: set_low failed: {:?}", e),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
