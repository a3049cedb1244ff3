//! Shared inputs threaded through every state handler.
//!
//! [`ControlSignals`] is the record of latched commands and sampled inputs
//! that the rest of the firmware writes (link dispatch, sensor task, button
//! task) and the door controller reads and clears.  Everything here is
//! touched only from the poll loop, so plain fields suffice.

use crate::config::SystemConfig;

// ---------------------------------------------------------------------------
// Control signals
// ---------------------------------------------------------------------------

/// Latched remote commands, sensor state, and the lockdown override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlSignals {
    open_requested: bool,
    close_requested: bool,
    sensor_open: bool,
    sensor_closed: bool,
    lockdown: bool,
}

impl ControlSignals {
    /// Nothing requested, no sensor sample yet, lockdown off.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Sensor --

    /// Re-derive both sensor flags from the raw door-open bit.
    /// The two flags are always complementary after a sample.
    pub fn sample_sensor(&mut self, raw_open: bool) {
        self.sensor_open = raw_open;
        self.sensor_closed = !raw_open;
    }

    pub fn sensor_open(&self) -> bool {
        self.sensor_open
    }

    pub fn sensor_closed(&self) -> bool {
        self.sensor_closed
    }

    // -- Remote commands --

    /// Latch a remote open request (set by the link dispatcher).
    pub fn request_open(&mut self) {
        self.open_requested = true;
    }

    /// Latch a remote close request (set by the link dispatcher).
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn open_requested(&self) -> bool {
        self.open_requested
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub(crate) fn clear_open_request(&mut self) {
        self.open_requested = false;
    }

    pub(crate) fn clear_close_request(&mut self) {
        self.close_requested = false;
    }

    // -- Lockdown --

    /// Flip the lockdown override and return the new value.
    pub fn toggle_lockdown(&mut self) -> bool {
        self.lockdown = !self.lockdown;
        self.lockdown
    }

    pub fn set_lockdown(&mut self, on: bool) {
        self.lockdown = on;
    }

    pub fn lockdown(&self) -> bool {
        self.lockdown
    }
}

// ---------------------------------------------------------------------------
// Timing parameters
// ---------------------------------------------------------------------------

/// The subset of [`SystemConfig`] the controller needs, copied out so the
/// controller does not hold the whole configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorTiming {
    pub relay_pulse_ms: u32,
    pub travel_timeout_ms: u32,
    pub grace_period_ms: u32,
    pub close_retries_max: u8,
}

impl From<&SystemConfig> for DoorTiming {
    fn from(c: &SystemConfig) -> Self {
        Self {
            relay_pulse_ms: c.relay_pulse_ms,
            travel_timeout_ms: c.travel_timeout_ms,
            grace_period_ms: c.grace_period_ms,
            close_retries_max: c.close_retries_max,
        }
    }
}
