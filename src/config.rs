//! System configuration parameters
//!
//! All tunable parameters for the garage latch.  There is no persistent
//! storage: every value is a compile-time default, grouped here so the
//! controller, the serial link, and the drivers read from one place.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Capacity of the product key string reported to the companion module.
pub const PRODUCT_KEY_CAP: usize = 24;

/// Capacity of the firmware version string in the product descriptor.
pub const VERSION_CAP: usize = 12;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Door timing ---
    /// How long the relay stays energised for one actuator pulse (ms)
    pub relay_pulse_ms: u32,
    /// Time allowed for the door to reach its end position (ms)
    pub travel_timeout_ms: u32,
    /// Grace period an open door is left alone before auto-closing (ms)
    pub grace_period_ms: u32,
    /// Close-pulse retries after the first attempt before giving up
    pub close_retries_max: u8,

    // --- Companion module link ---
    /// Datapoint id carrying the open/closed status and remote command
    pub status_dpid: u8,
    /// Datapoint id of the auxiliary 32-bit report sent on status queries
    pub aux_dpid: u8,
    /// Pairing mode byte sent with a pairing-mode request (0 = smart-config)
    pub pairing_mode: u8,
    /// Product key reported in the product descriptor
    pub product_key: String<PRODUCT_KEY_CAP>,
    /// Firmware version reported in the product descriptor
    pub mcu_version: String<VERSION_CAP>,
    /// Drop inbound frames whose checksum does not match.
    /// Off by default: the companion module has only ever been tested
    /// against a receiver that ignores the checksum byte.
    pub verify_rx_checksum: bool,
    /// UART baud rate to the companion module
    pub uart_baud: u32,

    // --- User interface ---
    /// Button debounce window (ms)
    pub debounce_ms: u32,
    /// Hold time that turns a press into a long press (ms)
    pub long_press_ms: u32,
    /// Full period of an indicator blink (ms)
    pub blink_period_ms: u32,

    // --- Scheduling ---
    /// Delay between poll-loop iterations (ms)
    pub loop_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Door timing
            relay_pulse_ms: 1_000,
            travel_timeout_ms: 10_000,
            grace_period_ms: 120_000, // 2 min
            close_retries_max: 3,

            // Link
            status_dpid: 1,
            aux_dpid: 7,
            pairing_mode: 0x00,
            product_key: fixed_str("gl0000000000000a"),
            mcu_version: fixed_str("1.0.0"),
            verify_rx_checksum: false,
            uart_baud: 9_600,

            // UI
            debounce_ms: 20,
            long_press_ms: 3_000,
            blink_period_ms: 200,

            // Scheduling
            loop_interval_ms: 1,
        }
    }
}

impl SystemConfig {
    /// Reject values the controller or the link cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.relay_pulse_ms == 0 {
            return Err(Error::Config("relay_pulse_ms must be non-zero"));
        }
        if self.travel_timeout_ms <= self.relay_pulse_ms {
            return Err(Error::Config("travel_timeout_ms must exceed relay_pulse_ms"));
        }
        if self.grace_period_ms == 0 {
            return Err(Error::Config("grace_period_ms must be non-zero"));
        }
        if self.status_dpid == 0 || self.aux_dpid == 0 {
            return Err(Error::Config("datapoint ids must be non-zero"));
        }
        if self.status_dpid == self.aux_dpid {
            return Err(Error::Config("status and aux datapoints must differ"));
        }
        if self.product_key.is_empty() {
            return Err(Error::Config("product_key must not be empty"));
        }
        if self.debounce_ms >= self.long_press_ms {
            return Err(Error::Config("long_press_ms must exceed debounce_ms"));
        }
        if self.blink_period_ms < 2 {
            return Err(Error::Config("blink_period_ms too short"));
        }
        Ok(())
    }
}

/// Build a fixed-capacity string from a literal known to fit.
fn fixed_str<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
