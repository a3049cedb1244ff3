//! Unified error types for the garage latch firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level loop's error handling uniform.  All variants are `Copy` so they
//! pass through the poll loop without allocation.
//!
//! Protocol anomalies on the serial link are *not* errors: the decoder
//! resynchronises silently.  The variants here cover local misuse (building
//! a frame while the slot is busy), configuration, and hardware bring-up.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The outbound frame encoder rejected an operation.
    Link(LinkError),
    /// A hardware peripheral could not be brought up or driven.
    Hw(HwError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Hw(e) => write!(f, "hw: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Link (encoder) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// A frame is still draining; only one frame may be in flight.
    SlotBusy,
    /// The frame does not fit in the transmit slot.
    SlotOverflow,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotBusy => write!(f, "transmit slot busy"),
            Self::SlotOverflow => write!(f, "frame exceeds transmit slot"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwError {
    /// UART driver install or configuration failed (ESP-IDF return code).
    UartInitFailed(i32),
    /// One-shot timer creation failed (ESP-IDF return code).
    TimerInitFailed(i32),
    /// A UART byte transfer failed at runtime.
    UartIo(i32),
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UartInitFailed(rc) => write!(f, "UART init failed (rc={rc})"),
            Self::TimerInitFailed(rc) => write!(f, "timer init failed (rc={rc})"),
            Self::UartIo(rc) => write!(f, "UART transfer failed (rc={rc})"),
        }
    }
}

impl From<HwError> for Error {
    fn from(e: HwError) -> Self {
        Self::Hw(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
