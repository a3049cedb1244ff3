//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GarageService (domain)
//! ```
//!
//! Driven adapters (relay, door sensor, button, LEDs, one-shot timer,
//! event sinks) implement these traits.  The
//! [`GarageService`](super::service::GarageService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::link::TransportIo;

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// The relay in parallel with the door opener's push button.
pub trait ActuatorPort {
    /// Close the relay contacts: the opener sees a button press.
    fn close_relay(&mut self);

    /// Open the relay contacts: end of the press.
    fn open_relay(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Sensor ports (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Door position switch.
pub trait SensorPort {
    /// Raw reading: `true` when the door is away from its closed position.
    fn is_open(&mut self) -> bool;
}

/// Front-panel push button.
pub trait ButtonPort {
    /// Raw, undebounced line level (`true` = pressed).
    fn button_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (domain → LEDs)
// ───────────────────────────────────────────────────────────────

pub trait IndicatorPort {
    fn set_indicator(&mut self, blue: bool, red: bool);
}

// ───────────────────────────────────────────────────────────────
// Notification timer
// ───────────────────────────────────────────────────────────────

/// One-shot countdown shared by every timed state.
///
/// Arming cancels any pending expiry (last arm wins).  `fired` reports an
/// expiry exactly once, then self-clears.
pub trait NotificationTimer {
    fn arm(&mut self, duration_ms: u32);

    fn fired(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Board
// ───────────────────────────────────────────────────────────────

/// Everything the poll loop drives, in one value.  Taking a single
/// `&mut impl Board` avoids juggling several mutable borrows of the same
/// hardware adapter.
pub trait Board:
    ActuatorPort + SensorPort + ButtonPort + IndicatorPort + NotificationTimer + TransportIo
{
}

impl<T> Board for T where
    T: ActuatorPort + SensorPort + ButtonPort + IndicatorPort + NotificationTimer + TransportIo
{
}
