//! Outbound application events.
//!
//! The [`GarageService`](super::service::GarageService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder).

use crate::fsm::DoorState;
use crate::link::Opcode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the initial state).
    Started(DoorState),

    /// The door controller moved between states.
    StateChanged { from: DoorState, to: DoorState },

    /// Lockdown was switched on or off from the front panel.
    LockdownChanged(bool),

    /// A frame from the companion module was dispatched.
    FrameDispatched(Opcode),

    /// A Wi-Fi reset was requested from the front panel.
    WifiResetRequested,
}
