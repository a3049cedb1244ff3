//! Inbound commands to the application service.
//!
//! These represent actions requested from outside the poll loop's own
//! inputs (front-panel gestures, test harnesses) that the
//! [`GarageService`](super::service::GarageService) interprets.

/// Commands that adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Flip the lockdown override (short press).
    ToggleLockdown,

    /// Latch a remote-style open request.
    RequestOpen,

    /// Latch a remote-style close request.
    RequestClose,

    /// Ask the companion module to drop its Wi-Fi credentials (long press).
    RequestWifiReset,
}
