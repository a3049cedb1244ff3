//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART0 / USB-CDC in production).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state.name());
            }
            AppEvent::StateChanged { from, to } if to.is_error() => {
                warn!("STATE | {} -> {} (door stuck)", from.name(), to.name());
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from.name(), to.name());
            }
            AppEvent::LockdownChanged(on) => {
                info!("LOCK  | lockdown={}", if *on { "on" } else { "off" });
            }
            AppEvent::FrameDispatched(op) => {
                debug!("LINK  | rx {:?}", op);
            }
            AppEvent::WifiResetRequested => {
                info!("LINK  | Wi-Fi reset requested");
            }
        }
    }
}
