//! Application service, the hexagonal core.
//!
//! [`GarageService`] owns the door controller, the control signals, the
//! companion-module link, the indicator pattern, and the button debouncer.
//! All I/O flows through the [`Board`] port, making the whole service
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ───▶ ┌──────────────────────────┐ ──▶ EventSink
//!  ButtonPort ───▶ │      GarageService       │
//!  TransportIo ◀──▶│  DoorController · Link   │──▶ ActuatorPort
//!  Timer ◀───────▶ └──────────────────────────┘ ──▶ IndicatorPort
//! ```
//!
//! One [`poll`](GarageService::poll) is one loop iteration, in fixed order:
//! timer sample, controller step, effects, indicator, link receive and
//! transmit, sensor sample, button debounce.

use log::{debug, info};

use crate::config::SystemConfig;
use crate::drivers::button::{ButtonEvent, InputDebouncer};
use crate::drivers::indicator::StatusIndicator;
use crate::fsm::context::ControlSignals;
use crate::fsm::{DoorController, DoorState, Effect, Step};
use crate::link::{LinkStats, ProtocolLink};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ActuatorPort, Board, EventSink, IndicatorPort, NotificationTimer};

// ───────────────────────────────────────────────────────────────
// GarageService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct GarageService {
    controller: DoorController,
    signals: ControlSignals,
    link: ProtocolLink,
    indicator: StatusIndicator,
    button: InputDebouncer,
    iterations: u64,
}

impl GarageService {
    /// Construct the service from configuration.
    ///
    /// Does **not** run anything; call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            controller: DoorController::new(config),
            signals: ControlSignals::new(),
            link: ProtocolLink::new(config),
            indicator: StatusIndicator::new(config.blink_period_ms),
            button: InputDebouncer::from_config(config),
            iterations: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Release the relay, flash red until the first poll repaints the
    /// indicator, and announce the initial state.
    pub fn start(
        &mut self,
        hw: &mut (impl ActuatorPort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        hw.open_relay();
        hw.set_indicator(false, true);
        sink.emit(&AppEvent::Started(self.controller.state()));
        info!("GarageService started in {}", self.controller.state().name());
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one loop iteration.  Never blocks.
    pub fn poll(&mut self, hw: &mut impl Board, now_ms: u32, sink: &mut impl EventSink) {
        self.iterations += 1;

        // 1–3. Controller step and its side effects
        let fired = hw.fired();
        let step = self.controller.step(&mut self.signals, fired);
        self.apply(&step, hw);
        if step.changed() {
            sink.emit(&AppEvent::StateChanged {
                from: step.from,
                to: step.state,
            });
        }

        // 4. Indicator
        let frame = self
            .indicator
            .render(self.controller.state(), self.signals.lockdown(), now_ms);
        hw.set_indicator(frame.blue, frame.red);

        // 5. Link: one byte in, one byte out
        if let Some(op) = self.link.poll_receive(hw, &mut self.signals) {
            sink.emit(&AppEvent::FrameDispatched(op));
        }
        self.link.poll_transmit(hw);

        // 6. Sensor
        let open = hw.is_open();
        self.signals.sample_sensor(open);

        // 7. Button
        let pressed = hw.button_pressed();
        match self.button.tick(now_ms, pressed) {
            Some(ButtonEvent::ShortPress) => self.handle_command(AppCommand::ToggleLockdown, sink),
            Some(ButtonEvent::LongPress) => self.handle_command(AppCommand::RequestWifiReset, sink),
            None => {}
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a command from the front panel or a test harness.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::ToggleLockdown => {
                let on = self.signals.toggle_lockdown();
                info!("lockdown {}", if on { "on" } else { "off" });
                sink.emit(&AppEvent::LockdownChanged(on));
            }
            AppCommand::RequestOpen => self.signals.request_open(),
            AppCommand::RequestClose => self.signals.request_close(),
            AppCommand::RequestWifiReset => {
                self.link.request_wifi_reset();
                sink.emit(&AppEvent::WifiResetRequested);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current door state.
    pub fn state(&self) -> DoorState {
        self.controller.state()
    }

    pub fn lockdown(&self) -> bool {
        self.signals.lockdown()
    }

    /// Close retries left in the running close sequence.
    pub fn retries_left(&self) -> u8 {
        self.controller.retries_left()
    }

    pub fn link(&self) -> &ProtocolLink {
        &self.link
    }

    pub fn link_stats(&self) -> LinkStats {
        self.link.stats()
    }

    /// Loop iterations since startup.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate controller effects into port calls, in order.
    fn apply(&mut self, step: &Step, hw: &mut impl Board) {
        for effect in &step.effects {
            match *effect {
                Effect::EnergizeRelay => hw.close_relay(),
                Effect::ReleaseRelay => hw.open_relay(),
                Effect::ArmTimer(ms) => NotificationTimer::arm(hw, ms),
                Effect::ReportStatus { open, repeats } => {
                    debug!("status: open={} x{}", open, repeats);
                    self.link.report_status(open, repeats);
                }
            }
        }
    }
}
