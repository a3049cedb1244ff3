//! Per-state handlers and the pure transition function.
//!
//! Each handler receives the step context, runs its on-enter actions when
//! `entering` is set, then evaluates its exit conditions in table order.
//! The first matching condition wins; otherwise the state is kept.
//!
//! ```text
//!                 open_requested && !lockdown
//!   WATCH_DOOR ─────────────────────────────▶ OPEN_COMMAND ──[pulse]──▶ DOOR_OPENING
//!     ▲   │                                                               │      │
//!     │   │ sensor_open                                      sensor_open  │      │ timeout
//!     │   ▼                                                               ▼      ▼
//!     │ WAIT_2_MINUTES ──[grace | close_requested]──┐               IDLE ◀── OPEN_ERROR
//!     │   │                                         │                │  (sensor_open)
//!     │   │ sensor_closed                           ▼                │ close_requested
//!     ├───┘                  ┌──────────────▶ CLOSE_COMMAND ◀────────┘
//!     │                      │ retries > 0        │ [pulse]
//!     │                      │                    ▼
//!     ├──────[sensor_closed]─┴──────────────  DOOR_CLOSING ──[retries = 0]──▶ CLOSE_ERROR
//!     │                                                                         │
//!     └─────────────────────────────[sensor_closed]─────────────────────────────┘
//! ```

use log::{info, warn};

use super::context::{ControlSignals, DoorTiming};
use super::{DoorState, Effect, Effects};

// ═══════════════════════════════════════════════════════════════════════════
//  Step context
// ═══════════════════════════════════════════════════════════════════════════

/// Everything a handler may read or change during one step.
pub(super) struct StepCx<'a> {
    pub signals: &'a mut ControlSignals,
    pub retries: &'a mut u8,
    pub timing: &'a DoorTiming,
    /// Expiry sampled before the step.  Cleared when the step re-arms.
    pub timer_fired: bool,
    pub effects: Effects,
}

impl StepCx<'_> {
    fn emit(&mut self, effect: Effect) {
        if self.effects.push(effect).is_err() {
            debug_assert!(false, "effect buffer overflow");
            warn!("door: dropped effect {:?}", effect);
        }
    }

    /// Arming cancels any pending expiry, including the one sampled for
    /// this step.
    fn arm(&mut self, duration_ms: u32) {
        self.emit(Effect::ArmTimer(duration_ms));
        self.timer_fired = false;
    }

    fn report(&mut self, open: bool, repeats: u8) {
        self.emit(Effect::ReportStatus { open, repeats });
    }

    fn start_close_sequence(&mut self) -> DoorState {
        *self.retries = self.timing.close_retries_max;
        self.signals.clear_close_request();
        DoorState::CloseCommand
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Dispatch
// ═══════════════════════════════════════════════════════════════════════════

/// Run the handler for `state` and return the state to be active next.
pub(super) fn run(state: DoorState, entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    match state {
        DoorState::WatchDoor => watch_door(entering, cx),
        DoorState::OpenCommand => open_command(entering, cx),
        DoorState::DoorOpening => door_opening(entering, cx),
        DoorState::OpenError => open_error(entering, cx),
        DoorState::Idle => idle(entering, cx),
        DoorState::Wait2Minutes => wait_2_minutes(entering, cx),
        DoorState::CloseCommand => close_command(entering, cx),
        DoorState::DoorClosing => door_closing(entering, cx),
        DoorState::CloseError => close_error(entering, cx),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Closed door, waiting for a command or a manual opening
// ═══════════════════════════════════════════════════════════════════════════

fn watch_door(entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    if entering {
        cx.signals.clear_open_request();
        cx.report(false, 2);
    }

    if cx.signals.open_requested() && !cx.signals.lockdown() {
        cx.signals.clear_open_request();
        return DoorState::OpenCommand;
    }
    if cx.signals.sensor_open() {
        return DoorState::Wait2Minutes;
    }
    DoorState::WatchDoor
}

// ═══════════════════════════════════════════════════════════════════════════
//  Opening sequence
// ═══════════════════════════════════════════════════════════════════════════

fn open_command(entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    if entering {
        cx.emit(Effect::EnergizeRelay);
        let ms = cx.timing.relay_pulse_ms;
        cx.arm(ms);
    }

    if cx.timer_fired {
        cx.emit(Effect::ReleaseRelay);
        return DoorState::DoorOpening;
    }
    DoorState::OpenCommand
}

fn door_opening(entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    if entering {
        let ms = cx.timing.travel_timeout_ms;
        cx.arm(ms);
    }

    if cx.timer_fired {
        warn!("door: did not open within {} ms", cx.timing.travel_timeout_ms);
        return DoorState::OpenError;
    }
    if cx.signals.sensor_open() {
        return DoorState::Idle;
    }
    DoorState::DoorOpening
}

/// Terminal until the sensor confirms the door is open.
fn open_error(_entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    if cx.signals.sensor_open() {
        return DoorState::Idle;
    }
    DoorState::OpenError
}

// ═══════════════════════════════════════════════════════════════════════════
//  Open door
// ═══════════════════════════════════════════════════════════════════════════

/// Door opened on request: stays open until told to close.
fn idle(entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    if entering {
        cx.signals.clear_open_request();
        cx.signals.clear_close_request();
        cx.report(true, 2);
    }

    if cx.signals.close_requested() {
        return cx.start_close_sequence();
    }
    if cx.signals.sensor_closed() {
        return DoorState::WatchDoor;
    }
    DoorState::Idle
}

/// Door opened by hand: auto-close once the grace period runs out.
fn wait_2_minutes(entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    if entering {
        cx.signals.clear_close_request();
        cx.report(true, 1);
        let ms = cx.timing.grace_period_ms;
        cx.arm(ms);
    }

    if cx.signals.sensor_closed() {
        return DoorState::WatchDoor;
    }
    if cx.timer_fired || cx.signals.close_requested() {
        return cx.start_close_sequence();
    }
    DoorState::Wait2Minutes
}

// ═══════════════════════════════════════════════════════════════════════════
//  Closing sequence
// ═══════════════════════════════════════════════════════════════════════════

fn close_command(entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    if entering {
        cx.emit(Effect::EnergizeRelay);
        let ms = cx.timing.relay_pulse_ms;
        cx.arm(ms);
    }

    if cx.timer_fired {
        cx.emit(Effect::ReleaseRelay);
        return DoorState::DoorClosing;
    }
    DoorState::CloseCommand
}

fn door_closing(entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    if entering {
        let ms = cx.timing.travel_timeout_ms;
        cx.arm(ms);
    }

    if cx.signals.sensor_closed() {
        return DoorState::WatchDoor;
    }
    if cx.timer_fired {
        if *cx.retries > 0 {
            *cx.retries -= 1;
            info!("door: still open, retrying close ({} left)", *cx.retries);
            return DoorState::CloseCommand;
        }
        warn!("door: close retries exhausted");
        return DoorState::CloseError;
    }
    DoorState::DoorClosing
}

/// Terminal until the sensor confirms the door is closed.
fn close_error(_entering: bool, cx: &mut StepCx<'_>) -> DoorState {
    if cx.signals.sensor_closed() {
        return DoorState::WatchDoor;
    }
    DoorState::CloseError
}
