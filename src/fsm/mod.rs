//! Door-control finite state machine.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  DoorController::step(signals, timer_fired)                    │
//! │                                                                │
//! │   entering? ──▶ on-enter actions (clear flags, report, arm)    │
//! │        │                                                       │
//! │        ▼                                                       │
//! │   exit conditions in table order ──▶ next DoorState            │
//! │        │                                                       │
//! │        ▼                                                       │
//! │   next != current ──▶ entering = true for the next step        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The controller is pure with respect to hardware: it never touches a
//! pin or a timer.  Each step returns a [`Step`] listing the side effects
//! (relay, timer, status report) for the caller to apply through the
//! port traits.  State dispatch is a `match` over [`DoorState`] in
//! [`states`].

pub mod context;
mod states;

use heapless::Vec;
use log::info;

use crate::config::SystemConfig;
use context::{ControlSignals, DoorTiming};
use states::StepCx;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Every state the door controller can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DoorState {
    /// Door closed; waiting for a remote open or a manual opening.
    WatchDoor = 0,
    /// Relay energised to start opening.
    OpenCommand = 1,
    /// Waiting for the sensor to confirm the door opened.
    DoorOpening = 2,
    /// The door failed to open in time.
    OpenError = 3,
    /// Door open on request; waiting for a close command.
    Idle = 4,
    /// Door opened by hand; grace period before auto-close.
    Wait2Minutes = 5,
    /// Relay energised to start closing.
    CloseCommand = 6,
    /// Waiting for the sensor to confirm the door closed.
    DoorClosing = 7,
    /// The door failed to close after every retry.
    CloseError = 8,
}

impl DoorState {
    /// Total number of states.
    pub const COUNT: usize = 9;

    /// All states, in discriminant order.
    pub const ALL: [DoorState; Self::COUNT] = [
        Self::WatchDoor,
        Self::OpenCommand,
        Self::DoorOpening,
        Self::OpenError,
        Self::Idle,
        Self::Wait2Minutes,
        Self::CloseCommand,
        Self::DoorClosing,
        Self::CloseError,
    ];

    /// Human-readable name for log lines.
    pub fn name(self) -> &'static str {
        match self {
            Self::WatchDoor => "WatchDoor",
            Self::OpenCommand => "OpenCommand",
            Self::DoorOpening => "DoorOpening",
            Self::OpenError => "OpenError",
            Self::Idle => "Idle",
            Self::Wait2Minutes => "Wait2Minutes",
            Self::CloseCommand => "CloseCommand",
            Self::DoorClosing => "DoorClosing",
            Self::CloseError => "CloseError",
        }
    }

    /// Whether this state is one of the two terminal error states.
    pub fn is_error(self) -> bool {
        matches!(self, Self::OpenError | Self::CloseError)
    }
}

// ---------------------------------------------------------------------------
// Side effects
// ---------------------------------------------------------------------------

/// An action requested by a step, applied by the caller after the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Close the relay contacts (start an actuator pulse).
    EnergizeRelay,
    /// Open the relay contacts (end the pulse).
    ReleaseRelay,
    /// Arm the one-shot timer for the given number of milliseconds.
    ArmTimer(u32),
    /// Report the door state to the companion module `repeats` times.
    ReportStatus { open: bool, repeats: u8 },
}

/// Upper bound on effects produced by a single step.
pub const MAX_EFFECTS: usize = 4;

/// Effects of one step, in the order they must be applied.
pub type Effects = Vec<Effect, MAX_EFFECTS>;

/// Outcome of one controller step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// State that was active when the step ran.
    pub from: DoorState,
    /// State active after the step.
    pub state: DoorState,
    pub effects: Effects,
}

impl Step {
    /// Whether the step moved the controller to a different state.
    pub fn changed(&self) -> bool {
        self.from != self.state
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// The door controller.  Owns the active state, the enter flag, and the
/// close retry counter.
pub struct DoorController {
    state: DoorState,
    /// Set on boot and after every transition; consumed by the next step.
    entering: bool,
    retries: u8,
    timing: DoorTiming,
    transitions: u32,
}

impl DoorController {
    /// Construct the controller in [`DoorState::WatchDoor`] with its
    /// on-enter actions pending.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            state: DoorState::WatchDoor,
            entering: true,
            retries: 0,
            timing: DoorTiming::from(config),
            transitions: 0,
        }
    }

    /// Advance the controller by one iteration.
    ///
    /// `timer_fired` is the expiry sampled from the notification timer
    /// before the step.  Request flags in `signals` may be cleared.
    pub fn step(&mut self, signals: &mut ControlSignals, timer_fired: bool) -> Step {
        let from = self.state;
        let entering = core::mem::take(&mut self.entering);

        let mut cx = StepCx {
            signals,
            retries: &mut self.retries,
            timing: &self.timing,
            timer_fired,
            effects: Vec::new(),
        };
        let next = states::run(from, entering, &mut cx);
        let effects = cx.effects;

        if next != from {
            info!("door: {} -> {}", from.name(), next.name());
            self.state = next;
            self.entering = true;
            self.transitions = self.transitions.wrapping_add(1);
        }

        Step {
            from,
            state: next,
            effects,
        }
    }

    /// The currently active state.
    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Close retries left in the current close sequence.
    pub fn retries_left(&self) -> u8 {
        self.retries
    }

    /// Whether the next step will run on-enter actions.
    pub fn is_entering(&self) -> bool {
        self.entering
    }

    /// Transitions taken since boot (wraps).
    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}
