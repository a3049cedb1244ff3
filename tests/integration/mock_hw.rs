//! Mock board for integration tests.
//!
//! Implements every port the poll loop drives, records relay activity,
//! and scripts the companion module's side of the serial link.  Time is
//! simulated: [`Sim::run_for`] advances a millisecond clock and polls the
//! service once per millisecond.

use std::collections::VecDeque;

use garagelatch::app::events::AppEvent;
use garagelatch::app::ports::{
    ActuatorPort, ButtonPort, EventSink, IndicatorPort, NotificationTimer, SensorPort,
};
use garagelatch::app::service::GarageService;
use garagelatch::config::SystemConfig;
use garagelatch::drivers::hw_timer::SoftTimer;
use garagelatch::link::TransportIo;
use garagelatch::link::codec::checksum;

// ── Relay call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCall {
    Close,
    Open,
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub relay_calls: Vec<RelayCall>,
    pub relay_closed: bool,
    pub door_open: bool,
    pub button_down: bool,
    pub indicator: (bool, bool),
    pub timer: SoftTimer,
    pub arms: Vec<u32>,
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    /// Transmitter level reported to the link.
    pub tx_ready: bool,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            relay_calls: Vec::new(),
            relay_closed: false,
            door_open: false,
            button_down: false,
            indicator: (false, false),
            timer: SoftTimer::new(),
            arms: Vec::new(),
            rx: VecDeque::new(),
            tx: Vec::new(),
            tx_ready: true,
        }
    }

    /// Relay closures (actuator pulses started) so far.
    pub fn pulses(&self) -> usize {
        self.relay_calls
            .iter()
            .filter(|c| **c == RelayCall::Close)
            .count()
    }

    /// Queue a frame from the module with a valid checksum.
    pub fn send_frame(&mut self, opcode: u8, payload: &[u8]) {
        let mut frame = vec![0x55, 0xAA, 0x00, opcode, 0x00, payload.len() as u8];
        frame.extend_from_slice(payload);
        frame.push(checksum(&frame));
        self.rx.extend(frame);
    }

    /// Queue a remote open (`true`) or close (`false`) command.
    pub fn send_command(&mut self, open: bool) {
        self.send_frame(0x06, &[0x01, 0x01, 0x00, 0x01, open as u8]);
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockBoard {
    fn close_relay(&mut self) {
        self.relay_calls.push(RelayCall::Close);
        self.relay_closed = true;
    }

    fn open_relay(&mut self) {
        self.relay_calls.push(RelayCall::Open);
        self.relay_closed = false;
    }
}

impl SensorPort for MockBoard {
    fn is_open(&mut self) -> bool {
        self.door_open
    }
}

impl ButtonPort for MockBoard {
    fn button_pressed(&mut self) -> bool {
        self.button_down
    }
}

impl IndicatorPort for MockBoard {
    fn set_indicator(&mut self, blue: bool, red: bool) {
        self.indicator = (blue, red);
    }
}

impl NotificationTimer for MockBoard {
    fn arm(&mut self, duration_ms: u32) {
        self.arms.push(duration_ms);
        self.timer.arm(duration_ms);
    }

    fn fired(&mut self) -> bool {
        self.timer.fired()
    }
}

impl TransportIo for MockBoard {
    type Error = ();

    fn ready_to_receive(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> Result<u8, ()> {
        self.rx.pop_front().ok_or(())
    }

    fn ready_to_transmit(&mut self) -> bool {
        self.tx_ready
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), ()> {
        self.tx.push(byte);
        Ok(())
    }
}

// ── Recording event sink ──────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Simulation harness ────────────────────────────────────────

pub struct Sim {
    pub app: GarageService,
    pub hw: MockBoard,
    pub sink: RecordingSink,
    pub now_ms: u32,
}

#[allow(dead_code)]
impl Sim {
    pub fn new() -> Self {
        Self::with_config(&SystemConfig::default())
    }

    pub fn with_config(config: &SystemConfig) -> Self {
        let mut hw = MockBoard::new();
        let mut sink = RecordingSink::default();
        let mut app = GarageService::new(config);
        app.start(&mut hw, &mut sink);
        Self {
            app,
            hw,
            sink,
            now_ms: 0,
        }
    }

    /// One loop iteration at the current time, then advance 1 ms.
    pub fn step(&mut self) {
        self.hw.timer.advance_to(self.now_ms);
        self.app.poll(&mut self.hw, self.now_ms, &mut self.sink);
        self.now_ms = self.now_ms.wrapping_add(1);
    }

    pub fn run_for(&mut self, ms: u32) {
        for _ in 0..ms {
            self.step();
        }
    }

    /// Step until `pred` holds, for at most `limit_ms`.  Returns whether
    /// it held.
    pub fn run_until(&mut self, limit_ms: u32, mut pred: impl FnMut(&Sim) -> bool) -> bool {
        for _ in 0..limit_ms {
            if pred(self) {
                return true;
            }
            self.step();
        }
        pred(self)
    }

    /// Drain whatever the link has queued for the module.
    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.hw.tx)
    }
}

/// Outbound frame bytes as the MCU sends them (version 0x03).
#[allow(dead_code)]
pub fn outbound(opcode: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x55, 0xAA, 0x03, opcode, 0x00, payload.len() as u8];
    frame.extend_from_slice(payload);
    frame.push(checksum(&frame));
    frame
}
