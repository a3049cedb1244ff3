//! Integration tests: serial link ↔ door controller through the poll loop.

use garagelatch::app::events::AppEvent;
use garagelatch::config::SystemConfig;
use garagelatch::fsm::DoorState;
use garagelatch::link::Opcode;

use super::mock_hw::{Sim, outbound};

/// Enough iterations to move any queued frames across the wire.
const DRAIN_MS: u32 = 200;

fn warmed_up() -> Sim {
    let mut sim = Sim::new();
    sim.hw.send_frame(0x00, &[]);
    sim.run_for(DRAIN_MS);
    assert_eq!(sim.take_tx(), outbound(0x00, &[0x00]));
    sim
}

fn status(open: bool) -> Vec<u8> {
    outbound(0x07, &[0x01, 0x01, 0x00, 0x01, open as u8])
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn command_frame_on_the_wire_opens_the_door() {
    let mut sim = Sim::new();
    sim.hw
        .rx
        .extend([0x55, 0xAA, 0x00, 0x06, 0x00, 0x05, 0x01, 0x01, 0x00, 0x01, 0x01, 0x0E]);

    assert!(sim.run_until(100, |s| s.app.state() == DoorState::OpenCommand));
    assert!(
        sim.sink
            .events
            .contains(&AppEvent::FrameDispatched(Opcode::Command))
    );
    assert_eq!(sim.app.link_stats().checksum_mismatches, 0);
}

#[test]
fn link_recovers_from_a_corrupted_header() {
    let mut sim = Sim::new();
    sim.hw.rx.extend([0x00, 0x55, 0x13, 0xAA]);
    sim.hw.send_command(true);

    assert!(sim.run_until(100, |s| s.app.state() == DoorState::OpenCommand));
    assert!(sim.app.link().resyncs() >= 1);
}

#[test]
fn bad_checksum_is_accepted_by_default() {
    let mut sim = Sim::new();
    sim.hw
        .rx
        .extend([0x55, 0xAA, 0x00, 0x06, 0x00, 0x05, 0x01, 0x01, 0x00, 0x01, 0x01, 0xFF]);

    assert!(sim.run_until(100, |s| s.app.state() == DoorState::OpenCommand));
    assert_eq!(sim.app.link_stats().checksum_mismatches, 1);
    assert_eq!(sim.app.link_stats().dropped, 0);
}

#[test]
fn strict_checksum_drops_the_command() {
    let config = SystemConfig {
        verify_rx_checksum: true,
        ..SystemConfig::default()
    };
    let mut sim = Sim::with_config(&config);
    sim.hw
        .rx
        .extend([0x55, 0xAA, 0x00, 0x06, 0x00, 0x05, 0x01, 0x01, 0x00, 0x01, 0x01, 0xFF]);

    sim.run_for(DRAIN_MS);
    assert_eq!(sim.app.state(), DoorState::WatchDoor);
    assert_eq!(sim.app.link_stats().dropped, 1);
}

#[test]
fn remote_close_from_idle_starts_close_sequence() {
    let mut sim = Sim::new();
    sim.hw.send_command(true);
    assert!(sim.run_until(5_000, |s| s.app.state() == DoorState::DoorOpening));
    sim.hw.door_open = true;
    assert!(sim.run_until(10, |s| s.app.state() == DoorState::Idle));

    sim.hw.send_command(false);
    assert!(sim.run_until(100, |s| s.app.state() == DoorState::CloseCommand));
    assert_eq!(sim.app.retries_left(), 3);
}

// ── Status reporting ──────────────────────────────────────────

#[test]
fn no_status_before_first_heartbeat() {
    let mut sim = Sim::new();
    sim.hw.door_open = true;
    sim.run_for(DRAIN_MS);
    assert_eq!(sim.app.state(), DoorState::Wait2Minutes);
    assert!(sim.take_tx().is_empty());
    assert!(sim.app.link().last_known_open());
}

#[test]
fn door_movements_are_reported_after_warm_up() {
    let mut sim = warmed_up();

    sim.hw.door_open = true;
    sim.run_for(DRAIN_MS);
    assert_eq!(sim.take_tx(), status(true), "one report on manual open");

    sim.hw.door_open = false;
    sim.run_for(DRAIN_MS);
    assert_eq!(sim.app.state(), DoorState::WatchDoor);
    assert_eq!(sim.take_tx(), [status(false), status(false)].concat());
}

#[test]
fn status_drains_one_byte_per_ready_tick() {
    let mut sim = warmed_up();
    sim.hw.tx_ready = false;
    sim.hw.door_open = true;
    assert!(sim.run_until(10, |s| s.app.state() == DoorState::Wait2Minutes));
    sim.step(); // on-enter queues one "open" report
    assert!(sim.hw.tx.is_empty());

    let mut moved = 0;
    for i in 0..40 {
        let ready = i % 2 == 0;
        sim.hw.tx_ready = ready;
        let before = sim.hw.tx.len();
        sim.step();
        let sent = sim.hw.tx.len() - before;
        if ready {
            assert!(sent <= 1, "tick {i} sent {sent} bytes");
        } else {
            assert_eq!(sent, 0, "tick {i} sent while not ready");
        }
        moved += sent;
    }
    let frame = status(true);
    assert_eq!(frame.len(), 12);
    assert_eq!(moved, frame.len());
    assert_eq!(sim.take_tx(), frame);
    assert!(sim.app.link().tx_idle());
}

#[test]
fn query_status_sends_status_then_aux() {
    let mut sim = warmed_up();
    sim.hw.send_frame(0x08, &[]);
    sim.run_for(DRAIN_MS);

    let expected = [
        status(false),
        outbound(0x07, &[0x07, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00]),
    ]
    .concat();
    assert_eq!(sim.take_tx(), expected);
}

#[test]
fn second_heartbeat_reply_carries_one() {
    let mut sim = warmed_up();
    sim.hw.send_frame(0x00, &[]);
    sim.run_for(DRAIN_MS);
    assert_eq!(sim.take_tx(), outbound(0x00, &[0x01]));
}

// ── Session ───────────────────────────────────────────────────

#[test]
fn product_info_is_json() {
    let mut sim = Sim::new();
    sim.hw.send_frame(0x01, &[]);
    sim.run_for(DRAIN_MS);
    assert_eq!(
        sim.take_tx(),
        outbound(0x01, br#"{"p":"gl0000000000000a","v":"1.0.0","m":0}"#)
    );
}

#[test]
fn module_reset_handshake() {
    let mut sim = Sim::new();
    sim.hw.send_frame(0x04, &[]);
    sim.run_for(DRAIN_MS);
    assert!(sim.app.link().reset_in_progress());
    assert_eq!(sim.take_tx(), outbound(0x05, &[0x00]));

    sim.hw.send_frame(0x05, &[]);
    sim.run_for(DRAIN_MS);
    assert!(!sim.app.link().reset_in_progress());
}

#[test]
fn network_status_is_tracked() {
    let mut sim = Sim::new();
    sim.hw.send_frame(0x03, &[0x04]);
    sim.run_for(DRAIN_MS);
    assert_eq!(sim.app.link().network_status(), Some(0x04));
    assert_eq!(sim.take_tx(), outbound(0x03, &[]));
}

#[test]
fn unknown_opcode_is_counted_and_ignored() {
    let mut sim = Sim::new();
    sim.hw.send_frame(0x42, &[0x01]);
    sim.run_for(DRAIN_MS);
    assert_eq!(sim.app.link_stats().unknown_opcodes, 1);
    assert!(sim.take_tx().is_empty());
    assert_eq!(sim.app.state(), DoorState::WatchDoor);
}
