//! Integration tests: GarageService → DoorController → relay / timer / LEDs.

use garagelatch::app::commands::AppCommand;
use garagelatch::app::events::AppEvent;
use garagelatch::fsm::DoorState;

use super::mock_hw::{RelayCall, Sim};

/// Generous bound for any single phase of a test.
const LIMIT_MS: u32 = 200_000;

fn at(state: DoorState) -> impl FnMut(&Sim) -> bool {
    move |sim| sim.app.state() == state
}

// ── Opening ───────────────────────────────────────────────────

#[test]
fn remote_open_pulses_relay_and_reaches_idle() {
    let mut sim = Sim::new();
    sim.run_for(5);
    sim.hw.send_command(true);

    assert!(sim.run_until(100, at(DoorState::OpenCommand)));
    sim.step();
    assert!(sim.hw.relay_closed, "relay energised on entry");
    assert_eq!(sim.hw.arms.last(), Some(&1_000));

    assert!(sim.run_until(1_100, at(DoorState::DoorOpening)));
    assert!(!sim.hw.relay_closed, "relay released after the pulse");

    sim.run_for(3_000);
    sim.hw.door_open = true;
    assert!(sim.run_until(10, at(DoorState::Idle)));
    assert_eq!(sim.hw.pulses(), 1);
    assert_eq!(
        sim.hw.relay_calls,
        vec![RelayCall::Open, RelayCall::Close, RelayCall::Open]
    );
}

#[test]
fn door_that_never_moves_ends_in_open_error() {
    let mut sim = Sim::new();
    sim.hw.send_command(true);
    assert!(sim.run_until(LIMIT_MS, at(DoorState::OpenError)));

    // Stays put, even with more commands arriving.
    sim.hw.send_command(true);
    sim.run_for(30_000);
    assert_eq!(sim.app.state(), DoorState::OpenError);
    assert_eq!(sim.hw.pulses(), 1);

    sim.hw.door_open = true;
    assert!(sim.run_until(10, at(DoorState::Idle)));
}

// ── Auto-close ────────────────────────────────────────────────

#[test]
fn manual_open_auto_closes_after_grace_period() {
    let mut sim = Sim::new();
    sim.run_for(5);
    sim.hw.door_open = true;
    assert!(sim.run_until(10, at(DoorState::Wait2Minutes)));
    let entered = sim.now_ms;

    assert!(sim.run_until(LIMIT_MS, at(DoorState::CloseCommand)));
    let waited = sim.now_ms.wrapping_sub(entered);
    assert!((120_000..=120_010).contains(&waited), "waited {waited} ms");

    assert!(sim.run_until(1_100, at(DoorState::DoorClosing)));
    sim.run_for(2_000);
    sim.hw.door_open = false;
    assert!(sim.run_until(10, at(DoorState::WatchDoor)));
    assert_eq!(sim.hw.pulses(), 1);
}

#[test]
fn stuck_door_retries_then_close_error() {
    let mut sim = Sim::new();
    sim.hw.door_open = true;
    assert!(sim.run_until(10, at(DoorState::Wait2Minutes)));
    sim.hw.send_command(false);
    assert!(sim.run_until(100, at(DoorState::CloseCommand)));

    assert!(sim.run_until(LIMIT_MS, at(DoorState::CloseError)));
    assert_eq!(sim.hw.pulses(), 4, "first pulse plus three retries");
    assert!(!sim.hw.relay_closed);

    sim.run_for(60_000);
    assert_eq!(sim.app.state(), DoorState::CloseError);

    sim.hw.door_open = false;
    assert!(sim.run_until(10, at(DoorState::WatchDoor)));
}

#[test]
fn door_closing_on_a_retry_recovers() {
    let mut sim = Sim::new();
    sim.hw.door_open = true;
    assert!(sim.run_until(10, at(DoorState::Wait2Minutes)));
    sim.app.handle_command(AppCommand::RequestClose, &mut sim.sink);

    assert!(sim.run_until(LIMIT_MS, |s| s.hw.pulses() == 2));
    assert_eq!(sim.app.retries_left(), 2);
    sim.run_for(1_500);
    sim.hw.door_open = false;
    assert!(sim.run_until(10, at(DoorState::WatchDoor)));
    assert_eq!(sim.hw.pulses(), 2);
}

// ── Lockdown ──────────────────────────────────────────────────

fn short_press(sim: &mut Sim) {
    sim.hw.button_down = true;
    sim.run_for(100);
    sim.hw.button_down = false;
    sim.run_for(50);
}

#[test]
fn short_press_toggles_lockdown_and_blocks_remote_open() {
    let mut sim = Sim::new();
    short_press(&mut sim);
    assert!(sim.app.lockdown());
    assert!(sim.sink.events.contains(&AppEvent::LockdownChanged(true)));

    sim.hw.send_command(true);
    sim.run_for(5_000);
    assert_eq!(sim.app.state(), DoorState::WatchDoor);
    assert_eq!(sim.hw.pulses(), 0);

    short_press(&mut sim);
    assert!(!sim.app.lockdown());
}

#[test]
fn lockdown_never_blocks_closing() {
    let mut sim = Sim::new();
    short_press(&mut sim);
    assert!(sim.app.lockdown());

    sim.hw.door_open = true;
    assert!(sim.run_until(10, at(DoorState::Wait2Minutes)));
    sim.hw.send_command(false);
    assert!(sim.run_until(100, at(DoorState::CloseCommand)));
}

#[test]
fn long_press_requests_wifi_reset() {
    let mut sim = Sim::new();
    sim.hw.button_down = true;
    sim.run_for(3_500);
    sim.hw.button_down = false;
    sim.run_for(100);

    assert!(!sim.app.lockdown(), "long press does not toggle lockdown");
    assert!(sim.sink.events.contains(&AppEvent::WifiResetRequested));
    assert!(sim.app.link().reset_in_progress());
    assert_eq!(sim.take_tx(), super::mock_hw::outbound(0x04, &[]));
}

// ── Indicator ─────────────────────────────────────────────────

#[test]
fn red_at_boot_until_first_poll() {
    let mut sim = Sim::new();
    assert_eq!(sim.hw.indicator, (false, true));
    assert_eq!(sim.hw.relay_calls, vec![RelayCall::Open]);
    sim.step();
    assert_eq!(sim.hw.indicator, (true, false));
}

#[test]
fn indicator_follows_state() {
    let mut sim = Sim::new();
    sim.run_for(5);
    assert_eq!(sim.hw.indicator, (true, false), "blue in WatchDoor");

    sim.hw.door_open = true;
    assert!(sim.run_until(10, at(DoorState::Wait2Minutes)));
    sim.step();
    assert_eq!(sim.hw.indicator, (false, true), "red while waiting");
}

// ── Events ────────────────────────────────────────────────────

#[test]
fn started_and_transitions_are_reported() {
    let mut sim = Sim::new();
    sim.hw.door_open = true;
    sim.run_for(10);
    assert_eq!(sim.sink.events[0], AppEvent::Started(DoorState::WatchDoor));
    assert!(sim.sink.events.contains(&AppEvent::StateChanged {
        from: DoorState::WatchDoor,
        to: DoorState::Wait2Minutes,
    }));
}
