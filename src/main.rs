//! GarageLatch Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative poll loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter             LogEventSink      UptimeClock     │
//! │  (relay, door, button,       (EventSink)       (now_ms)        │
//! │   LEDs, UART, esp_timer)                                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              GarageService (pure logic)                │    │
//! │  │  DoorController · ProtocolLink · Indicator · Button    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, ensure};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use garagelatch::adapters::hardware::{BoardPins, HardwareAdapter};
use garagelatch::adapters::log_sink::LogEventSink;
use garagelatch::adapters::time::UptimeClock;
use garagelatch::app::service::GarageService;
use garagelatch::config::SystemConfig;
use garagelatch::drivers::hw_timer::EspNotificationTimer;
use garagelatch::drivers::uart::UartChannel;
use garagelatch::error::Error;
use garagelatch::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GarageLatch v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let io = peripherals.pins;

    let relay = PinDriver::output(io.gpio4)?;
    let mut door = PinDriver::input(io.gpio5)?;
    door.set_pull(Pull::Up)?;
    let mut button = PinDriver::input(io.gpio6)?;
    button.set_pull(Pull::Up)?;
    let led_blue = PinDriver::output(io.gpio7)?;
    let led_red = PinDriver::output(io.gpio15)?;

    ensure!(relay.pin() == pins::RELAY_GPIO, "relay pin mismatch");
    ensure!(door.pin() == pins::DOOR_SENSOR_GPIO, "door sensor pin mismatch");
    ensure!(button.pin() == pins::BUTTON_GPIO, "button pin mismatch");
    ensure!(led_blue.pin() == pins::LED_BLUE_GPIO, "blue LED pin mismatch");
    ensure!(led_red.pin() == pins::LED_RED_GPIO, "red LED pin mismatch");

    let uart = UartChannel::new(
        pins::MODULE_UART_PORT,
        pins::MODULE_UART_TX_GPIO,
        pins::MODULE_UART_RX_GPIO,
        config.uart_baud,
    )
    .map_err(Error::from)?;
    let timer = EspNotificationTimer::new().map_err(Error::from)?;

    let mut hw = HardwareAdapter::new(
        BoardPins {
            relay,
            door,
            button,
            led_blue,
            led_red,
        },
        uart,
        timer,
    );

    // ── 4. Application service ────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut app = GarageService::new(&config);
    let clock = UptimeClock::new();
    app.start(&mut hw, &mut sink);

    info!("System ready. Entering poll loop.");

    // ── 5. Poll loop ──────────────────────────────────────────
    loop {
        app.poll(&mut hw, clock.now_ms(), &mut sink);
        FreeRtos::delay_ms(config.loop_interval_ms);
    }
}
