//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the relay, the two digital inputs, the indicator LEDs, the module
//! UART, and the notification timer, and exposes them through the port
//! traits the [`GarageService`](crate::app::service::GarageService) polls.
//! This is the only module in the system that touches actual hardware.
//!
//! The pin types are generic over `embedded-hal` 1.0 digital traits, so
//! the same adapter drives ESP-IDF `PinDriver`s on target and fake pins in
//! host tests.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ActuatorPort, ButtonPort, IndicatorPort, NotificationTimer, SensorPort};
use crate::drivers::door_sensor::{ButtonLine, DoorSensor};
use crate::drivers::indicator::{IndicatorFrame, IndicatorLeds};
use crate::drivers::relay::Relay;
use crate::drivers::uart::UartChannel;
use crate::error::HwError;
use crate::link::TransportIo;

/// Digital pins of the latch board.
pub struct BoardPins<RELAY, DOOR, BUTTON, BLUE, RED> {
    pub relay: RELAY,
    pub door: DOOR,
    pub button: BUTTON,
    pub led_blue: BLUE,
    pub led_red: RED,
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<RELAY, DOOR, BUTTON, BLUE, RED, TIMER>
where
    RELAY: OutputPin,
    DOOR: InputPin,
    BUTTON: InputPin,
    BLUE: OutputPin,
    RED: OutputPin,
{
    relay: Relay<RELAY>,
    door: DoorSensor<DOOR>,
    button: ButtonLine<BUTTON>,
    leds: IndicatorLeds<BLUE, RED>,
    uart: UartChannel,
    timer: TIMER,
}

impl<RELAY, DOOR, BUTTON, BLUE, RED, TIMER> HardwareAdapter<RELAY, DOOR, BUTTON, BLUE, RED, TIMER>
where
    RELAY: OutputPin,
    DOOR: InputPin,
    BUTTON: InputPin,
    BLUE: OutputPin,
    RED: OutputPin,
    TIMER: NotificationTimer,
{
    /// Take ownership of the peripherals.  The relay starts released and
    /// both LEDs dark.
    pub fn new(
        pins: BoardPins<RELAY, DOOR, BUTTON, BLUE, RED>,
        uart: UartChannel,
        timer: TIMER,
    ) -> Self {
        Self {
            relay: Relay::new(pins.relay),
            door: DoorSensor::new(pins.door),
            button: ButtonLine::new(pins.button),
            leds: IndicatorLeds::new(pins.led_blue, pins.led_red),
            uart,
            timer,
        }
    }

    pub fn relay_closed(&self) -> bool {
        self.relay.is_closed()
    }

    pub fn uart_mut(&mut self) -> &mut UartChannel {
        &mut self.uart
    }

    pub fn timer_mut(&mut self) -> &mut TIMER {
        &mut self.timer
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<RELAY, DOOR, BUTTON, BLUE, RED, TIMER> ActuatorPort
    for HardwareAdapter<RELAY, DOOR, BUTTON, BLUE, RED, TIMER>
where
    RELAY: OutputPin,
    DOOR: InputPin,
    BUTTON: InputPin,
    BLUE: OutputPin,
    RED: OutputPin,
{
    fn close_relay(&mut self) {
        self.relay.close();
    }

    fn open_relay(&mut self) {
        self.relay.open();
    }
}

// ── Input ports ───────────────────────────────────────────────

impl<RELAY, DOOR, BUTTON, BLUE, RED, TIMER> SensorPort
    for HardwareAdapter<RELAY, DOOR, BUTTON, BLUE, RED, TIMER>
where
    RELAY: OutputPin,
    DOOR: InputPin,
    BUTTON: InputPin,
    BLUE: OutputPin,
    RED: OutputPin,
{
    fn is_open(&mut self) -> bool {
        self.door.is_open()
    }
}

impl<RELAY, DOOR, BUTTON, BLUE, RED, TIMER> ButtonPort
    for HardwareAdapter<RELAY, DOOR, BUTTON, BLUE, RED, TIMER>
where
    RELAY: OutputPin,
    DOOR: InputPin,
    BUTTON: InputPin,
    BLUE: OutputPin,
    RED: OutputPin,
{
    fn button_pressed(&mut self) -> bool {
        self.button.is_pressed()
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<RELAY, DOOR, BUTTON, BLUE, RED, TIMER> IndicatorPort
    for HardwareAdapter<RELAY, DOOR, BUTTON, BLUE, RED, TIMER>
where
    RELAY: OutputPin,
    DOOR: InputPin,
    BUTTON: InputPin,
    BLUE: OutputPin,
    RED: OutputPin,
{
    fn set_indicator(&mut self, blue: bool, red: bool) {
        self.leds.show(IndicatorFrame { blue, red });
    }
}

// ── Timer and transport pass-through ──────────────────────────

impl<RELAY, DOOR, BUTTON, BLUE, RED, TIMER> NotificationTimer
    for HardwareAdapter<RELAY, DOOR, BUTTON, BLUE, RED, TIMER>
where
    RELAY: OutputPin,
    DOOR: InputPin,
    BUTTON: InputPin,
    BLUE: OutputPin,
    RED: OutputPin,
    TIMER: NotificationTimer,
{
    fn arm(&mut self, duration_ms: u32) {
        self.timer.arm(duration_ms);
    }

    fn fired(&mut self) -> bool {
        self.timer.fired()
    }
}

impl<RELAY, DOOR, BUTTON, BLUE, RED, TIMER> TransportIo
    for HardwareAdapter<RELAY, DOOR, BUTTON, BLUE, RED, TIMER>
where
    RELAY: OutputPin,
    DOOR: InputPin,
    BUTTON: InputPin,
    BLUE: OutputPin,
    RED: OutputPin,
{
    type Error = HwError;

    fn ready_to_receive(&mut self) -> bool {
        self.uart.ready_to_receive()
    }

    fn read_byte(&mut self) -> Result<u8, HwError> {
        self.uart.read_byte()
    }

    fn ready_to_transmit(&mut self) -> bool {
        self.uart.ready_to_transmit()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), HwError> {
        self.uart.write_byte(byte)
    }
}
