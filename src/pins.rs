//! GPIO / peripheral pin assignments for the latch controller board.
//!
//! Single source of truth: `main` takes the matching pins from
//! `Peripherals` and asserts they agree with the numbers below.

// ---------------------------------------------------------------------------
// Door actuator
// ---------------------------------------------------------------------------

/// Digital output: HIGH energises the relay that shorts the opener's
/// push-button contacts.
pub const RELAY_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Digital input with pull-up: reed switch on the door frame.
/// HIGH = door open (magnet away), LOW = door closed.
pub const DOOR_SENSOR_GPIO: i32 = 5;

/// Digital input with pull-up: front-panel push button, active LOW.
pub const BUTTON_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Status LEDs
// ---------------------------------------------------------------------------

pub const LED_BLUE_GPIO: i32 = 7;
pub const LED_RED_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Companion Wi-Fi module (UART1)
// ---------------------------------------------------------------------------

pub const MODULE_UART_PORT: i32 = 1;
pub const MODULE_UART_TX_GPIO: i32 = 17;
pub const MODULE_UART_RX_GPIO: i32 = 18;
