//! Peripheral drivers: relay, digital inputs, indicator LEDs, one-shot
//! timer, and the module UART.

pub mod button;
pub mod door_sensor;
pub mod hw_timer;
pub mod indicator;
pub mod relay;
pub mod uart;
