//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the door controller, the companion-module link, the
//! status indicator, and the front-panel button into one poll loop.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
