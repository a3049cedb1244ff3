//! Adapters (outer ring): concrete implementations of the port traits.

pub mod hardware;
pub mod log_sink;
pub mod time;
