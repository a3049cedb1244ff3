//! Serial link to the companion Wi-Fi module.
//!
//! - [`codec`]: byte-at-a-time frame decoder and single-slot encoder
//! - [`datapoint`]: typed datapoint payloads (bool / u32)
//! - [`engine`]: [`ProtocolLink`], opcode dispatch and reply scheduling
//! - [`transport`]: the [`TransportIo`] byte channel the link is polled over

pub mod codec;
pub mod datapoint;
pub mod engine;
pub mod transport;

pub use codec::Opcode;
pub use engine::{LinkStats, ProtocolLink};
pub use transport::TransportIo;
