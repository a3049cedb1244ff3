//! Transport abstraction for the companion module link.
//!
//! A half-duplex byte channel polled once per loop iteration.  The link
//! reads at most one byte and writes at most one byte per poll, so the
//! channel only has to expose readiness and single-byte transfers.
//!
//! Concrete implementations:
//! - UART on target (`drivers::uart::UartChannel`)
//! - in-memory loopback on host (same type, simulated)

/// Byte-oriented, non-blocking serial channel.
pub trait TransportIo {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// A received byte is waiting.
    fn ready_to_receive(&mut self) -> bool;

    /// Take the waiting byte.  Only called after `ready_to_receive`.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// The channel can accept one more byte.
    fn ready_to_transmit(&mut self) -> bool;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;
}

/// A transport that never receives and discards all writes.
pub struct NullTransport;

impl TransportIo for NullTransport {
    type Error = ();

    fn ready_to_receive(&mut self) -> bool {
        false
    }

    fn read_byte(&mut self) -> Result<u8, ()> {
        Err(())
    }

    fn ready_to_transmit(&mut self) -> bool {
        true
    }

    fn write_byte(&mut self, _byte: u8) -> Result<(), ()> {
        Ok(())
    }
}
