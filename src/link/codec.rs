//! Byte-level frame codec for the companion module link.
//!
//! Wire format:
//! ```text
//! ┌──────┬──────┬─────┬────────┬──────┬──────┬─────────────┬──────────┐
//! │ 0x55 │ 0xAA │ ver │ opcode │ 0x00 │ len  │ payload (N) │ checksum │
//! └──────┴──────┴─────┴────────┴──────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is the low byte of the sum of every preceding byte.
//! Frames from the module carry version `0x00`; frames we send carry
//! version `0x03`.
//!
//! The decoder consumes one byte at a time and holds at most one frame.
//! Any byte failing its positional check drops the partial frame and the
//! decoder hunts for the next header.  The encoder writes into a single
//! transmit slot that must drain before the next frame can be built.

use heapless::Vec;
use log::trace;

use crate::error::LinkError;

/// First header byte.
pub const HEADER_1: u8 = 0x55;
/// Second header byte.
pub const HEADER_2: u8 = 0xAA;
/// Version byte on frames received from the module.
pub const RX_VERSION: u8 = 0x00;
/// Version byte on frames sent to the module.
pub const TX_VERSION: u8 = 0x03;

/// Largest inbound payload the decoder buffers.  Longer frames are dropped.
pub const MAX_RX_PAYLOAD: usize = 8;

/// Capacity of the transmit slot, header and checksum included.
pub const TX_SLOT_SIZE: usize = 70;

/// Header, version, opcode, and the two length bytes.
const PREAMBLE_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

/// Frame opcodes understood on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Heartbeat = 0x00,
    QueryProductInfo = 0x01,
    QueryMcu = 0x02,
    ReportNetworkStatus = 0x03,
    ResetWifi = 0x04,
    SetPairingMode = 0x05,
    Command = 0x06,
    /// Outbound only: datapoint status report.
    Status = 0x07,
    QueryStatus = 0x08,
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0x00 => Self::Heartbeat,
            0x01 => Self::QueryProductInfo,
            0x02 => Self::QueryMcu,
            0x03 => Self::ReportNetworkStatus,
            0x04 => Self::ResetWifi,
            0x05 => Self::SetPairingMode,
            0x06 => Self::Command,
            0x07 => Self::Status,
            0x08 => Self::QueryStatus,
            other => return Err(other),
        })
    }
}

/// Low byte of the sum of `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A complete frame as received, before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundFrame {
    /// Raw opcode byte (may be unknown).
    pub opcode: u8,
    len: u8,
    payload: [u8; MAX_RX_PAYLOAD],
    /// Checksum byte as received.
    pub checksum: u8,
    /// Checksum computed over the received bytes.
    pub computed: u8,
}

impl InboundFrame {
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len as usize]
    }

    pub fn checksum_ok(&self) -> bool {
        self.checksum == self.computed
    }
}

/// Position within the frame currently being received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    Header1,
    Header2,
    Version,
    Opcode,
    LengthHigh,
    LengthLow,
    Payload,
    Checksum,
}

/// Streaming frame decoder, fed one byte at a time.
pub struct FrameDecoder {
    state: RxState,
    opcode: u8,
    len: u8,
    index: u8,
    payload: [u8; MAX_RX_PAYLOAD],
    sum: u8,
    resyncs: u32,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: RxState::Header1,
            opcode: 0,
            len: 0,
            index: 0,
            payload: [0; MAX_RX_PAYLOAD],
            sum: 0,
            resyncs: 0,
        }
    }

    /// Feed one byte.  Returns a frame when `byte` was its checksum.
    pub fn feed(&mut self, byte: u8) -> Option<InboundFrame> {
        match self.state {
            RxState::Header1 => {
                if byte == HEADER_1 {
                    self.start(byte);
                }
            }
            RxState::Header2 => self.expect(byte, HEADER_2, RxState::Version),
            RxState::Version => self.expect(byte, RX_VERSION, RxState::Opcode),
            RxState::Opcode => {
                self.opcode = byte;
                self.advance(byte, RxState::LengthHigh);
            }
            RxState::LengthHigh => self.expect(byte, 0x00, RxState::LengthLow),
            RxState::LengthLow => {
                if byte as usize > MAX_RX_PAYLOAD {
                    trace!("link: rx length {} exceeds buffer", byte);
                    self.resync(byte);
                } else {
                    self.len = byte;
                    self.index = 0;
                    let next = if byte == 0 {
                        RxState::Checksum
                    } else {
                        RxState::Payload
                    };
                    self.advance(byte, next);
                }
            }
            RxState::Payload => {
                self.payload[self.index as usize] = byte;
                self.index += 1;
                self.sum = self.sum.wrapping_add(byte);
                if self.index == self.len {
                    self.state = RxState::Checksum;
                }
            }
            RxState::Checksum => {
                let frame = InboundFrame {
                    opcode: self.opcode,
                    len: self.len,
                    payload: self.payload,
                    checksum: byte,
                    computed: self.sum,
                };
                self.state = RxState::Header1;
                return Some(frame);
            }
        }
        None
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.state = RxState::Header1;
    }

    /// Whether the decoder is between frames.
    pub fn is_idle(&self) -> bool {
        self.state == RxState::Header1
    }

    /// Partial frames abandoned because of an unexpected byte.
    pub fn resyncs(&self) -> u32 {
        self.resyncs
    }

    fn start(&mut self, byte: u8) {
        self.sum = byte;
        self.state = RxState::Header2;
    }

    fn advance(&mut self, byte: u8, next: RxState) {
        self.sum = self.sum.wrapping_add(byte);
        self.state = next;
    }

    fn expect(&mut self, byte: u8, want: u8, next: RxState) {
        if byte == want {
            self.advance(byte, next);
        } else {
            self.resync(byte);
        }
    }

    /// Abandon the partial frame.  The offending byte may itself open the
    /// next frame.
    fn resync(&mut self, byte: u8) {
        self.resyncs = self.resyncs.wrapping_add(1);
        trace!("link: resync on 0x{:02x} in {:?}", byte, self.state);
        if byte == HEADER_1 {
            self.start(byte);
        } else {
            self.state = RxState::Header1;
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Single-slot frame builder with a running checksum.
///
/// A frame is built in one go with [`FrameEncoder::encode`] (or the
/// `begin` / `push` / `finish` primitives) and drained one byte at a time
/// with [`FrameEncoder::next_byte`].  Building is refused while bytes of
/// the previous frame remain.
pub struct FrameEncoder {
    slot: Vec<u8, TX_SLOT_SIZE>,
    index: usize,
    checksum: u8,
}

impl FrameEncoder {
    pub fn new() -> Self {
        Self {
            slot: Vec::new(),
            index: 0,
            checksum: 0,
        }
    }

    /// No frame is built or draining.
    pub fn is_idle(&self) -> bool {
        self.slot.is_empty()
    }

    /// Bytes still waiting to be drained.
    pub fn pending(&self) -> usize {
        self.slot.len() - self.index
    }

    /// Start a frame: header, version, opcode, and length.
    pub fn begin(&mut self, opcode: Opcode, len: u8) -> Result<(), LinkError> {
        if !self.is_idle() {
            return Err(LinkError::SlotBusy);
        }
        self.push_all(&[HEADER_1, HEADER_2, TX_VERSION, opcode as u8, 0x00, len])
    }

    /// Append one byte and fold it into the running checksum.
    pub fn push(&mut self, byte: u8) -> Result<(), LinkError> {
        self.slot.push(byte).map_err(|_| LinkError::SlotOverflow)?;
        self.checksum = self.checksum.wrapping_add(byte);
        Ok(())
    }

    pub fn push_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        bytes.iter().try_for_each(|&b| self.push(b))
    }

    /// Append the running checksum and reset it.
    pub fn finish(&mut self) -> Result<(), LinkError> {
        let sum = self.checksum;
        self.slot.push(sum).map_err(|_| LinkError::SlotOverflow)?;
        self.checksum = 0;
        Ok(())
    }

    /// Build a whole frame whose payload is the concatenation of `parts`.
    ///
    /// On overflow the partial frame is discarded and the slot is left
    /// idle.
    pub fn encode(&mut self, opcode: Opcode, parts: &[&[u8]]) -> Result<(), LinkError> {
        let len: usize = parts.iter().map(|p| p.len()).sum();
        if PREAMBLE_LEN + len + 1 > TX_SLOT_SIZE {
            return Err(LinkError::SlotOverflow);
        }
        self.begin(opcode, len as u8)?;
        let built = parts
            .iter()
            .try_for_each(|p| self.push_all(p))
            .and_then(|()| self.finish());
        if built.is_err() {
            self.discard();
        }
        built
    }

    /// Next byte to send, without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.slot.get(self.index).copied()
    }

    /// Mark the peeked byte as sent.  Index and length return to zero once
    /// the last byte is gone.
    pub fn advance(&mut self) {
        if self.index < self.slot.len() {
            self.index += 1;
        }
        if self.index >= self.slot.len() {
            self.slot.clear();
            self.index = 0;
        }
    }

    /// Take the next byte to send.
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.advance();
        Some(byte)
    }

    /// Zero the running checksum without touching the slot.
    pub fn reset_checksum(&mut self) {
        self.checksum = 0;
    }

    fn discard(&mut self) {
        self.slot.clear();
        self.index = 0;
        self.checksum = 0;
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}
