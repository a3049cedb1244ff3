//! Protocol engine: dispatches inbound frames and schedules replies.
//!
//! The engine owns the decoder, the single transmit slot, and the link
//! session state (warm-up, network status, Wi-Fi reset).  It never blocks:
//! each poll moves at most one byte in each direction.
//!
//! Replies are not written straight into the transmit slot.  Dispatch
//! latches the *kind* of reply it owes, and the transmit side builds the
//! highest-priority pending reply whenever the slot is empty:
//!
//! ```text
//!  inbound frame ──▶ dispatch ──▶ pending kinds ──(slot empty)──▶ encoder ──▶ 1 byte/poll
//!                        │
//!                        └──▶ ControlSignals (open/close requests)
//! ```

use heapless::String;
use log::{debug, info, trace, warn};
use serde::Serialize;

use crate::config::{PRODUCT_KEY_CAP, SystemConfig, VERSION_CAP};
use crate::error::LinkError;
use crate::fsm::context::ControlSignals;

use super::codec::{FrameDecoder, FrameEncoder, InboundFrame, Opcode};
use super::datapoint::{Datapoint, DpValue, MAX_DATAPOINT_LEN};
use super::transport::TransportIo;

/// Cap on status frames owed at once.  Further reports coalesce.
const MAX_STATUS_BACKLOG: u8 = 4;

// ---------------------------------------------------------------------------
// Pending replies
// ---------------------------------------------------------------------------

/// Reply kinds in build priority order (lowest bit first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Reply {
    Heartbeat = 1 << 0,
    ProductInfo = 1 << 1,
    McuMode = 1 << 2,
    NetworkAck = 1 << 3,
    PairingRequest = 1 << 4,
    WifiReset = 1 << 5,
    Aux = 1 << 6,
}

impl Reply {
    /// Build order.  Status reports slot in between `WifiReset` and `Aux`.
    const HEAD: [Reply; 6] = [
        Reply::Heartbeat,
        Reply::ProductInfo,
        Reply::McuMode,
        Reply::NetworkAck,
        Reply::PairingRequest,
        Reply::WifiReset,
    ];
}

#[derive(Debug, Default, Clone, Copy)]
struct PendingReplies(u8);

impl PendingReplies {
    fn set(&mut self, r: Reply) {
        self.0 |= r as u8;
    }

    fn clear(&mut self, r: Reply) {
        self.0 &= !(r as u8);
    }

    fn has(&self, r: Reply) -> bool {
        self.0 & r as u8 != 0
    }
}

/// Product descriptor returned for QueryProductInfo.
#[derive(Serialize)]
struct ProductInfo<'a> {
    p: &'a str,
    v: &'a str,
    m: u8,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Link counters, inspectable for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    /// Frames handed to dispatch (known or unknown opcode).
    pub frames: u32,
    /// Frames whose checksum did not match.
    pub checksum_mismatches: u32,
    /// Frames dropped under the strict checksum policy.
    pub dropped: u32,
    pub unknown_opcodes: u32,
    /// Replies abandoned because they did not fit the transmit slot.
    pub tx_overflows: u32,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Serial link to the companion Wi-Fi module.
pub struct ProtocolLink {
    decoder: FrameDecoder,
    encoder: FrameEncoder,

    status_dpid: u8,
    aux_dpid: u8,
    pairing_mode: u8,
    product_key: String<PRODUCT_KEY_CAP>,
    mcu_version: String<VERSION_CAP>,
    verify_rx_checksum: bool,

    /// A heartbeat has been received; status reports are allowed.
    warmed_up: bool,
    /// A heartbeat reply has been built; later replies carry 1.
    heartbeat_answered: bool,
    last_known_open: bool,
    status_backlog: u8,
    pending: PendingReplies,
    reset_in_progress: bool,
    network_status: Option<u8>,
    stats: LinkStats,
}

impl ProtocolLink {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            decoder: FrameDecoder::new(),
            encoder: FrameEncoder::new(),
            status_dpid: config.status_dpid,
            aux_dpid: config.aux_dpid,
            pairing_mode: config.pairing_mode,
            product_key: config.product_key.clone(),
            mcu_version: config.mcu_version.clone(),
            verify_rx_checksum: config.verify_rx_checksum,
            warmed_up: false,
            heartbeat_answered: false,
            last_known_open: false,
            status_backlog: 0,
            pending: PendingReplies::default(),
            reset_in_progress: false,
            network_status: None,
            stats: LinkStats::default(),
        }
    }

    // -- Receive side --

    /// Read at most one byte and dispatch the frame it completes.
    ///
    /// Returns the opcode of a dispatched frame with a known opcode.
    pub fn poll_receive<T: TransportIo>(
        &mut self,
        io: &mut T,
        signals: &mut ControlSignals,
    ) -> Option<Opcode> {
        if !io.ready_to_receive() {
            return None;
        }
        let byte = match io.read_byte() {
            Ok(b) => b,
            Err(e) => {
                warn!("link: read failed: {:?}", e);
                return None;
            }
        };
        let frame = self.decoder.feed(byte)?;
        self.accept(&frame, signals)
    }

    /// Apply the checksum policy, then dispatch.
    fn accept(&mut self, frame: &InboundFrame, signals: &mut ControlSignals) -> Option<Opcode> {
        if !frame.checksum_ok() {
            self.stats.checksum_mismatches = self.stats.checksum_mismatches.wrapping_add(1);
            if self.verify_rx_checksum {
                self.stats.dropped = self.stats.dropped.wrapping_add(1);
                debug!(
                    "link: drop op 0x{:02x}, checksum 0x{:02x} != 0x{:02x}",
                    frame.opcode, frame.checksum, frame.computed
                );
                return None;
            }
            trace!("link: checksum mismatch on op 0x{:02x}, accepted", frame.opcode);
        }
        self.dispatch(frame, signals)
    }

    /// Act on one received frame.
    pub fn dispatch(&mut self, frame: &InboundFrame, signals: &mut ControlSignals) -> Option<Opcode> {
        self.stats.frames = self.stats.frames.wrapping_add(1);

        let op = match Opcode::try_from(frame.opcode) {
            Ok(op) if op != Opcode::Status => op,
            _ => {
                self.stats.unknown_opcodes = self.stats.unknown_opcodes.wrapping_add(1);
                debug!("link: unknown opcode 0x{:02x}", frame.opcode);
                self.encoder.reset_checksum();
                return None;
            }
        };

        match op {
            Opcode::Heartbeat => {
                if !self.warmed_up {
                    info!("link: first heartbeat, module is up");
                }
                self.warmed_up = true;
                self.pending.set(Reply::Heartbeat);
            }
            Opcode::QueryProductInfo => self.pending.set(Reply::ProductInfo),
            Opcode::QueryMcu => self.pending.set(Reply::McuMode),
            Opcode::ReportNetworkStatus => {
                let status = frame.payload().first().copied();
                if status.is_some() && status != self.network_status {
                    info!("link: network status {:?}", status);
                }
                if status.is_some() {
                    self.network_status = status;
                }
                self.pending.set(Reply::NetworkAck);
            }
            Opcode::ResetWifi => {
                info!("link: module asked for Wi-Fi reset");
                self.reset_in_progress = true;
                self.pending.set(Reply::PairingRequest);
            }
            Opcode::SetPairingMode => {
                debug!("link: pairing mode acknowledged");
                self.reset_in_progress = false;
            }
            Opcode::Command => self.handle_command(frame.payload(), signals),
            Opcode::QueryStatus => {
                self.queue_status(self.last_known_open, 1);
                self.pending.set(Reply::Aux);
            }
            Opcode::Status => {}
        }
        Some(op)
    }

    fn handle_command(&mut self, payload: &[u8], signals: &mut ControlSignals) {
        match Datapoint::decode(payload) {
            Some(Datapoint {
                value: DpValue::Bool(true),
                ..
            }) => {
                info!("link: remote open");
                signals.request_open();
            }
            Some(Datapoint {
                value: DpValue::Bool(false),
                ..
            }) => {
                info!("link: remote close");
                signals.request_close();
            }
            other => debug!("link: ignored command {:?}", other),
        }
    }

    // -- Transmit side --

    /// Build the next pending reply if the slot is empty, then send at most
    /// one byte.
    pub fn poll_transmit<T: TransportIo>(&mut self, io: &mut T) {
        if self.encoder.is_idle() {
            self.build_next();
        }
        let Some(byte) = self.encoder.peek() else {
            return;
        };
        if !io.ready_to_transmit() {
            return;
        }
        match io.write_byte(byte) {
            Ok(()) => self.encoder.advance(),
            Err(e) => warn!("link: write failed: {:?}", e),
        }
    }

    /// Record the door state and, once the module is up, owe it `repeats`
    /// status frames.
    pub fn report_status(&mut self, open: bool, repeats: u8) {
        self.queue_status(open, repeats);
    }

    /// Ask the module to forget its Wi-Fi credentials.
    pub fn request_wifi_reset(&mut self) {
        info!("link: requesting Wi-Fi reset");
        self.reset_in_progress = true;
        self.pending.set(Reply::WifiReset);
    }

    fn queue_status(&mut self, open: bool, repeats: u8) {
        self.last_known_open = open;
        if !self.warmed_up {
            trace!("link: status before first heartbeat, not sent");
            return;
        }
        self.status_backlog = self
            .status_backlog
            .saturating_add(repeats)
            .min(MAX_STATUS_BACKLOG);
    }

    /// Build the highest-priority pending reply into the empty slot.
    fn build_next(&mut self) {
        if let Some(&reply) = Reply::HEAD.iter().find(|r| self.pending.has(**r)) {
            self.pending.clear(reply);
            let built = self.build(reply);
            self.note_build(built);
        } else if self.status_backlog > 0 {
            self.status_backlog -= 1;
            let dp = Datapoint::bool(self.status_dpid, self.last_known_open);
            let built = self.encode_datapoint(dp);
            self.note_build(built);
        } else if self.pending.has(Reply::Aux) {
            self.pending.clear(Reply::Aux);
            let built = self.build(Reply::Aux);
            self.note_build(built);
        }
    }

    fn build(&mut self, reply: Reply) -> Result<(), LinkError> {
        match reply {
            Reply::Heartbeat => {
                let beat = self.heartbeat_answered as u8;
                self.heartbeat_answered = true;
                self.encoder.encode(Opcode::Heartbeat, &[&[beat]])
            }
            Reply::ProductInfo => {
                let info = ProductInfo {
                    p: &self.product_key,
                    v: &self.mcu_version,
                    m: 0,
                };
                let json = serde_json::to_string(&info).map_err(|_| LinkError::SlotOverflow)?;
                self.encoder
                    .encode(Opcode::QueryProductInfo, &[json.as_bytes()])
            }
            // Zero length selects self-processing mode: the module has no
            // reset line to the MCU.
            Reply::McuMode => self.encoder.encode(Opcode::QueryMcu, &[]),
            Reply::NetworkAck => self.encoder.encode(Opcode::ReportNetworkStatus, &[]),
            Reply::PairingRequest => self
                .encoder
                .encode(Opcode::SetPairingMode, &[&[self.pairing_mode]]),
            Reply::WifiReset => self.encoder.encode(Opcode::ResetWifi, &[]),
            Reply::Aux => self.encode_datapoint(Datapoint::u32(self.aux_dpid, 0)),
        }
    }

    fn encode_datapoint(&mut self, dp: Datapoint) -> Result<(), LinkError> {
        let mut buf = [0u8; MAX_DATAPOINT_LEN];
        let n = dp.encode(&mut buf);
        self.encoder.encode(Opcode::Status, &[&buf[..n]])
    }

    fn note_build(&mut self, built: Result<(), LinkError>) {
        if let Err(e) = built {
            self.stats.tx_overflows = self.stats.tx_overflows.wrapping_add(1);
            warn!("link: reply dropped: {}", e);
        }
    }

    // -- Accessors --

    /// A heartbeat has been seen since boot.
    pub fn is_warmed_up(&self) -> bool {
        self.warmed_up
    }

    pub fn reset_in_progress(&self) -> bool {
        self.reset_in_progress
    }

    /// Last network status byte reported by the module.
    pub fn network_status(&self) -> Option<u8> {
        self.network_status
    }

    pub fn last_known_open(&self) -> bool {
        self.last_known_open
    }

    /// Nothing is draining and no reply is owed.
    pub fn tx_idle(&self) -> bool {
        self.encoder.is_idle() && self.pending.0 == 0 && self.status_backlog == 0
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Partial inbound frames abandoned since boot.
    pub fn resyncs(&self) -> u32 {
        self.decoder.resyncs()
    }
}
