//! Datapoint payloads carried by Command (0x06) and Status (0x07) frames.
//!
//! ```text
//! ┌──────┬──────┬───────┬───────┬───────────────┐
//! │ dpid │ type │ len_h │ len_l │ value (len B) │
//! └──────┴──────┴───────┴───────┴───────────────┘
//! type 0x01 = bool (1 byte), type 0x02 = u32 (4 bytes, big-endian)
//! ```

/// Datapoint type byte for a boolean.
pub const TYPE_BOOL: u8 = 0x01;
/// Datapoint type byte for a 32-bit value.
pub const TYPE_U32: u8 = 0x02;

/// Longest encoded datapoint.
pub const MAX_DATAPOINT_LEN: usize = 8;

/// Typed value of a datapoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DpValue {
    Bool(bool),
    U32(u32),
}

/// One datapoint: id plus typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datapoint {
    pub dpid: u8,
    pub value: DpValue,
}

impl Datapoint {
    pub const fn bool(dpid: u8, value: bool) -> Self {
        Self {
            dpid,
            value: DpValue::Bool(value),
        }
    }

    pub const fn u32(dpid: u8, value: u32) -> Self {
        Self {
            dpid,
            value: DpValue::U32(value),
        }
    }

    /// Encode into `out`, returning the number of bytes written.
    pub fn encode(&self, out: &mut [u8; MAX_DATAPOINT_LEN]) -> usize {
        match self.value {
            DpValue::Bool(v) => {
                out[..5].copy_from_slice(&[self.dpid, TYPE_BOOL, 0x00, 0x01, v as u8]);
                5
            }
            DpValue::U32(v) => {
                out[..4].copy_from_slice(&[self.dpid, TYPE_U32, 0x00, 0x04]);
                out[4..8].copy_from_slice(&v.to_be_bytes());
                8
            }
        }
    }

    /// Parse a datapoint from a frame payload.
    ///
    /// Booleans must carry 0 or 1.  Returns `None` for short payloads,
    /// unknown types, and out-of-range values.
    pub fn decode(payload: &[u8]) -> Option<Self> {
        let (&[dpid, kind, len_h, len_l], value) = payload.split_first_chunk::<4>()?;
        if len_h != 0 || value.len() < len_l as usize {
            return None;
        }
        let value = match (kind, len_l) {
            (TYPE_BOOL, 1) => match value[0] {
                0 => DpValue::Bool(false),
                1 => DpValue::Bool(true),
                _ => return None,
            },
            (TYPE_U32, 4) => {
                let (raw, _) = value.split_first_chunk::<4>()?;
                DpValue::U32(u32::from_be_bytes(*raw))
            }
            _ => return None,
        };
        Some(Self { dpid, value })
    }
}
