//! XGEM frame: the SDU-encapsulation unit multiplexed inside one burst.
//!
//! Grounded on `original_source/model/xgpon-onu-xgem-engine.cc`: the
//! producer packs SDUs into XGEM frames addressed by port ID, fragmenting
//! when an SDU is larger than the remaining grant, and pads any leftover
//! space with idle frames — a full-size idle frame when at least
//! `XGEM_HEADER_LEN` bytes remain, otherwise a 4-byte short-idle filler.
use crate::error::DbaError;
use alloc::vec::Vec;

/// 8-byte XGEM header: `PLI(14b) | KeyIdx(2b) | PortId(16b) | Options(18b) |
/// HEC(13b) | LastFragment(1b)`. HEC is out of scope (`spec.md` §1) and is
/// always zero on encode, ignored on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XgemHeader {
    /// Payload length indicator, in bytes (max 16383).
    pub pli: u16,
    pub key_index: u8,
    pub port_id: u16,
    pub options: u32,
    pub last_fragment: bool,
}

pub const XGEM_HEADER_LEN: usize = 8;
/// Largest value the 14-bit PLI field can carry.
pub const XGEM_MAX_FRAME_LEN: u16 = (1 << 14) - 1;
/// Reserved GEM port ID marking an idle (padding) frame.
pub const XGEM_IDLE_PORT_ID: u16 = 0xFFFF;

impl XgemHeader {
    pub fn idle(payload_len: u16) -> Self {
        XgemHeader {
            pli: payload_len,
            key_index: 0,
            port_id: XGEM_IDLE_PORT_ID,
            options: 0,
            last_fragment: true,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.port_id == XGEM_IDLE_PORT_ID
    }

    pub fn serialize(&self, out: &mut [u8]) -> Result<usize, DbaError> {
        if out.len() < XGEM_HEADER_LEN {
            return Err(DbaError::BufferTooShort);
        }
        if self.pli > XGEM_MAX_FRAME_LEN {
            return Err(DbaError::InvalidEnumValue);
        }
        let mut word: u64 = 0;
        word |= (self.pli as u64 & 0x3FFF) << 50;
        word |= (self.key_index as u64 & 0x3) << 48;
        word |= (self.port_id as u64) << 32;
        word |= (self.options as u64 & 0x3FFFF) << 14;
        word |= self.last_fragment as u64;
        out[0..8].copy_from_slice(&word.to_be_bytes());
        Ok(XGEM_HEADER_LEN)
    }

    pub fn deserialize(buf: &[u8]) -> Result<Self, DbaError> {
        if buf.len() < XGEM_HEADER_LEN {
            return Err(DbaError::BufferTooShort);
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&buf[0..8]);
        let word = u64::from_be_bytes(bytes);
        Ok(XgemHeader {
            pli: ((word >> 50) & 0x3FFF) as u16,
            key_index: ((word >> 48) & 0x3) as u8,
            port_id: ((word >> 32) & 0xFFFF) as u16,
            options: ((word >> 14) & 0x3FFFF) as u32,
            last_fragment: word & 0x1 != 0,
        })
    }
}

/// One XGEM frame, as queued for transmission within a burst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XgemFrame {
    /// An SDU fragment addressed to a GEM port.
    Data { header: XgemHeader, payload: Vec<u8> },
    /// A full-size padding frame (header + `len` bytes of zero payload).
    Idle { len: u16 },
    /// The smallest possible filler: exactly 4 zero bytes, no payload.
    ShortIdle,
}

/// At or above this much remaining space, a full idle header plus payload
/// fits; below it, only the fixed 4-byte short-idle frame is representable.
pub const SHORT_IDLE_THRESHOLD: u32 = XGEM_HEADER_LEN as u32;

impl XgemFrame {
    pub fn serialized_len(&self) -> u32 {
        match self {
            XgemFrame::Data { payload, .. } => XGEM_HEADER_LEN as u32 + payload.len() as u32,
            XgemFrame::Idle { len } => XGEM_HEADER_LEN as u32 + *len as u32,
            XgemFrame::ShortIdle => 4,
        }
    }

    /// Builds the padding frame for `available` bytes of leftover space, or
    /// `None` if no frame this protocol can express fits exactly: a full
    /// idle frame needs at least `XGEM_HEADER_LEN` bytes, and the short-idle
    /// form is exactly 4 bytes, neither smaller nor larger. A remainder of
    /// 1-3 bytes, or 5-7 bytes, has no valid representation and must not be
    /// forced into either form (that would overflow or silently waste the
    /// grant); the caller simply has nothing left to emit.
    pub fn pad(available: u32) -> Option<XgemFrame> {
        if available >= SHORT_IDLE_THRESHOLD {
            let len = (available - XGEM_HEADER_LEN as u32).min(XGEM_MAX_FRAME_LEN as u32) as u16;
            return Some(XgemFrame::Idle { len });
        }
        if available == 4 {
            return Some(XgemFrame::ShortIdle);
        }
        None
    }

    pub fn serialize(&self, out: &mut Vec<u8>) -> Result<(), DbaError> {
        match self {
            XgemFrame::Data { header, payload } => {
                let mut hdr = [0u8; XGEM_HEADER_LEN];
                header.serialize(&mut hdr)?;
                out.extend_from_slice(&hdr);
                out.extend_from_slice(payload);
            }
            XgemFrame::Idle { len } => {
                let header = XgemHeader::idle(*len);
                let mut hdr = [0u8; XGEM_HEADER_LEN];
                header.serialize(&mut hdr)?;
                out.extend_from_slice(&hdr);
                out.extend(core::iter::repeat(0u8).take(*len as usize));
            }
            XgemFrame::ShortIdle => out.extend_from_slice(&[0u8; 4]),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = XgemHeader {
            pli: 1200,
            key_index: 1,
            port_id: 7,
            options: 3,
            last_fragment: false,
        };
        let mut buf = [0u8; XGEM_HEADER_LEN];
        header.serialize(&mut buf).unwrap();
        assert_eq!(XgemHeader::deserialize(&buf).unwrap(), header);
    }

    #[test]
    fn pad_uses_short_idle_only_for_an_exact_4_byte_remainder() {
        assert_eq!(XgemFrame::pad(4), Some(XgemFrame::ShortIdle));
        assert_eq!(XgemFrame::pad(4).unwrap().serialized_len(), 4);
    }

    #[test]
    fn pad_has_no_representation_for_an_unfittable_remainder() {
        for available in [0, 1, 2, 3, 5, 6, 7] {
            assert_eq!(XgemFrame::pad(available), None, "available={}", available);
        }
    }

    #[test]
    fn pad_clamps_to_max_frame_len() {
        let frame = XgemFrame::pad(XGEM_HEADER_LEN as u32 + XGEM_MAX_FRAME_LEN as u32 + 100).unwrap();
        assert_eq!(frame.serialized_len(), XGEM_HEADER_LEN as u32 + XGEM_MAX_FRAME_LEN as u32);
    }
}
