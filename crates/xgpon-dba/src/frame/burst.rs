//! Upstream burst header/trailer and PLOAM sizing constants.
//!
//! Grounded on `original_source/model/xgpon-olt-dba-per-burst-info.cc`:
//! `m_headerTrailerDataSize` starts at `XGTC_USBURST_HEADERTRAILER` (one base
//! unit of preamble-adjacent header, one of trailer) and, when the burst
//! carries a PLOAM, gains `XGPON_XGTC_PLOAM_LENGTH` bytes. The original only
//! converts the header/trailer term to bytes on the PLOAM branch, silently
//! leaving it in base units otherwise; this crate always converts to bytes
//! first and adds the PLOAM length on top, so both branches compare against
//! `PhyParams::fec_data_block` in the same unit (see `DESIGN.md`).
use crate::units::{BaseGrant, BaseUnits, Bytes};

/// Header (1 base unit) + trailer (1 base unit) surrounding every burst.
pub const XGTC_BURST_HEADERTRAILER_UNITS: BaseUnits = BaseUnits(2);

/// Length in bytes of a PLOAMu message, per G.987.3 XGTC framing.
pub const PLOAM_LENGTH_BYTES: u16 = 48;

/// Fixed non-payload overhead of one upstream burst, in bytes.
pub fn header_trailer_bytes(base_grant: BaseGrant, carries_ploam: bool) -> Bytes {
    let mut overhead = base_grant.bytes_for_units(XGTC_BURST_HEADERTRAILER_UNITS);
    if carries_ploam {
        overhead = Bytes(overhead.0 + PLOAM_LENGTH_BYTES as u32);
    }
    overhead
}
