//! PHY parameter table: rates, frame sizes, guard times, FEC block sizes.
//!
//! Grounded on `original_source/helper/xgpon-config-db.h`: the upstream PHY
//! frame size is 9720 base units for both PON generations (`spec.md` §8,
//! testable property 6), the FEC data block is 216 bytes with a 32-byte
//! parity expansion (D=216, T=248), and the XG(S)-PON upstream line rate is
//! the `XGPON2_US_LINE_RATE` constant (1 244 160 000 B/s).
use crate::config::PonMode;
use crate::units::{BaseGrant, BaseUnits, Bytes};

/// Fixed PHY parameters for one PON generation.
#[derive(Debug, Clone, Copy)]
pub struct PhyParams {
    pub base_grant: BaseGrant,
    /// Upstream PHY frame size, in base units (9720 for both generations).
    pub us_phy_frame_size: BaseUnits,
    /// Upstream line rate, bytes per second.
    pub us_link_rate_bytes_per_sec: u64,
    /// Downstream frame slot period, nanoseconds (125 us).
    pub ds_frame_slot_ns: u64,
    /// Ceiling on a single T-CONT's per-allocation grant, in base units.
    pub max_service_size: BaseUnits,
    /// FEC data block size, bytes (D).
    pub fec_data_block: Bytes,
    /// FEC total block size, bytes (T = D + parity).
    pub fec_total_block: Bytes,
    /// Minimum upstream guard time, in base units.
    pub min_guard_time: BaseUnits,
}

/// 125 microseconds, the upstream frame slot / DBA tick period.
pub const FRAME_SLOT_NS: u64 = 125_000;

impl PhyParams {
    pub const fn for_mode(mode: PonMode) -> PhyParams {
        match mode {
            PonMode::XgPon => PhyParams {
                base_grant: BaseGrant::XGPON,
                us_phy_frame_size: BaseUnits(9720),
                us_link_rate_bytes_per_sec: 311_040_000,
                ds_frame_slot_ns: FRAME_SLOT_NS,
                max_service_size: BaseUnits(9720),
                fec_data_block: Bytes(216),
                fec_total_block: Bytes(248),
                min_guard_time: BaseUnits(4),
            },
            PonMode::XgsPon => PhyParams {
                base_grant: BaseGrant::XGSPON,
                us_phy_frame_size: BaseUnits(9720),
                us_link_rate_bytes_per_sec: 1_244_160_000,
                ds_frame_slot_ns: FRAME_SLOT_NS,
                max_service_size: BaseUnits(9720),
                fec_data_block: Bytes(216),
                fec_total_block: Bytes(248),
                min_guard_time: BaseUnits(4),
            },
        }
    }
}

/// A burst profile: preamble/delimiter length and whether FEC is enabled.
///
/// `BwAlloc::burst_profile_index` selects one of these from the ONU's link
/// info table; this crate keeps a single active profile per ONU (no
/// burst-profile ranging negotiation, per `spec.md` §1 Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstProfile {
    pub preamble_len: u16,
    pub delimiter_len: u16,
    pub fec: bool,
}

impl BurstProfile {
    pub fn new(preamble_len: u16, delimiter_len: u16, fec: bool) -> Self {
        BurstProfile { preamble_len, delimiter_len, fec }
    }
}
