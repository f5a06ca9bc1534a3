//! Core identifiers shared by the OLT and ONU sides of the engine.
use core::convert::TryFrom;
use core::fmt;

/// Largest usable ONU id (G.987.3 / G.9807.1: 1021 reserved, 1022-1023 broadcast).
pub const ONU_ID_MAX: u16 = 1020;
/// Reserved ONU id, never assigned to a real ONU.
pub const ONU_ID_RESERVED: u16 = 1021;
/// First of the two broadcast/unassigned ONU ids.
pub const ONU_ID_BROADCAST_START: u16 = 1022;

/// AllocIds are 14 bits wide.
pub const ALLOC_ID_MAX: u16 = (1 << 14) - 1;

/// Identifies an ONU on the shared PON (unsigned 10-bit, 0..=1020 usable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OnuId(pub u16);

/// Identifies an upstream bandwidth allocation / T-CONT (unsigned 14-bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AllocId(pub u16);

/// Identifies an XGEM port carrying a single upstream or downstream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct XgemPortId(pub u16);

/// Error returned when constructing an id outside its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRangeError {
    /// The ONU id falls in the reserved or broadcast range, or overflows 10 bits.
    InvalidOnuId(u16),
    /// The AllocId does not fit in 14 bits.
    InvalidAllocId(u16),
}

impl fmt::Display for IdRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOnuId(v) => write!(f, "ONU id {} is reserved, broadcast, or out of range", v),
            Self::InvalidAllocId(v) => write!(f, "AllocId {} exceeds the 14-bit range", v),
        }
    }
}

impl TryFrom<u16> for OnuId {
    type Error = IdRangeError;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= ONU_ID_MAX {
            Ok(OnuId(value))
        } else {
            Err(IdRangeError::InvalidOnuId(value))
        }
    }
}

impl TryFrom<u16> for AllocId {
    type Error = IdRangeError;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= ALLOC_ID_MAX {
            Ok(AllocId(value))
        } else {
            Err(IdRangeError::InvalidAllocId(value))
        }
    }
}

/// Traffic-container service class (EPSG/ITU-T G.987.3 T-CONT types 1..5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TcontType {
    /// Fixed bandwidth, served once per MinSI.
    Fixed = 1,
    /// Assured bandwidth with token-bucket accrual.
    Assured = 2,
    /// Non-assured bandwidth, shares leftover capacity.
    NonAssured = 3,
    /// Best-effort, lowest priority for leftover capacity.
    BestEffort = 4,
    /// Mixture of the above served under one allocation.
    Mixed = 5,
}

impl TcontType {
    /// Collapses any type to `Fixed`, used by non-QoS-aware policies (round-robin).
    pub fn collapse_to_fixed(self) -> Self {
        TcontType::Fixed
    }
}
