//! Crate-wide error type for the XG-PON/XG(S)-PON DBA engine.
use core::fmt;

/// Errors the engine can return from fallible setup and codec APIs.
///
/// Per `spec.md` §7, only configuration errors and codec failures are
/// returned as `Result`s. Invariant violations inside the DBA hot loop
/// (over-allocation beyond the carry budget, an expired-before-use BWmap,
/// an unknown AllocId in an arriving burst) are implementation bugs or
/// corrupted configuration, never a recoverable runtime condition, so they
/// are asserted rather than propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbaError {
    /// The given ONU id is reserved, broadcast, or out of the 10-bit range.
    InvalidOnuId(u16),
    /// The given AllocId does not fit in 14 bits.
    InvalidAllocId(u16),
    /// An AllocId was used that was never registered via `add_us_tcont`.
    UnknownAllocId(u16),
    /// An ONU id was used that was never registered via `add_onu`.
    UnknownOnuId(u16),
    /// The OLT and ONU were constructed with different `PonMode`s.
    PonModeMismatch,
    /// A QoS bundle violated one of the invariants in `spec.md` §3.
    InvalidQosBundle(&'static str),
    /// A byte buffer was too short to hold the structure being decoded.
    BufferTooShort,
    /// A wire value did not correspond to a known enum variant.
    InvalidEnumValue,
    /// A multi-byte field could not be parsed from a slice of the wrong length.
    SliceConversion,
}

impl fmt::Display for DbaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOnuId(v) => write!(f, "invalid ONU id {}", v),
            Self::InvalidAllocId(v) => write!(f, "invalid AllocId {}", v),
            Self::UnknownAllocId(v) => write!(f, "AllocId {} was never registered", v),
            Self::UnknownOnuId(v) => write!(f, "ONU id {} was never registered", v),
            Self::PonModeMismatch => write!(f, "OLT and ONU PON modes disagree"),
            Self::InvalidQosBundle(reason) => write!(f, "invalid QoS bundle: {}", reason),
            Self::BufferTooShort => write!(f, "buffer too short for the requested structure"),
            Self::InvalidEnumValue => write!(f, "invalid enum value in wire data"),
            Self::SliceConversion => write!(f, "failed to convert slice to fixed-size array"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DbaError {}

impl From<crate::types::IdRangeError> for DbaError {
    fn from(err: crate::types::IdRangeError) -> Self {
        match err {
            crate::types::IdRangeError::InvalidOnuId(v) => DbaError::InvalidOnuId(v),
            crate::types::IdRangeError::InvalidAllocId(v) => DbaError::InvalidAllocId(v),
        }
    }
}

impl From<core::array::TryFromSliceError> for DbaError {
    fn from(_: core::array::TryFromSliceError) -> Self {
        DbaError::SliceConversion
    }
}
