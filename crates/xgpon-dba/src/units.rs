//! Explicit size types, replacing ad-hoc multiplication by the base grant size.
//!
//! `spec.md` §9 calls out that XG-PON (4-byte words) and XG(S)-PON (16-byte
//! blocks) must never be mixed within one run. `Bytes` and `BaseUnits` make
//! the unit of a quantity part of its type; converting between them always
//! goes through the `BaseGrant` that was fixed at construction.

use core::ops::Add;

/// A quantity measured in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Bytes(pub u32);

/// A quantity measured in base grant units (4 B for XG-PON, 16 B for XG(S)-PON).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct BaseUnits(pub u32);

/// The base grant unit size fixed at engine construction; never mixed within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseGrant(u32);

impl BaseGrant {
    /// 4 bytes, for XG-PON.
    pub const XGPON: BaseGrant = BaseGrant(4);
    /// 16 bytes, for XG(S)-PON.
    pub const XGSPON: BaseGrant = BaseGrant(16);

    /// Number of bytes in one base unit under this grant size.
    pub const fn bytes_per_unit(self) -> u32 {
        self.0
    }

    /// Converts a byte count to base units, rounding up so no data is under-granted.
    pub fn units_for_bytes(self, bytes: Bytes) -> BaseUnits {
        BaseUnits(bytes.0.div_ceil(self.0))
    }

    /// Converts a base-unit count to bytes. Total for sizes up to `u32::MAX / 16`.
    pub fn bytes_for_units(self, units: BaseUnits) -> Bytes {
        Bytes(units.0 * self.0)
    }

    /// Converts a byte count to base units, truncating. Used for the DBA
    /// engine's allocated-size bookkeeping, which mirrors an integer divide
    /// in the source rather than the ceiling conversion used for on-wire sizes.
    pub fn units_for_bytes_floor(self, bytes: Bytes) -> BaseUnits {
        BaseUnits(bytes.0 / self.0)
    }
}

impl Add for Bytes {
    type Output = Bytes;
    fn add(self, rhs: Bytes) -> Bytes {
        Bytes(self.0 + rhs.0)
    }
}

impl Add for BaseUnits {
    type Output = BaseUnits;
    fn add(self, rhs: BaseUnits) -> BaseUnits {
        BaseUnits(self.0 + rhs.0)
    }
}

impl BaseUnits {
    /// Saturating subtraction, used for over-allocation carry bookkeeping.
    pub fn saturating_sub(self, rhs: BaseUnits) -> BaseUnits {
        BaseUnits(self.0.saturating_sub(rhs.0))
    }
}
