//! OLT and ONU node assemblies tying the DBA engine to per-device state.
pub mod olt;
pub mod onu;
