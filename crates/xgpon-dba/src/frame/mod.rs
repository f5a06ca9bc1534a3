//! Minimal XGTC framing: BWmap records, XGEM frame wrapping, burst constants.
//!
//! `spec.md` §6 "Wire formats (XGTC, simplified)" is intentionally not a
//! byte-exact rendition of G.987.3/G.9807.1 — PLOAM content and the HEC
//! (header error control) checksum are out of scope (`spec.md` §1). The
//! structures here carry the fields the DBA engine and burst producer
//! actually need and pack them the way the spec's wire-format section
//! states, leaving HEC fields zeroed.

pub mod bwalloc;
pub mod bwmap;
pub mod burst;
pub mod xgem;

pub use bwalloc::{BwAlloc, START_TIME_NONE};
pub use bwmap::BwMap;
pub use burst::{PLOAM_LENGTH_BYTES, XGTC_BURST_HEADERTRAILER_UNITS};
pub use xgem::{XgemFrame, XgemHeader, XGEM_HEADER_LEN, XGEM_IDLE_PORT_ID, XGEM_MAX_FRAME_LEN};
