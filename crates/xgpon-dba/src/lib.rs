#![cfg_attr(not(feature = "std"), no_std)]

// `alloc` backs every dynamically-sized structure in the engine (T-CONT
// tables, per-burst accumulators, SDU queues) so the crate stays usable on
// an embedded-class OLT/ONU controller that only has a global allocator.
extern crate alloc;

// --- Foundation modules ---
pub mod types;
pub mod units;
pub mod error;
pub mod config;
pub mod log;
pub mod phy;
pub mod stats;

// --- XGTC framing ---
pub mod frame;

// --- DBA policy and engine ---
pub mod dba;

// --- Node abstraction (OLT + ONU) ---
pub mod node;

// --- Top-level exports ---
pub use error::DbaError;
pub use types::{AllocId, OnuId, TcontType, XgemPortId};
pub use units::{BaseUnits, Bytes};
pub use config::{Config, PonMode};
pub use node::olt::OltNode;
pub use node::onu::OnuNode;
