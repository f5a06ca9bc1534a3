//! OLT-side node: connection manager, per-burst assembler, DBA engine.
pub mod burst_assembler;
pub mod conn_manager;
pub mod node;
pub mod tcont;

pub use conn_manager::OltConnManager;
pub use node::OltNode;
pub use tcont::OltTcont;

use crate::phy::BurstProfile;
use crate::units::BaseUnits;

/// Snapshot of the link parameters the burst assembler needs for one ONU,
/// owned by the OLT's PLOAM engine in the original (`spec.md` §9
/// "Bidirectional references"). Modeled here as a plain value copied into
/// the connection manager at `add_onu` time.
#[derive(Debug, Clone, Copy)]
pub struct OnuLinkInfo {
    pub profile: BurstProfile,
    pub profile_index: u8,
    pub ploam_exists: bool,
    pub guard_time: BaseUnits,
}
