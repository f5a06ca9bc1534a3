//! Consumes an incoming `BWmap` and schedules this ONU's burst transmissions
//! (`spec.md` §4.3).
//!
//! Grounded on `original_source/model/xgpon-onu-dba-engine.cc`'s
//! `ProcessBwMap`: the exact `txTime` formula is reproduced unchanged.
use crate::frame::bwalloc::START_TIME_NONE;
use crate::frame::bwmap::BwMap;
use crate::log::DbaLogContext;
use crate::node::onu::conn_manager::OnuConnManager;
use crate::node::onu::OnuLinkInfo;
use crate::phy::{PhyParams, FRAME_SLOT_NS};
use alloc::vec::Vec;

/// One burst this ONU must produce, expressed relative to the BWmap's
/// arrival time so the caller's event loop can schedule it.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledBurst {
    /// Index of the controlling `BwAlloc` within the BWmap.
    pub bwmap_index: usize,
    /// Offset from "now" (BWmap arrival) at which to transmit, nanoseconds.
    pub tx_offset_ns: u64,
}

/// `ProcessBwMap`: records every BwAlloc addressed to a local T-CONT and
/// computes the transmit offset for any burst this ONU must send.
pub fn process_bw_map(
    conn_manager: &mut OnuConnManager,
    bwmap: &BwMap,
    now_ns: u64,
    link: &OnuLinkInfo,
    phy: &PhyParams,
) -> Vec<ScheduledBurst> {
    let mut scheduled = Vec::new();

    for (index, alloc) in bwmap.allocations.iter().enumerate() {
        let Some(tcont) = conn_manager.tcont_mut(alloc.alloc_id) else {
            continue;
        };
        tcont.receive_bw_allocation(*alloc, now_ns);

        if alloc.start_time == START_TIME_NONE {
            continue;
        }

        assert!(
            (alloc.start_time as u32) < phy.us_phy_frame_size.0,
            "StartTime is unreasonably large"
        );

        // start_time doesn't account for preamble and delimiter; tmpLen ends
        // up in bytes once the base grant size is folded in. A burst placed
        // at the very front of the frame (start_time == 0, the common case
        // for the lowest-OnuId burst every tick) has nothing to subtract the
        // overhead from, so this saturates at zero rather than underflowing.
        let overhead_bytes = link.profile.preamble_len as u64 + link.profile.delimiter_len as u64;
        let start_time_bytes = alloc.start_time as u64 * phy.base_grant.bytes_per_unit() as u64;
        let tmp_len_bytes = start_time_bytes.saturating_sub(overhead_bytes);

        let wait_time_ns = 2 * link.equalize_delay_ns;
        let tx_offset_ns = wait_time_ns + (tmp_len_bytes * 1_000_000_000) / phy.us_link_rate_bytes_per_sec;

        assert!(tx_offset_ns < FRAME_SLOT_NS, "the scheduled txTime is unreasonably long");

        let ctx = DbaLogContext {
            component: "onu-dba-consumer",
            onu_id: Some(tcont.onu_id().0),
            alloc_id: Some(alloc.alloc_id.0),
        };
        crate::log::dba_trace!(ctx, "scheduling burst at +{} ns", tx_offset_ns);

        scheduled.push(ScheduledBurst { bwmap_index: index, tx_offset_ns });
    }

    scheduled
}
