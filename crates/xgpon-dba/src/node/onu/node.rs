//! The ONU device: connection manager plus the DBA-consumer / burst-producer
//! pipeline tied together behind the BWmap / enqueue API (`spec.md` §4.3, §4.4).
use crate::config::Config;
use crate::frame::bwalloc::BwAlloc;
use crate::frame::bwmap::BwMap;
use crate::frame::xgem::XgemFrame;
use crate::node::onu::burst_producer::generate_frames_to_transmit;
use crate::node::onu::conn_manager::OnuConnManager;
use crate::node::onu::dba_consumer::{process_bw_map, ScheduledBurst};
use crate::node::onu::OnuLinkInfo;
use crate::phy::PhyParams;
use crate::stats::OnuStats;
use crate::types::{AllocId, OnuId, TcontType, XgemPortId};
use alloc::vec::Vec;

/// One ONU: owns its connection manager and answers the OLT's BWmaps.
pub struct OnuNode {
    pub onu_id: OnuId,
    pub conn_manager: OnuConnManager,
    pub stats: OnuStats,
    phy: PhyParams,
    link: OnuLinkInfo,
}

impl OnuNode {
    pub fn new(onu_id: OnuId, config: &Config, link: OnuLinkInfo) -> Self {
        OnuNode {
            onu_id,
            conn_manager: OnuConnManager::new(),
            stats: OnuStats::default(),
            phy: PhyParams::for_mode(config.pon_mode),
            link,
        }
    }

    pub fn add_tcont(&mut self, alloc_id: AllocId, tcont_type: TcontType) {
        self.conn_manager.add_tcont(alloc_id, self.onu_id, tcont_type);
    }

    pub fn add_connection(&mut self, alloc_id: AllocId, port_id: XgemPortId) -> bool {
        match self.conn_manager.tcont_mut(alloc_id) {
            Some(tcont) => {
                tcont.add_connection(port_id);
                true
            }
            None => false,
        }
    }

    pub fn enqueue_sdu(&mut self, alloc_id: AllocId, port_id: XgemPortId, sdu: Vec<u8>) -> bool {
        match self.conn_manager.tcont_mut(alloc_id) {
            Some(tcont) => tcont.enqueue_sdu(port_id, sdu),
            None => false,
        }
    }

    /// `GenerateStatusReport`: current queued-byte count for this AllocId.
    pub fn prepare_status_report(&self, alloc_id: AllocId) -> Option<u32> {
        self.conn_manager.tcont(alloc_id).map(|t| t.prepare_buf_occupancy_report())
    }

    /// `ProcessBwMap`: records grants and returns the bursts this ONU must
    /// transmit, each tagged with its offset from `now_ns`.
    pub fn process_bw_map(&mut self, bwmap: &BwMap, now_ns: u64) -> Vec<ScheduledBurst> {
        process_bw_map(&mut self.conn_manager, bwmap, now_ns, &self.link, &self.phy)
    }

    /// `ProduceAndTransmitUsBurst`: the XGEM frame sequence for one grant.
    pub fn produce_and_transmit_us_burst(&mut self, alloc: &BwAlloc) -> Vec<XgemFrame> {
        generate_frames_to_transmit(&mut self.conn_manager, alloc, self.phy.base_grant)
    }
}
