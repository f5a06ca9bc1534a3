//! The OLT device: connection manager, burst assembler and DBA engine tied
//! together behind the `generateBwMap` / status-report API (`spec.md` §6).
use crate::config::{Config, OltDbaEngineType, QosConfig};
use crate::dba::policies::{QosAwarePolicy, QosMode, RoundRobinPolicy};
use crate::dba::{DbaEngine, DbaPolicy, DbaTickContext};
use crate::error::DbaError;
use crate::frame::bwmap::BwMap;
use crate::log::DbaLogContext;
use crate::node::olt::burst_assembler::BurstAssembler;
use crate::node::olt::conn_manager::OltConnManager;
use crate::node::olt::OnuLinkInfo;
use crate::phy::PhyParams;
use crate::stats::OltStats;
use crate::types::{AllocId, OnuId};
use alloc::boxed::Box;

fn policy_for(engine_type: OltDbaEngineType) -> Box<dyn DbaPolicy> {
    match engine_type {
        OltDbaEngineType::RoundRobin => Box::new(RoundRobinPolicy),
        OltDbaEngineType::Giant => Box::new(QosAwarePolicy::new(QosMode::Giant)),
        OltDbaEngineType::Ebu => Box::new(QosAwarePolicy::new(QosMode::Ebu)),
        OltDbaEngineType::Xgiant => Box::new(QosAwarePolicy::new(QosMode::Xgiant)),
        OltDbaEngineType::XgiantDeficit => Box::new(QosAwarePolicy::new(QosMode::XgiantDeficit)),
        OltDbaEngineType::XgiantProp => Box::new(QosAwarePolicy::new(QosMode::XgiantProp)),
    }
}

/// One OLT: owns its connection manager and runs the DBA engine on request.
pub struct OltNode {
    pub conn_manager: OltConnManager,
    pub stats: OltStats,
    engine: DbaEngine,
    assembler: BurstAssembler,
    phy: PhyParams,
    frames_per_dba_cycle: u8,
    rtt_ns: u64,
}

impl OltNode {
    pub fn new(config: &Config, rtt_ns: u64) -> Self {
        let phy = PhyParams::for_mode(config.pon_mode);
        OltNode {
            conn_manager: OltConnManager::new(),
            stats: OltStats::default(),
            engine: DbaEngine::new(policy_for(config.olt_dba_engine_type), phy.base_grant),
            assembler: BurstAssembler::new(phy.base_grant, phy.fec_data_block, phy.fec_total_block),
            phy,
            frames_per_dba_cycle: config.frames_per_dba_cycle,
            rtt_ns,
        }
    }

    pub fn add_onu(
        &mut self,
        onu_id: OnuId,
        link: OnuLinkInfo,
    ) -> Result<(), DbaError> {
        self.conn_manager.add_onu(onu_id, link)?;
        self.assembler.register_link(onu_id, link);
        Ok(())
    }

    pub fn add_us_tcont(&mut self, onu_id: OnuId, qos: QosConfig) -> Result<AllocId, DbaError> {
        self.conn_manager.add_one_us_tcont(onu_id, qos, self.phy.base_grant)
    }

    pub fn receive_status_report(
        &mut self,
        alloc_id: AllocId,
        occupancy_bytes: u32,
        arrival_ns: u64,
    ) -> Result<(), DbaError> {
        let tcont = self
            .conn_manager
            .tcont_mut(alloc_id)
            .ok_or(DbaError::UnknownAllocId(alloc_id.0))?;
        let ctx = DbaLogContext { component: "olt-tcont", onu_id: Some(tcont.onu_id().0), alloc_id: Some(alloc_id.0) };
        crate::log::dba_trace!(ctx, "status report: {} bytes at {}", occupancy_bytes, arrival_ns);
        tcont.receive_status_report(occupancy_bytes, arrival_ns);
        Ok(())
    }

    /// `GenerateBwMap`: the per-frame-slot entry point (`spec.md` §6).
    pub fn generate_bw_map(&mut self, now_ns: u64) -> BwMap {
        use crate::dba::DbaDemandSource;
        let ctx = DbaTickContext {
            frames_per_dba_cycle: self.frames_per_dba_cycle,
            max_service_size: self.phy.max_service_size,
            tcont_count: self.conn_manager.tcont_count(),
            rtt_ns: self.rtt_ns,
            frame_slot_ns: self.phy.ds_frame_slot_ns,
        };
        let map = self.engine.generate_bw_map(
            now_ns,
            &mut self.conn_manager,
            &mut self.assembler,
            self.phy.us_phy_frame_size,
            &ctx,
        );

        self.stats.current_time_ns = now_ns;
        for alloc in &map.allocations {
            if let Some(tcont) = self.conn_manager.tcont_mut(alloc.alloc_id) {
                let bytes = self.phy.base_grant.bytes_for_units(crate::units::BaseUnits(alloc.grant_size as u32));
                let type_index = tcont.tcont_type() as u8;
                self.stats.record(tcont.onu_id(), type_index, bytes.0 as u64);
                tcont.add_bw_allocation_to_service_history(*alloc, now_ns);
            }
        }
        map
    }

    pub fn bwmap_for_burst(&mut self, arrival_ns: u64) -> Option<&BwMap> {
        self.engine.bwmap_for_burst(arrival_ns, self.rtt_ns, self.phy.ds_frame_slot_ns)
    }

    pub fn phy(&self) -> &PhyParams {
        &self.phy
    }
}
