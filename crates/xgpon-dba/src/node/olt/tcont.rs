//! The OLT-side mirror of one upstream T-CONT (`spec.md` §3, §4.1).
use crate::config::QosConfig;
use crate::dba::DbaDemandSource;
use crate::frame::bwalloc::BwAlloc;
use crate::types::{AllocId, OnuId, TcontType};
use crate::units::{BaseGrant, BaseUnits, Bytes};
use alloc::collections::VecDeque;

/// Service history is retained for at least this long (`spec.md` §3).
const HISTORY_RETENTION_NS: u64 = 1_000_000_000;

/// AllocId, QoS bundle, latest status report, and bounded service history.
/// Created once at topology setup and never destroyed (`spec.md` §3).
#[derive(Debug)]
pub struct OltTcont {
    alloc_id: AllocId,
    onu_id: OnuId,
    qos: QosConfig,
    base_grant: BaseGrant,
    latest_report_bytes: u32,
    latest_report_arrival_ns: u64,
    granted_since_report_bytes: u64,
    last_served_ns: u64,
    deficit_units: i64,
    history: VecDeque<(u64, BwAlloc)>,
}

impl OltTcont {
    pub fn new(alloc_id: AllocId, onu_id: OnuId, qos: QosConfig, base_grant: BaseGrant) -> Self {
        OltTcont {
            alloc_id,
            onu_id,
            qos,
            base_grant,
            latest_report_bytes: 0,
            latest_report_arrival_ns: 0,
            granted_since_report_bytes: 0,
            last_served_ns: 0,
            deficit_units: 0,
            history: VecDeque::new(),
        }
    }

    pub fn qos_config(&self) -> QosConfig {
        self.qos
    }

    /// `ReceiveStatusReport`: stores the report and resets the granted-since
    /// counter so the next estimate starts from this fresh occupancy figure.
    pub fn receive_status_report(&mut self, occupancy_bytes: u32, arrival_ns: u64) {
        self.latest_report_bytes = occupancy_bytes;
        self.latest_report_arrival_ns = arrival_ns;
        self.granted_since_report_bytes = 0;
    }

    pub fn latest_report_arrival_ns(&self) -> u64 {
        self.latest_report_arrival_ns
    }

    /// `AddNewBwAllocation2ServiceHistory`, pruned to the retention window.
    pub fn add_bw_allocation_to_service_history(&mut self, alloc: BwAlloc, now_ns: u64) {
        self.history.push_back((now_ns, alloc));
        while let Some(&(t, _)) = self.history.front() {
            if now_ns.saturating_sub(t) > HISTORY_RETENTION_NS {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn service_history(&self) -> impl Iterator<Item = &(u64, BwAlloc)> {
        self.history.iter()
    }
}

impl DbaDemandSource for OltTcont {
    fn alloc_id(&self) -> AllocId {
        self.alloc_id
    }

    fn onu_id(&self) -> OnuId {
        self.onu_id
    }

    /// `CalculateRemainingDataToServe`: `max(0, latestReport -
    /// grantedBytesIssuedSinceReportArrival)`. The "likely arrived since
    /// report" term is zero for the reference and QoS-aware policies alike
    /// (`spec.md` §4.1).
    fn remaining_to_serve(&mut self, _rtt_ns: u64, _frame_slot_ns: u64) -> BaseUnits {
        let remaining_bytes = (self.latest_report_bytes as u64)
            .saturating_sub(self.granted_since_report_bytes) as u32;
        self.base_grant.units_for_bytes(Bytes(remaining_bytes))
    }

    fn last_served_ns(&self) -> u64 {
        self.last_served_ns
    }

    fn mark_served(&mut self, now_ns: u64, granted: BaseUnits) {
        self.last_served_ns = now_ns;
        self.granted_since_report_bytes += self.base_grant.bytes_for_units(granted).0 as u64;
    }

    fn tcont_type(&self) -> TcontType {
        self.qos.tcont_type
    }

    fn qos(&self) -> QosConfig {
        self.qos
    }

    fn deficit_units(&self) -> i64 {
        self.deficit_units
    }

    fn set_deficit_units(&mut self, value: i64) {
        self.deficit_units = value;
    }
}
