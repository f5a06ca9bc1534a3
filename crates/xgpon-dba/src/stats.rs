//! Per-T-CONT byte counters exposed at frame-slot granularity (`spec.md` §6).
use crate::types::OnuId;
use alloc::collections::BTreeMap;

/// OLT-side trace surface, refreshed once per upstream frame slot.
#[derive(Debug, Clone, Default)]
pub struct OltStats {
    pub current_time_ns: u64,
    pub us_olt_bytes: BTreeMap<OnuId, u64>,
    pub us_t1_olt_bytes: BTreeMap<OnuId, u64>,
    pub us_t2_olt_bytes: BTreeMap<OnuId, u64>,
    pub us_t3_olt_bytes: BTreeMap<OnuId, u64>,
    pub us_t4_olt_bytes: BTreeMap<OnuId, u64>,
}

impl OltStats {
    pub fn record(&mut self, onu: OnuId, tcont_type_index: u8, bytes: u64) {
        *self.us_olt_bytes.entry(onu).or_insert(0) += bytes;
        let bucket = match tcont_type_index {
            1 => &mut self.us_t1_olt_bytes,
            2 => &mut self.us_t2_olt_bytes,
            3 => &mut self.us_t3_olt_bytes,
            _ => &mut self.us_t4_olt_bytes,
        };
        *bucket.entry(onu).or_insert(0) += bytes;
    }
}

/// ONU-side trace surface, refreshed once per downstream burst reception.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnuStats {
    pub current_time_ns: u64,
    pub ds_onu_bytes: u64,
    /// Count of SDUs silently dropped because a report grant never arrived
    /// in time and the queue overflowed (`spec.md` §7 transient anomalies).
    pub queue_losses: u64,
}
