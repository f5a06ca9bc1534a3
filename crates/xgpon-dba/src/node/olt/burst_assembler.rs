//! Per-ONU burst accumulator: the OLT side of XGTC burst framing.
//!
//! Grounded on `original_source/model/xgpon-olt-dba-per-burst-info.cc`: one
//! accumulator per ONU collects every `BwAlloc` destined for that ONU's next
//! burst and maintains the exact on-wire size, including FEC expansion.
use crate::dba::{BurstSink, BurstSinkResult};
use crate::frame::bwalloc::{BwAlloc, START_TIME_NONE};
use crate::frame::burst;
use crate::frame::bwmap::BwMap;
use crate::node::olt::OnuLinkInfo;
use crate::types::{AllocId, OnuId};
use crate::units::{BaseGrant, BaseUnits, Bytes};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

struct BurstInfo {
    ploam_exists: bool,
    profile_index: u8,
    fec: bool,
    data_block_size: Bytes,
    fec_block_size: Bytes,
    gap_phy_overhead: Bytes,
    header_trailer_bytes: Bytes,
    final_burst_bytes: Bytes,
    bw_allocs: Vec<BwAlloc>,
}

impl BurstInfo {
    fn new(
        link: OnuLinkInfo,
        data_block_size: Bytes,
        fec_block_size: Bytes,
        base_grant: BaseGrant,
    ) -> Self {
        let gap_phy_overhead = Bytes(
            base_grant.bytes_for_units(link.guard_time).0
                + link.profile.preamble_len as u32
                + link.profile.delimiter_len as u32,
        );
        let header_trailer_bytes = burst::header_trailer_bytes(base_grant, link.ploam_exists);
        let mut info = BurstInfo {
            ploam_exists: link.ploam_exists,
            profile_index: link.profile_index,
            fec: link.profile.fec,
            data_block_size,
            fec_block_size,
            gap_phy_overhead,
            header_trailer_bytes,
            final_burst_bytes: Bytes(0),
            bw_allocs: Vec::new(),
        };
        info.update_final_burst_size();
        info
    }

    /// `UpdateFinalBurstSize`: FEC expansion formula (`spec.md` §4.2).
    fn update_final_burst_size(&mut self) {
        let g = self.header_trailer_bytes.0;
        let body = if self.fec {
            let d = self.data_block_size.0;
            let t = self.fec_block_size.0;
            let full = g / d;
            let rem = g % d;
            if rem == 0 {
                full * t
            } else {
                full * t + rem + (t - d)
            }
        } else {
            g
        };
        self.final_burst_bytes = Bytes(body + self.gap_phy_overhead.0);
    }

    fn find_index(&self, alloc_id: AllocId) -> Option<usize> {
        self.bw_allocs.iter().position(|a| a.alloc_id == alloc_id)
    }

    fn add_new_bw_alloc(&mut self, mut alloc: BwAlloc, base_grant: BaseGrant) {
        self.header_trailer_bytes = Bytes(
            self.header_trailer_bytes.0 + base_grant.bytes_for_units(BaseUnits(alloc.grant_size as u32)).0,
        );
        alloc.dbru_request = true;
        self.bw_allocs.push(alloc);
        self.update_final_burst_size();
    }

    fn extend_existing(&mut self, index: usize, extra_units: BaseUnits, base_grant: BaseGrant) {
        let extra_bytes = base_grant.bytes_for_units(extra_units);
        let entry = &mut self.bw_allocs[index];
        entry.grant_size += extra_units.0 as u16;
        self.header_trailer_bytes = Bytes(self.header_trailer_bytes.0 + extra_bytes.0);
        self.update_final_burst_size();
    }
}

/// Accumulates one burst per ONU per tick and serializes them into a `BWmap`.
pub struct BurstAssembler {
    base_grant: BaseGrant,
    data_block_size: Bytes,
    fec_block_size: Bytes,
    links: BTreeMap<OnuId, OnuLinkInfo>,
    infos: BTreeMap<OnuId, BurstInfo>,
    /// Pool capacity; `None` means unbounded (pooling is an optimization,
    /// never a correctness requirement, per `spec.md` §5 "Memory").
    max_records: Option<usize>,
}

impl BurstAssembler {
    pub fn new(base_grant: BaseGrant, data_block_size: Bytes, fec_block_size: Bytes) -> Self {
        BurstAssembler {
            base_grant,
            data_block_size,
            fec_block_size,
            links: BTreeMap::new(),
            infos: BTreeMap::new(),
            max_records: None,
        }
    }

    pub fn register_link(&mut self, onu_id: OnuId, link: OnuLinkInfo) {
        self.links.insert(onu_id, link);
    }
}

impl BurstSink for BurstAssembler {
    fn can_accept(&self, onu: OnuId) -> bool {
        if self.infos.contains_key(&onu) {
            return true;
        }
        match self.max_records {
            Some(cap) => self.infos.len() < cap,
            None => true,
        }
    }

    fn add_or_extend(
        &mut self,
        onu: OnuId,
        alloc_id: AllocId,
        additional_units: BaseUnits,
    ) -> BurstSinkResult {
        let link = *self.links.get(&onu).expect("add_onu must precede any grant to it");

        if !self.infos.contains_key(&onu) {
            let info = BurstInfo::new(link, self.data_block_size, self.fec_block_size, self.base_grant);
            self.infos.insert(onu, info);
        }
        let info = self.infos.get_mut(&onu).expect("just inserted");
        let before = info.final_burst_bytes;

        let created_new_record = if let Some(index) = info.find_index(alloc_id) {
            info.extend_existing(index, additional_units, self.base_grant);
            false
        } else {
            let start_time = if info.bw_allocs.is_empty() { 0 } else { START_TIME_NONE };
            let mut alloc = BwAlloc::new(alloc_id, additional_units.0 as u16);
            alloc.start_time = start_time;
            alloc.ploamu_flag = link.ploam_exists;
            alloc.burst_profile_index = link.profile_index;
            info.add_new_bw_alloc(alloc, self.base_grant);
            true
        };

        let delta = Bytes(info.final_burst_bytes.0 - before.0);
        BurstSinkResult { created_new_record, final_burst_bytes_delta: delta }
    }

    fn clear(&mut self) {
        self.infos.clear();
    }

    /// `ProduceBwmapFromBursts`: walks accumulators in ONU order, assigning
    /// `StartTime` to each burst's first `BwAlloc` by cumulative byte offset.
    fn produce_bwmap(&mut self, now_ns: u64, _extra_carry: BaseUnits, _us_phy_frame_size: BaseUnits) -> BwMap {
        let mut map = BwMap::new(now_ns);
        let mut cumulative_bytes: u32 = 0;

        for info in self.infos.values_mut() {
            if let Some(first) = info.bw_allocs.first_mut() {
                let start_units = self.base_grant.units_for_bytes_floor(Bytes(cumulative_bytes));
                first.start_time = start_units.0 as u16;
            }
            for alloc in &info.bw_allocs {
                map.push(*alloc);
            }
            cumulative_bytes += info.final_burst_bytes.0;
        }
        map
    }
}
