//! The OLT DBA engine: the per-frame-slot BWmap generation loop.
//!
//! Grounded on `original_source/model/xgpon-olt-dba-engine.cc` and
//! `xgpon-olt-dba-engine-round-robin.cc`. The cursor/cycle bookkeeping
//! (`lastIndexForFrame`, `lastIndexForCycle`, `cycleOpen`) is generic and
//! policy-independent; the grant-size decision is delegated to a
//! [`DbaPolicy`], selected at construction the way `spec.md` §9 calls for
//! ("a single trait with implementations selected by config string").
pub mod policies;

use crate::config::QosConfig;
use crate::frame::bwmap::BwMap;
use crate::types::{AllocId, OnuId, TcontType};
use crate::units::{BaseGrant, BaseUnits, Bytes};
use alloc::boxed::Box;
use alloc::collections::VecDeque;

/// Anything the DBA loop can ask "how much do you need" and later credit
/// with a grant. Implemented by the OLT-side T-CONT record.
pub trait DbaDemandSource {
    fn alloc_id(&self) -> AllocId;
    fn onu_id(&self) -> OnuId;
    /// `CalculateRemainingDataToServe`: best estimate of bytes still queued
    /// that have not yet been covered by grants in flight (`spec.md` §4.1).
    fn remaining_to_serve(&mut self, rtt_ns: u64, frame_slot_ns: u64) -> BaseUnits;
    fn last_served_ns(&self) -> u64;
    fn mark_served(&mut self, now_ns: u64, granted: BaseUnits);
    /// Used only by QoS-aware policies; the round-robin policy ignores it.
    fn tcont_type(&self) -> TcontType {
        TcontType::BestEffort
    }
    fn qos(&self) -> QosConfig {
        QosConfig::best_effort(4)
    }
    /// Deficit counter carried across cycles by `XgiantDeficit`/`XgiantProp`.
    fn deficit_units(&self) -> i64 {
        0
    }
    fn set_deficit_units(&mut self, _value: i64) {}
}

/// Indexed access into the OLT's T-CONT table, in round-robin scan order.
pub trait DbaTcontTable {
    fn len(&self) -> usize;
    fn tcont_mut(&mut self, index: usize) -> &mut dyn DbaDemandSource;
}

/// Result of offering a grant to the per-ONU burst accumulator.
pub struct BurstSinkResult {
    /// True if this AllocId did not already have a BwAlloc in the burst.
    pub created_new_record: bool,
    /// Growth of the burst's final on-wire size caused by this grant.
    pub final_burst_bytes_delta: Bytes,
}

/// The per-burst assembler, seen from the DBA engine's side.
pub trait BurstSink {
    /// Whether the accumulator for `onu` can still accept another record.
    fn can_accept(&self, onu: OnuId) -> bool;
    fn add_or_extend(
        &mut self,
        onu: OnuId,
        alloc_id: AllocId,
        additional_units: BaseUnits,
    ) -> BurstSinkResult;
    fn clear(&mut self);
    /// Walks the accumulated bursts in ONU order and emits a `BWmap`,
    /// assigning `StartTime` to the first `BwAlloc` of each burst.
    fn produce_bwmap(&mut self, now_ns: u64, extra_carry: BaseUnits, us_phy_frame_size: BaseUnits) -> BwMap;
}

/// Per-tick parameters the policy needs but does not own.
#[derive(Debug, Clone, Copy)]
pub struct DbaTickContext {
    pub frames_per_dba_cycle: u8,
    pub max_service_size: BaseUnits,
    pub tcont_count: usize,
    pub rtt_ns: u64,
    pub frame_slot_ns: u64,
}

/// The grant-size decision, pluggable per `spec.md` §4.2/§9.
pub trait DbaPolicy {
    /// `CalculateAmountData2Upload`: how many base units to grant this tick.
    fn calculate_amount_to_upload(
        &mut self,
        tcont: &mut dyn DbaDemandSource,
        allocated_so_far: BaseUnits,
        now_ns: u64,
        ctx: &DbaTickContext,
    ) -> BaseUnits;

    fn prepare_tick(&mut self) {}
    fn finalize_tick(&mut self) {}
}

/// Cap on distinct T-CONTs served within a single BWmap (`spec.md` §4.2).
/// Not specified numerically upstream; sized generously for a PON split
/// ratio of 1:32.
pub const MAX_TCONT_PER_BWMAP: usize = 32;

/// Slack reserved below `usPhyFrameSize` to accommodate header/delimiter
/// padding at the end of the frame (`spec.md` §4.2 step 3).
pub const FRAME_SLACK_UNITS: BaseUnits = BaseUnits(10);

/// The scheduling core: produces one `BWmap` per upstream frame slot.
pub struct DbaEngine {
    policy: Box<dyn DbaPolicy>,
    base_grant: BaseGrant,
    last_index_for_frame: usize,
    last_index_for_cycle: usize,
    first_index_for_cycle: usize,
    cycle_open: bool,
    /// `extraCarry`: over-allocation from the previous tick, in base units.
    extra_carry: BaseUnits,
    served_bwmaps: VecDeque<BwMap>,
}

impl DbaEngine {
    pub fn new(policy: Box<dyn DbaPolicy>, base_grant: BaseGrant) -> Self {
        DbaEngine {
            policy,
            base_grant,
            last_index_for_frame: 0,
            last_index_for_cycle: 0,
            first_index_for_cycle: 0,
            cycle_open: false,
            extra_carry: BaseUnits(0),
            served_bwmaps: VecDeque::new(),
        }
    }

    pub fn extra_carry(&self) -> BaseUnits {
        self.extra_carry
    }

    /// Runs one tick of the scheduling loop (`spec.md` §4.2).
    pub fn generate_bw_map(
        &mut self,
        now_ns: u64,
        tconts: &mut dyn DbaTcontTable,
        sink: &mut dyn BurstSink,
        us_phy_frame_size: BaseUnits,
        ctx: &DbaTickContext,
    ) -> BwMap {
        assert!(
            self.extra_carry.0 < us_phy_frame_size.0 / 2,
            "the last bwmap over-allocated too much"
        );

        // Resolved open question: extraCarry is folded into `allocated` at
        // the start of the tick, not subtracted from the frame size.
        let mut allocated = self.extra_carry;
        sink.clear();
        self.policy.prepare_tick();

        let n = tconts.len();
        if n == 0 {
            self.extra_carry = BaseUnits(0);
            let map = sink.produce_bwmap(now_ns, self.extra_carry, us_phy_frame_size);
            self.served_bwmaps.push_back(map.clone());
            return map;
        }

        let frame_cycle_ns = ctx.frames_per_dba_cycle as u64 * ctx.frame_slot_ns;
        let at_boundary = frame_cycle_ns != 0 && now_ns % frame_cycle_ns == 0;

        let mut cursor: Option<usize> = if at_boundary {
            self.last_index_for_cycle %= n;
            self.first_index_for_cycle = self.last_index_for_cycle;
            self.last_index_for_frame = self.last_index_for_cycle;
            self.cycle_open = true;
            Some(self.last_index_for_frame)
        } else if self.cycle_open {
            Some(self.last_index_for_frame % n)
        } else {
            None
        };

        let mut num_scheduled: usize = 0;
        let threshold = BaseUnits(us_phy_frame_size.0.saturating_sub(FRAME_SLACK_UNITS.0));

        while let Some(idx) = cursor {
            if allocated >= threshold || num_scheduled >= MAX_TCONT_PER_BWMAP {
                break;
            }

            let tcont = tconts.tcont_mut(idx);
            let size = self.policy.calculate_amount_to_upload(tcont, allocated, now_ns, ctx);

            if size.0 > 0 {
                let onu = tcont.onu_id();
                let alloc_id = tcont.alloc_id();
                if sink.can_accept(onu) {
                    let result = sink.add_or_extend(onu, alloc_id, size);
                    let granted_units = self.base_grant.units_for_bytes_floor(result.final_burst_bytes_delta);
                    allocated = allocated + granted_units;
                    if result.created_new_record {
                        num_scheduled += 1;
                    }
                    tcont.mark_served(now_ns, size);
                }
            }

            let next_idx = (idx + 1) % n;
            self.last_index_for_frame = next_idx;
            if next_idx == self.first_index_for_cycle {
                self.last_index_for_cycle = next_idx;
                self.cycle_open = false;
                cursor = None;
            } else {
                cursor = Some(next_idx);
            }
        }

        self.policy.finalize_tick();

        let map = sink.produce_bwmap(now_ns, self.extra_carry, us_phy_frame_size);
        self.extra_carry = if allocated > us_phy_frame_size {
            allocated.saturating_sub(us_phy_frame_size)
        } else {
            BaseUnits(0)
        };
        self.served_bwmaps.push_back(map.clone());
        map
    }

    /// `GetBwMap4CurrentBurst`: the controlling BWmap for a burst arriving
    /// at `arrival_ns`, popping any expired entries first (`spec.md` §4.5).
    pub fn bwmap_for_burst(&mut self, arrival_ns: u64, rtt_ns: u64, frame_slot_ns: u64) -> Option<&BwMap> {
        while let Some(front) = self.served_bwmaps.front() {
            let start = front.creation_time_ns + rtt_ns;
            let end = start + frame_slot_ns;
            if arrival_ns < end {
                return self.served_bwmaps.front();
            }
            assert!(arrival_ns > start, "the corresponding bwmap was deleted too early");
            self.served_bwmaps.pop_front();
        }
        None
    }
}
