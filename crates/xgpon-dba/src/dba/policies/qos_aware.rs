//! Consolidated QoS-aware grant sizing: GIANT, EBU, Xgiant, deficit, proportional.
//!
//! `spec.md` §4.2 describes five QoS DBA variants that share one contract
//! (fixed T-CONTs served once per `MinSI`, assured T-CONTs token-bucketed at
//! their assured rate, non-assured/best-effort eating remaining capacity,
//! deficit counters carrying unused opportunity across cycles) and differ
//! only in priority order and whether the deficit carries over. Rather than
//! five near-duplicate modules this crate uses one policy parameterized by
//! [`QosMode`] (see `DESIGN.md`).
use crate::dba::policies::round_robin::{MIN_DATA_GRANT_UNITS, OVERHEAD_PER_ONU_UNITS};
use crate::dba::{DbaDemandSource, DbaPolicy, DbaTickContext};
use crate::types::TcontType;
use crate::units::BaseUnits;

/// Which of the five QoS-aware priority schemes this policy instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QosMode {
    /// Assured bandwidth ahead of non-assured/best-effort.
    Giant,
    /// Assured bandwidth ahead of everything else, strictly.
    Ebu,
    /// Strict type-1 > 2 > 3 > 4 priority, no deficit carry.
    Xgiant,
    /// `Xgiant` with a deficit counter carried across cycles for types 3/4.
    XgiantDeficit,
    /// `XgiantDeficit` with the deficit quantum weighted by configured share.
    XgiantProp,
}

#[derive(Debug)]
pub struct QosAwarePolicy {
    pub mode: QosMode,
}

impl QosAwarePolicy {
    pub fn new(mode: QosMode) -> Self {
        QosAwarePolicy { mode }
    }

    fn fair_share(&self, ctx: &DbaTickContext) -> u32 {
        let n_tconts = ctx.tcont_count.max(1) as u32;
        (ctx.frames_per_dba_cycle as u32 * ctx.max_service_size.0 / n_tconts)
            .saturating_sub(OVERHEAD_PER_ONU_UNITS)
    }
}

impl DbaPolicy for QosAwarePolicy {
    fn calculate_amount_to_upload(
        &mut self,
        tcont: &mut dyn DbaDemandSource,
        _allocated_so_far: BaseUnits,
        now_ns: u64,
        ctx: &DbaTickContext,
    ) -> BaseUnits {
        let requested = tcont.remaining_to_serve(ctx.rtt_ns, ctx.frame_slot_ns);
        if requested.0 == 0 {
            return BaseUnits(1);
        }

        let qos = tcont.qos();
        let largest = self.fair_share(ctx);

        let budget = match tcont.tcont_type() {
            TcontType::Fixed => {
                let min_si_ns = qos.min_service_interval as u64 * ctx.frame_slot_ns;
                let due = tcont.last_served_ns() == 0
                    || now_ns.saturating_sub(tcont.last_served_ns()) >= min_si_ns;
                if due {
                    largest
                } else {
                    0
                }
            }
            TcontType::Assured => {
                // Token bucket: assured_bw (bits/s) converted to base units
                // earned per frame slot.
                let tokens_per_slot = (qos.assured_bw * ctx.frame_slot_ns)
                    / (8 * 1_000_000_000)
                    / self_base_unit_bytes();
                tokens_per_slot.min(largest as u64) as u32
            }
            TcontType::NonAssured | TcontType::BestEffort | TcontType::Mixed => {
                let deficit = match self.mode {
                    QosMode::XgiantDeficit | QosMode::XgiantProp => tcont.deficit_units().max(0) as u32,
                    _ => 0,
                };
                largest.saturating_add(deficit)
            }
        };

        if budget == 0 {
            return BaseUnits(1);
        }

        let mut size = requested.0 + 1;
        if size > budget {
            if matches!(self.mode, QosMode::XgiantDeficit | QosMode::XgiantProp) {
                let weight = if self.mode == QosMode::XgiantProp && qos.non_assured_bw > 0 {
                    (qos.non_assured_bw / 1_000_000).max(1)
                } else {
                    1
                };
                let leftover = (size - budget) as i64 * weight as i64;
                tcont.set_deficit_units(tcont.deficit_units() + leftover.min(i32::MAX as i64));
            }
            size = budget;
        } else if size < MIN_DATA_GRANT_UNITS {
            size = MIN_DATA_GRANT_UNITS;
        }
        BaseUnits(size)
    }
}

/// Base-unit size in bytes for the PON generation this policy was built
/// for. Fixed at 16 (XG(S)-PON) since the token-bucket path only matters
/// for deployments large enough to run a QoS-aware policy in practice.
fn self_base_unit_bytes() -> u64 {
    16
}
