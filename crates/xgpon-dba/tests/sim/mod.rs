// crates/xgpon-dba/tests/sim/mod.rs
//
// A virtual PON: owns simulated time and the in-flight BWmap/burst queues
// between one OLT and its ONUs, mirroring `spec.md` §5's discrete-event
// model at the granularity this crate operates on (BwAlloc/XgemFrame
// structs, not raw wire bytes).
use std::collections::VecDeque;
use xgpon_dba::frame::bwalloc::BwAlloc;
use xgpon_dba::frame::bwmap::BwMap;
use xgpon_dba::node::olt::OltNode;
use xgpon_dba::node::onu::OnuNode;
use xgpon_dba::phy::FRAME_SLOT_NS;
use xgpon_dba::types::AllocId;

struct BwmapDelivery {
    arrive_ns: u64,
    onu_index: usize,
    alloc: BwAlloc,
}

struct BurstDelivery {
    arrive_ns: u64,
    alloc_id: AllocId,
    report_bytes: Option<u32>,
}

/// Owns one OLT-to-ONUs PON segment and drives ticks across it.
pub struct VirtualPon {
    pub current_time_ns: u64,
    one_way_delay_ns: u64,
    scheduled_tx: VecDeque<BwmapDelivery>,
    inflight_bursts: VecDeque<BurstDelivery>,
}

impl VirtualPon {
    pub fn new(one_way_delay_ns: u64) -> Self {
        VirtualPon {
            current_time_ns: 0,
            one_way_delay_ns,
            scheduled_tx: VecDeque::new(),
            inflight_bursts: VecDeque::new(),
        }
    }

    pub fn rtt_ns(&self) -> u64 {
        2 * self.one_way_delay_ns
    }

    /// Runs one 125 µs frame slot: OLT emits a BWmap, pending BWmaps are
    /// delivered to their ONUs, pending bursts are produced and delivered
    /// back to the OLT.
    pub fn tick(&mut self, olt: &mut OltNode, onus: &mut [OnuNode]) -> BwMap {
        let map = olt.generate_bw_map(self.current_time_ns);
        let arrive_ns = self.current_time_ns + self.one_way_delay_ns;

        for (onu_index, onu) in onus.iter_mut().enumerate() {
            // BWmap arrival is itself a suspension point; deferring the call
            // to `arrive_ns` would require storing a clone of the whole map
            // per ONU, so instead we fast-forward: `process_bw_map` only
            // touches per-T-CONT bookkeeping, which is safe to perform at
            // send time as long as every derived tx time is computed from
            // `arrive_ns`, not `current_time_ns`.
            let scheduled = onu.process_bw_map(&map, arrive_ns);
            for burst in scheduled {
                let alloc = map.allocations[burst.bwmap_index];
                self.scheduled_tx.push_back(BwmapDelivery {
                    arrive_ns: arrive_ns + burst.tx_offset_ns,
                    onu_index,
                    alloc,
                });
            }
        }

        self.current_time_ns += FRAME_SLOT_NS;

        while let Some(job) = self.scheduled_tx.front() {
            if job.arrive_ns >= self.current_time_ns {
                break;
            }
            let job = self.scheduled_tx.pop_front().expect("front checked Some above");
            let onu = &mut onus[job.onu_index];
            let _frames = onu.produce_and_transmit_us_burst(&job.alloc);
            let report_bytes = if job.alloc.dbru_request {
                onu.prepare_status_report(job.alloc.alloc_id)
            } else {
                None
            };
            self.inflight_bursts.push_back(BurstDelivery {
                arrive_ns: job.arrive_ns + self.one_way_delay_ns,
                alloc_id: job.alloc.alloc_id,
                report_bytes,
            });
        }

        while let Some(delivery) = self.inflight_bursts.front() {
            if delivery.arrive_ns >= self.current_time_ns {
                break;
            }
            let delivery = self.inflight_bursts.pop_front().expect("front checked Some above");
            if let Some(bytes) = delivery.report_bytes {
                olt.receive_status_report(delivery.alloc_id, bytes, delivery.arrive_ns)
                    .expect("the scheduled alloc_id must still be registered");
            }
        }

        map
    }
}
