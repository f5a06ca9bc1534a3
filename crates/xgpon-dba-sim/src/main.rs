//! Thin driver: wires a small XG(S)-PON topology and runs it to completion.
//!
//! The engine itself is a library (`xgpon-dba`); this binary only owns the
//! event loop, the traffic source, and the propagation-delay bookkeeping
//! between the OLT and its ONUs.
use std::collections::VecDeque;
use std::time::Instant;

use log::info;
use xgpon_dba::config::{Config, QosConfig};
use xgpon_dba::frame::bwalloc::BwAlloc;
use xgpon_dba::node::olt::{OltNode, OnuLinkInfo as OltOnuLinkInfo};
use xgpon_dba::node::onu::{OnuLinkInfo as OnuOnuLinkInfo, OnuNode};
use xgpon_dba::phy::{BurstProfile, FRAME_SLOT_NS};
use xgpon_dba::types::{AllocId, OnuId, TcontType, XgemPortId};
use xgpon_dba::units::BaseUnits;

/// Differential fiber length of 20 km, one way, at ~5 us/km.
const ONE_WAY_DELAY_NS: u64 = 100_000;
const N_ONUS: u16 = 4;
const N_TICKS: u64 = 8_000; // 1 second of simulated time

struct PendingBurst {
    arrive_ns: u64,
    onu_index: usize,
    alloc: BwAlloc,
}

struct PendingReport {
    arrive_ns: u64,
    alloc_id: AllocId,
    occupancy_bytes: u32,
}

fn olt_link() -> OltOnuLinkInfo {
    OltOnuLinkInfo {
        profile: BurstProfile::new(160, 4, true),
        profile_index: 0,
        ploam_exists: false,
        guard_time: BaseUnits(4),
    }
}

fn onu_link() -> OnuOnuLinkInfo {
    OnuOnuLinkInfo { profile: BurstProfile::new(160, 4, true), equalize_delay_ns: ONE_WAY_DELAY_NS }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::default();
    let mut olt = OltNode::new(&config, 2 * ONE_WAY_DELAY_NS);
    let mut onus = Vec::new();
    let mut alloc_ids = Vec::new();

    for i in 0..N_ONUS {
        let onu_id = OnuId(i);
        olt.add_onu(onu_id, olt_link())?;
        let alloc_id = olt.add_us_tcont(onu_id, QosConfig::best_effort(4))?;
        let mut onu = OnuNode::new(onu_id, &config, onu_link());
        onu.add_tcont(alloc_id, TcontType::BestEffort);
        onu.add_connection(alloc_id, XgemPortId(1));
        alloc_ids.push(alloc_id);
        onus.push(onu);
    }

    info!("topology ready: {} ONUs, one best-effort T-CONT each", onus.len());

    let mut scheduled_tx: VecDeque<PendingBurst> = VecDeque::new();
    let mut inflight_reports: VecDeque<PendingReport> = VecDeque::new();
    let started = Instant::now();

    for tick in 0..N_TICKS {
        let now_ns = tick * FRAME_SLOT_NS;

        // ONU 0 carries a steady flow; the rest stay idle and are only ever
        // polled, exercising the fairness path among otherwise-silent T-CONTs.
        if tick % 4 == 0 {
            onus[0].enqueue_sdu(alloc_ids[0], XgemPortId(1), vec![0u8; 1500]);
        }

        let map = olt.generate_bw_map(now_ns);
        let arrive_ns = now_ns + ONE_WAY_DELAY_NS;

        for (onu_index, onu) in onus.iter_mut().enumerate() {
            for burst in onu.process_bw_map(&map, arrive_ns) {
                let alloc = map.allocations[burst.bwmap_index];
                scheduled_tx.push_back(PendingBurst {
                    arrive_ns: arrive_ns + burst.tx_offset_ns,
                    onu_index,
                    alloc,
                });
            }
        }

        while let Some(job) = scheduled_tx.front() {
            if job.arrive_ns >= now_ns + FRAME_SLOT_NS {
                break;
            }
            let job = scheduled_tx.pop_front().expect("front checked Some above");
            let onu = &mut onus[job.onu_index];
            onu.produce_and_transmit_us_burst(&job.alloc);
            if job.alloc.dbru_request {
                if let Some(occupancy_bytes) = onu.prepare_status_report(job.alloc.alloc_id) {
                    inflight_reports.push_back(PendingReport {
                        arrive_ns: job.arrive_ns + ONE_WAY_DELAY_NS,
                        alloc_id: job.alloc.alloc_id,
                        occupancy_bytes,
                    });
                }
            }
        }

        while let Some(report) = inflight_reports.front() {
            if report.arrive_ns >= now_ns + FRAME_SLOT_NS {
                break;
            }
            let report = inflight_reports.pop_front().expect("front checked Some above");
            olt.receive_status_report(report.alloc_id, report.occupancy_bytes, report.arrive_ns)?;
        }
    }

    let elapsed = started.elapsed();
    info!("ran {} ticks ({} ms simulated) in {:.2?}", N_TICKS, N_TICKS * FRAME_SLOT_NS / 1_000_000, elapsed);
    for (onu_id, bytes) in &olt.stats.us_olt_bytes {
        info!("onu {}: {} upstream bytes granted", onu_id.0, bytes);
    }

    Ok(())
}
