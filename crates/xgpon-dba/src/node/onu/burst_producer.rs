//! Produces the XGEM frame sequence for one scheduled upstream burst
//! (`spec.md` §4.4).
//!
//! Grounded on `original_source/model/xgpon-onu-xgem-engine.cc`'s
//! `GenerateFramesToTransmit`: budget the DBRu first, then round-robin
//! drain the connections under the T-CONT, falling back to idle padding
//! once the budget is too small or the T-CONT has nothing queued.
use crate::frame::bwalloc::BwAlloc;
use crate::frame::xgem::{XgemFrame, XgemHeader, XGEM_HEADER_LEN, XGEM_MAX_FRAME_LEN};
use crate::node::onu::conn_manager::OnuConnManager;
use crate::units::{BaseGrant, BaseUnits};
use alloc::vec::Vec;

/// Fixed size of a piggybacked status report (`spec.md` §4.4).
pub const DBRU_REPORT_BYTES: u32 = 4;

/// `ProduceAndTransmitUsBurst` for one `BwAlloc`: the XGEM frames to place
/// in this grant's payload section, in transmit order.
pub fn generate_frames_to_transmit(
    conn_manager: &mut OnuConnManager,
    alloc: &BwAlloc,
    base_grant: BaseGrant,
) -> Vec<XgemFrame> {
    let mut frames = Vec::new();

    let mut payload_length = base_grant.bytes_for_units(BaseUnits(alloc.grant_size as u32)).0;
    if alloc.dbru_request {
        payload_length = payload_length.saturating_sub(DBRU_REPORT_BYTES);
    }

    let Some(tcont) = conn_manager.tcont_mut(alloc.alloc_id) else {
        fill_idle(&mut frames, payload_length);
        return frames;
    };

    // `spec.md`: the idle-padding floor is 16 B for XG(S)-PON but only the
    // 4-byte base grant minimum for XG-PON, so a 4-15 byte remainder must
    // still attempt to fit an SDU under XG-PON instead of padding early.
    let idle_threshold = base_grant.bytes_per_unit();

    let mut current_payload_size = 0u32;
    while current_payload_size < payload_length {
        let available_size = payload_length - current_payload_size;

        if available_size < idle_threshold {
            if let Some(frame) = XgemFrame::pad(available_size) {
                frames.push(frame);
            }
            return frames;
        }

        let Some((conn_index, demand)) = tcont.select_conn_to_serve() else {
            fill_idle(&mut frames, available_size);
            return frames;
        };

        // `demand` is payload bytes, not framed size; budget one header's
        // worth on top unless that would overrun the grant, in which case
        // the connection is segmented across frames using the full budget.
        let mut amount_to_serve = if demand + XGEM_HEADER_LEN as u32 <= available_size {
            demand + XGEM_HEADER_LEN as u32
        } else {
            available_size
        };

        loop {
            let conn = tcont.connection_mut(conn_index);
            let frame_payload_budget = amount_to_serve.saturating_sub(XGEM_HEADER_LEN as u32);
            let Some((chunk, is_last_fragment)) = conn.take(frame_payload_budget) else {
                break;
            };

            let header = XgemHeader {
                pli: chunk.len() as u16,
                key_index: 0,
                port_id: conn.port_id().0,
                options: 0,
                last_fragment: is_last_fragment,
            };
            let frame_len = XGEM_HEADER_LEN as u32 + chunk.len() as u32;
            current_payload_size += frame_len;
            amount_to_serve = amount_to_serve.saturating_sub(frame_len);
            frames.push(XgemFrame::Data { header, payload: chunk });

            if amount_to_serve <= 16 {
                break;
            }
        }
    }

    frames
}

fn fill_idle(frames: &mut Vec<XgemFrame>, mut available: u32) {
    const MAX_FRAME_TOTAL: u32 = XGEM_HEADER_LEN as u32 + XGEM_MAX_FRAME_LEN as u32;
    while available > MAX_FRAME_TOTAL {
        frames.push(XgemFrame::Idle { len: XGEM_MAX_FRAME_LEN });
        available -= MAX_FRAME_TOTAL;
    }
    if let Some(frame) = XgemFrame::pad(available) {
        frames.push(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AllocId, OnuId, TcontType, XgemPortId};
    use alloc::vec;

    #[test]
    fn empty_tcont_is_filled_entirely_with_idle_frames() {
        let mut mgr = OnuConnManager::new();
        mgr.add_tcont(AllocId(1), OnuId(0), TcontType::BestEffort);
        let alloc = BwAlloc::new(AllocId(1), 10);
        let frames = generate_frames_to_transmit(&mut mgr, &alloc, BaseGrant::XGSPON);
        let total: u32 = frames.iter().map(|f| f.serialized_len()).sum();
        assert_eq!(total, 160);
    }

    #[test]
    fn queued_sdu_is_emitted_as_a_data_frame() {
        let mut mgr = OnuConnManager::new();
        mgr.add_tcont(AllocId(1), OnuId(0), TcontType::BestEffort);
        mgr.tcont_mut(AllocId(1)).unwrap().add_connection(XgemPortId(5));
        mgr.tcont_mut(AllocId(1)).unwrap().enqueue_sdu(XgemPortId(5), vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let alloc = BwAlloc::new(AllocId(1), 10);
        let frames = generate_frames_to_transmit(&mut mgr, &alloc, BaseGrant::XGSPON);
        match &frames[0] {
            XgemFrame::Data { header, payload } => {
                assert_eq!(payload, &vec![1, 2, 3, 4, 5, 6, 7, 8]);
                assert!(header.last_fragment);
                assert_eq!(header.port_id, 5);
            }
            other => panic!("expected a data frame, got {:?}", other),
        }
    }

    #[test]
    fn dbru_budget_is_reserved_before_sdus_are_selected() {
        let mut mgr = OnuConnManager::new();
        mgr.add_tcont(AllocId(1), OnuId(0), TcontType::BestEffort);
        let mut alloc = BwAlloc::new(AllocId(1), 2);
        alloc.dbru_request = true;
        let frames = generate_frames_to_transmit(&mut mgr, &alloc, BaseGrant::XGPON);
        let total: u32 = frames.iter().map(|f| f.serialized_len()).sum();
        assert_eq!(total, 4);
    }
}
