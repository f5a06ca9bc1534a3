//! The ONU-side mirror of one upstream T-CONT: connection queues, the
//! upstream scheduler, and received-grant history (`spec.md` §3, §4.3).
use crate::frame::bwalloc::BwAlloc;
use crate::node::onu::scheduler::OnuUpstreamScheduler;
use crate::types::{AllocId, OnuId, TcontType, XgemPortId};
use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// Service history is retained for at least this long (`spec.md` §3).
const HISTORY_RETENTION_NS: u64 = 1_000_000_000;

/// A single upstream connection's FIFO of queued SDUs.
pub struct Connection {
    port_id: XgemPortId,
    queue: VecDeque<Vec<u8>>,
    queued_bytes: u32,
}

impl Connection {
    pub fn new(port_id: XgemPortId) -> Self {
        Connection { port_id, queue: VecDeque::new(), queued_bytes: 0 }
    }

    pub fn port_id(&self) -> XgemPortId {
        self.port_id
    }

    pub fn enqueue_sdu(&mut self, sdu: Vec<u8>) {
        self.queued_bytes += sdu.len() as u32;
        self.queue.push_back(sdu);
    }

    pub fn queued_bytes(&self) -> u32 {
        self.queued_bytes
    }

    /// Takes up to `max_len` bytes from the head of the queue, fragmenting
    /// the lead SDU if it does not fit whole. Returns `None` if empty, and
    /// otherwise the bytes taken plus whether this completes the lead SDU.
    pub fn take(&mut self, max_len: u32) -> Option<(Vec<u8>, bool)> {
        let lead_len = self.queue.front()?.len() as u32;
        if lead_len <= max_len {
            let sdu = self.queue.pop_front().expect("front checked non-empty above");
            self.queued_bytes -= lead_len;
            Some((sdu, true))
        } else {
            let sdu = self.queue.front_mut().expect("front checked non-empty above");
            let chunk: Vec<u8> = sdu.drain(0..max_len as usize).collect();
            self.queued_bytes -= max_len;
            Some((chunk, false))
        }
    }
}

/// Created when the OLT's `AddOneUsTcont` registers the matching AllocId on
/// the ONU side; holds every connection multiplexed under this allocation.
pub struct OnuTcont {
    alloc_id: AllocId,
    onu_id: OnuId,
    tcont_type: TcontType,
    connections: Vec<Connection>,
    scheduler: OnuUpstreamScheduler,
    history: VecDeque<(u64, BwAlloc)>,
}

impl OnuTcont {
    pub fn new(alloc_id: AllocId, onu_id: OnuId, tcont_type: TcontType) -> Self {
        OnuTcont {
            alloc_id,
            onu_id,
            tcont_type,
            connections: Vec::new(),
            scheduler: OnuUpstreamScheduler::new(),
            history: VecDeque::new(),
        }
    }

    pub fn alloc_id(&self) -> AllocId {
        self.alloc_id
    }

    pub fn onu_id(&self) -> OnuId {
        self.onu_id
    }

    pub fn tcont_type(&self) -> TcontType {
        self.tcont_type
    }

    pub fn add_connection(&mut self, port_id: XgemPortId) {
        self.connections.push(Connection::new(port_id));
    }

    pub fn enqueue_sdu(&mut self, port_id: XgemPortId, sdu: Vec<u8>) -> bool {
        match self.connections.iter_mut().find(|c| c.port_id() == port_id) {
            Some(conn) => {
                conn.enqueue_sdu(sdu);
                true
            }
            None => false,
        }
    }

    /// `PrepareBufOccupancyReport`: total queued bytes across every connection.
    pub fn prepare_buf_occupancy_report(&self) -> u32 {
        self.connections.iter().map(|c| c.queued_bytes()).sum()
    }

    /// `ReceiveBwAllocation`: records the grant, pruned to the retention window.
    pub fn receive_bw_allocation(&mut self, alloc: BwAlloc, now_ns: u64) {
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

    /// `SelectConnToServe`: next non-empty connection and its current demand.
    pub fn select_conn_to_serve(&mut self) -> Option<(usize, u32)> {
        let index = self.scheduler.select_conn_to_serve(&self.connections)?;
        Some((index, self.connections[index].queued_bytes()))
    }

    pub fn connection_mut(&mut self, index: usize) -> &mut Connection {
        &mut self.connections[index]
    }
}
