//! Indexes OLT-side T-CONTs by AllocId and ONUs by OnuId.
//!
//! Grounded on `original_source/model/xgpon-olt-conn-manager.cc`: dense
//! vector tables sized to the full 10-bit ONU space (1024) and 14-bit
//! AllocId space (16384), since both spaces are small and lookups must be
//! O(1) on the DBA hot path.
use crate::config::QosConfig;
use crate::dba::{DbaDemandSource, DbaTcontTable};
use crate::error::DbaError;
use crate::node::olt::tcont::OltTcont;
use crate::node::olt::OnuLinkInfo;
use crate::types::{AllocId, OnuId, ONU_ID_MAX};
use crate::units::BaseGrant;
use alloc::vec::Vec;

const ONU_TABLE_LEN: usize = ONU_ID_MAX as usize + 1;
const ALLOC_TABLE_LEN: usize = 16384;

struct OnuRecord {
    link: OnuLinkInfo,
    tcont_ids: Vec<AllocId>,
}

pub struct OltConnManager {
    onus: Vec<Option<OnuRecord>>,
    tconts: Vec<Option<OltTcont>>,
    /// Insertion order of registered T-CONTs: the round-robin scan order
    /// (`m_usAllTconts` in the source).
    scan_order: Vec<AllocId>,
    next_alloc_id: u16,
}

impl OltConnManager {
    pub fn new() -> Self {
        OltConnManager {
            onus: (0..ONU_TABLE_LEN).map(|_| None).collect(),
            tconts: (0..ALLOC_TABLE_LEN).map(|_| None).collect(),
            scan_order: Vec::new(),
            next_alloc_id: 0,
        }
    }

    pub fn add_onu(&mut self, onu_id: OnuId, link: OnuLinkInfo) -> Result<(), DbaError> {
        let idx = onu_id.0 as usize;
        let slot = self.onus.get_mut(idx).ok_or(DbaError::InvalidOnuId(onu_id.0))?;
        *slot = Some(OnuRecord { link, tcont_ids: Vec::new() });
        Ok(())
    }

    pub fn link_info(&self, onu_id: OnuId) -> Option<OnuLinkInfo> {
        self.onus.get(onu_id.0 as usize)?.as_ref().map(|o| o.link)
    }

    /// `AddOneUsTcont`: allocates the next AllocId and registers a T-CONT.
    pub fn add_one_us_tcont(
        &mut self,
        onu_id: OnuId,
        qos: QosConfig,
        base_grant: BaseGrant,
    ) -> Result<AllocId, DbaError> {
        qos.validate()?;
        let onu = self
            .onus
            .get_mut(onu_id.0 as usize)
            .ok_or(DbaError::InvalidOnuId(onu_id.0))?
            .as_mut()
            .ok_or(DbaError::UnknownOnuId(onu_id.0))?;

        let alloc_id = AllocId::try_from(self.next_alloc_id)?;
        self.next_alloc_id += 1;
        onu.tcont_ids.push(alloc_id);
        self.tconts[alloc_id.0 as usize] = Some(OltTcont::new(alloc_id, onu_id, qos, base_grant));
        self.scan_order.push(alloc_id);
        Ok(alloc_id)
    }

    pub fn tcont(&self, alloc_id: AllocId) -> Option<&OltTcont> {
        self.tconts.get(alloc_id.0 as usize)?.as_ref()
    }

    pub fn tcont_mut(&mut self, alloc_id: AllocId) -> Option<&mut OltTcont> {
        self.tconts.get_mut(alloc_id.0 as usize)?.as_mut()
    }

    pub fn tcont_count(&self) -> usize {
        self.scan_order.len()
    }

    pub fn tcont_ids_for_onu(&self, onu_id: OnuId) -> &[AllocId] {
        self.onus
            .get(onu_id.0 as usize)
            .and_then(|o| o.as_ref())
            .map(|o| o.tcont_ids.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for OltConnManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DbaTcontTable for OltConnManager {
    fn len(&self) -> usize {
        self.scan_order.len()
    }

    fn tcont_mut(&mut self, index: usize) -> &mut dyn DbaDemandSource {
        let alloc_id = self.scan_order[index];
        self.tconts[alloc_id.0 as usize]
            .as_mut()
            .expect("scan_order only holds registered AllocIds")
    }
}
