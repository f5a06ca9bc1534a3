// crates/xgpon-dba/tests/fec_expansion_test.rs
//
// Direct check of the FEC burst-size expansion formula against two worked
// cases: a header/trailer size that is not an exact multiple of the FEC data
// block, and one that is. `BurstInfo::final_burst_bytes` has no public
// accessor, so the expansion is read indirectly off the start_time the
// assembler assigns to a second ONU's grant placed right after the first.
use xgpon_dba::dba::BurstSink;
use xgpon_dba::node::olt::burst_assembler::BurstAssembler;
use xgpon_dba::node::olt::OnuLinkInfo;
use xgpon_dba::phy::BurstProfile;
use xgpon_dba::types::{AllocId, OnuId};
use xgpon_dba::units::{BaseGrant, BaseUnits, Bytes};

fn link_without_phy_overhead() -> OnuLinkInfo {
    OnuLinkInfo {
        profile: BurstProfile::new(0, 0, true),
        profile_index: 0,
        ploam_exists: false,
        guard_time: BaseUnits(0),
    }
}

/// Header/trailer lands on 500 bytes, not a multiple of the 216-byte FEC
/// data block: `full = 500/216 = 2`, `rem = 68`, so the last data block is
/// topped up to a full FEC block: `2*248 + 68 + (248-216) = 596`.
#[test]
fn non_exact_remainder_pads_the_last_fec_block() {
    let mut assembler = BurstAssembler::new(BaseGrant::XGPON, Bytes(216), Bytes(248));
    assembler.register_link(OnuId(0), link_without_phy_overhead());
    assembler.register_link(OnuId(1), link_without_phy_overhead());

    // Header/trailer starts at 2 base units (8 bytes at 4 B/unit); 123 more
    // units of grant bring it to 8 + 492 = 500 bytes exactly.
    assembler.add_or_extend(OnuId(0), AllocId(1), BaseUnits(123));
    assembler.add_or_extend(OnuId(1), AllocId(2), BaseUnits(1));

    let map = assembler.produce_bwmap(0, BaseUnits(0), BaseUnits(9720));
    let second = map.allocations.iter().find(|a| a.alloc_id == AllocId(2)).unwrap();
    assert_eq!(second.start_time, 596 / 4, "596-byte final burst, 4 B/unit");
}

/// Header/trailer lands exactly on a multiple of the FEC data block:
/// `432/216 = 2`, `rem = 0`, so no remainder padding is added: `2*248 = 496`.
#[test]
fn exact_multiple_skips_remainder_padding() {
    let mut assembler = BurstAssembler::new(BaseGrant::XGSPON, Bytes(216), Bytes(248));
    assembler.register_link(OnuId(0), link_without_phy_overhead());
    assembler.register_link(OnuId(1), link_without_phy_overhead());

    // Header/trailer starts at 2 base units (32 bytes at 16 B/unit); 25 more
    // units bring it to 32 + 400 = 432 bytes exactly.
    assembler.add_or_extend(OnuId(0), AllocId(1), BaseUnits(25));
    assembler.add_or_extend(OnuId(1), AllocId(2), BaseUnits(1));

    let map = assembler.produce_bwmap(0, BaseUnits(0), BaseUnits(9720));
    let second = map.allocations.iter().find(|a| a.alloc_id == AllocId(2)).unwrap();
    assert_eq!(second.start_time, 496 / 16, "496-byte final burst, 16 B/unit");
}
