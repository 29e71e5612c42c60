//! Integration test: coalescing and purge behaviour through the public
//! allocator boundary.
//!
//! Three adjacent blocks are freed in every possible order; each order
//! must collapse back into a single free extent with the zone's free byte
//! count restored. A second group covers purge-on-demand of cache blocks
//! and bulk tag-range reclamation.

use rove_core::PurgeTag;
use rove_test_utils::{init_logging, HeapEvent, HeapRecorder};
use rove_zone::{MemoryResource, ZoneConfig, HEADER_SIZE};

fn zone() -> MemoryResource {
    MemoryResource::init(&ZoneConfig::new(256 * 1024)).unwrap()
}

const ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

// ── Coalescing ──────────────────────────────────────────────────────

#[test]
fn three_adjacent_blocks_coalesce_in_any_order() {
    for order in ORDERS {
        let mut mem = zone();
        // A static block after the trio keeps it from merging with the tail.
        let before = mem.total_free_bytes();
        let trio = [
            mem.allocate(100, PurgeTag::Level, None),
            mem.allocate(200, PurgeTag::Level, None),
            mem.allocate(300, PurgeTag::Level, None),
        ];
        let fence = mem.allocate(8, PurgeTag::Static, None);
        let fence_size = mem.block_info(fence).unwrap().size as usize;

        for i in order {
            mem.free(trio[i]);
            mem.check();
        }

        let blocks: Vec<_> = mem.blocks().collect();
        assert_eq!(blocks.len(), 3, "order {order:?}");
        assert!(blocks[0].is_free());
        assert_eq!(
            blocks[0].size as usize,
            (104 + HEADER_SIZE) + (200 + HEADER_SIZE) + (304 + HEADER_SIZE)
        );
        assert_eq!(mem.total_free_bytes(), before - fence_size);

        mem.free(fence);
        assert_eq!(mem.total_free_bytes(), before, "order {order:?}");
        assert_eq!(mem.blocks().count(), 1);
    }
}

#[test]
fn allocation_continues_from_the_rover() {
    let mut mem = zone();
    let a = mem.allocate(512, PurgeTag::Level, None);
    let _b = mem.allocate(512, PurgeTag::Level, None);
    mem.free(a);
    // The rover sits past `b`; the tail satisfies this request.
    let c = mem.allocate(512, PurgeTag::Level, None);
    assert_ne!(c, a);
    mem.check();
}

// ── Purging ─────────────────────────────────────────────────────────

#[test]
fn cache_blocks_are_purged_when_space_runs_out() {
    let mut mem = MemoryResource::init(&ZoneConfig::new(8 * 1024)).unwrap();
    let slots: Vec<_> = (0..6).map(|_| mem.new_owner()).collect();
    for &slot in &slots {
        mem.allocate(1000, PurgeTag::Cache, Some(slot));
    }
    assert!(slots.iter().all(|&s| mem.owner_target(s).is_some()));
    // Cache blocks count as free space.
    assert!(mem.total_free_bytes() > 6000);

    let big = mem.allocate(5000, PurgeTag::Static, None);
    let purged = slots
        .iter()
        .filter(|&&s| mem.owner_target(s).is_none())
        .count();
    assert!(purged >= 5, "only {purged} cache blocks purged");
    assert!(mem.block_info(big).is_some());
    mem.check();
}

#[test]
fn static_blocks_are_never_purged() {
    let mut mem = MemoryResource::init(&ZoneConfig::new(4096)).unwrap();
    let pinned = mem.allocate(3000, PurgeTag::Static, None);
    assert!(mem.try_allocate(2000, PurgeTag::Static, None).is_err());
    assert!(mem.block_info(pinned).is_some());
    mem.check();
}

// ── Tag ranges ──────────────────────────────────────────────────────

#[test]
fn level_transition_keeps_static_and_cache() {
    let mut mem = zone();
    let before = mem.total_free_bytes();
    let keep = mem.allocate(64, PurgeTag::Static, None);
    let slot = mem.new_owner();
    let cached = mem.allocate(64, PurgeTag::Cache, Some(slot));
    for _ in 0..20 {
        mem.allocate(64, PurgeTag::Level, None);
        mem.allocate(32, PurgeTag::LevSpec, None);
    }
    let freed = mem.free_tags(PurgeTag::Level, PurgeTag::LevSpec);
    assert_eq!(freed, 40);
    mem.check();
    assert!(mem.block_info(keep).is_some());
    assert_eq!(mem.owner_target(slot), Some(cached));

    mem.free(keep);
    mem.free(cached);
    assert_eq!(mem.total_free_bytes(), before);
}

#[test]
fn free_tags_nulls_owners_of_freed_blocks() {
    let mut mem = zone();
    let slots: Vec<_> = (0..4).map(|_| mem.new_owner()).collect();
    for &slot in &slots {
        mem.allocate(40, PurgeTag::Level, Some(slot));
    }
    mem.free_tags(PurgeTag::Level, PurgeTag::Level);
    assert!(slots.iter().all(|&s| mem.owner_target(s).is_none()));
}

// ── Diagnostics ─────────────────────────────────────────────────────

#[test]
fn dump_reports_every_block_in_range() {
    let mut mem = zone();
    mem.allocate(64, PurgeTag::Static, None);
    mem.allocate(64, PurgeTag::Level, None);
    mem.allocate(64, PurgeTag::Level, None);
    let mut out = Vec::new();
    mem.dump(PurgeTag::MIN, PurgeTag::MAX, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    // Three allocations plus the trailing free block.
    assert_eq!(text.matches("block:").count(), 4);
    assert!(text.starts_with("zone size: 262144"));
    assert!(!text.contains("ERROR"));
}

#[test]
fn observer_sees_purges_and_range_frees() {
    init_logging();
    let rec = HeapRecorder::new();
    let mut mem = MemoryResource::init(&ZoneConfig::new(8 * 1024))
        .unwrap()
        .with_observer(Box::new(rec.clone()));
    let slots: Vec<_> = (0..6).map(|_| mem.new_owner()).collect();
    for &slot in &slots {
        mem.allocate(1000, PurgeTag::Cache, Some(slot));
    }
    assert_eq!(rec.allocs_tagged(PurgeTag::Cache), 6);
    assert_eq!(rec.frees(), 0);

    mem.allocate(5000, PurgeTag::Level, None);
    let purged = slots
        .iter()
        .filter(|&&s| mem.owner_target(s).is_none())
        .count();
    assert_eq!(rec.frees(), purged);

    rec.reset();
    assert_eq!(mem.free_tags(PurgeTag::Level, PurgeTag::Level), 1);
    assert_eq!(rec.events().len(), 1);
    assert!(matches!(rec.events()[0], HeapEvent::Free { .. }));
}

#[test]
fn scan_on_free_reports_through_the_resource() {
    let rec = HeapRecorder::new();
    let mut mem = zone().with_observer(Box::new(rec.clone()));
    mem.diagnostics_mut().scan_on_free = true;
    let holder = mem.allocate(16, PurgeTag::LevSpec, None);
    let target = mem.allocate(16, PurgeTag::Level, None);
    mem.payload_mut(holder)[8..12].copy_from_slice(&target.offset().to_le_bytes());
    mem.free(target);

    let hits = rec.dangling();
    assert_eq!(hits.len(), 1);
    assert_eq!((hits[0].holder, hits[0].word_offset, hits[0].freed), (holder, 8, target));
    assert_eq!(mem.diagnostics().dangling_reports(), 1);
}
