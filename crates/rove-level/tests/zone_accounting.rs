//! Integration tests: every thinker block is accounted for in the zone.

use rove_core::PurgeTag;
use rove_level::{Body, DoorKind};
use rove_test_utils::fixtures::{empty_level, sample_level, DOOR_TAG};
use rove_test_utils::{init_logging, HeapEvent, HeapRecorder};
use rove_think::{Thinker, ThinkerHost};

#[test]
fn specials_and_mobjs_allocate_under_their_tags() {
    init_logging();
    let mut level = empty_level(1);
    let rec = HeapRecorder::new();
    level.mem_mut().set_observer(Box::new(rec.clone()));

    assert_eq!(level.spawn_specials(), 3);
    level.spawn_mobj(rove_test_utils::fixtures::walker(0, 0));
    assert_eq!(rec.allocs_tagged(PurgeTag::LevSpec), 3);
    assert_eq!(rec.allocs_tagged(PurgeTag::Level), 1);
    assert_eq!(rec.frees(), 0);
}

#[test]
fn reclaimed_door_frees_exactly_its_block() {
    let mut level = empty_level(1);
    assert!(level.do_door(DOOR_TAG, DoorKind::Open));
    let id = level.sectors()[1].special_data.unwrap();
    let block = level.thinkers().get(id).map(Thinker::block).unwrap();
    let rec = HeapRecorder::new();
    level.mem_mut().set_observer(Box::new(rec.clone()));

    // 62 tics to open, one more to notice, one to reclaim.
    for _ in 0..63 {
        level.tick();
    }
    assert_eq!(rec.frees(), 0);
    assert!(level.sectors()[1].special_data.is_none());
    let stats = level.tick();
    assert_eq!(stats.reclaimed, 1);
    assert!(rec.events().contains(&HeapEvent::Free { ptr: block }));
    assert_eq!(rec.frees(), 1);
    assert!(level.body(id).is_none());
}

#[test]
fn free_level_releases_every_thinker_and_the_sectors() {
    let (mut level, _) = sample_level(1);
    let thinkers = level.thinkers().len();
    let rec = HeapRecorder::new();
    level.mem_mut().set_observer(Box::new(rec.clone()));

    level.free_level();
    assert_eq!(rec.frees(), thinkers + 1);
    assert!(level.thinkers().is_empty());
    assert!(level.sectors().is_empty());
    level.mem().check();
}

#[test]
fn dead_mobj_block_is_returned_after_its_last_state() {
    let mut level = empty_level(1);
    let mut m = rove_test_utils::fixtures::walker(0, 0);
    m.state = 3;
    let id = level.spawn_mobj(m);
    let before = level.mem().total_free_bytes();
    let rec = HeapRecorder::new();
    level.mem_mut().set_observer(Box::new(rec.clone()));

    // Eight tics in state 3, then the null state removes it.
    for _ in 0..8 {
        level.tick();
    }
    assert!(matches!(level.body(id), Some(Body::Mobj(_))));
    assert!(level.thinkers().action(id).is_some_and(|a| a.is_removed()));
    level.tick();
    assert_eq!(rec.frees(), 1);
    assert!(level.mem().total_free_bytes() > before);
}
