//! Integration tests: sector specials and map objects over a live zone.

use rove_core::ThinkerId;
use rove_level::{
    Body, Ceiling, CeilingKind, Door, DoorKind, FloorKind, Level, LevelConfig, Mobj, MobjState,
    Plat, PlatKind, PlatStatus, Sector, FRACUNIT,
};
use rove_think::{Action, ThinkerHost};
use rove_zone::ZoneConfig;

fn level_with(sectors: Vec<Sector>, seed: u64) -> Level {
    let config = LevelConfig::new(ZoneConfig::new(512 * 1024)).with_seed(seed);
    let mut level = Level::new(&config).unwrap();
    level.load_sectors(sectors);
    level
}

/// Sector 0 is the tagged one; sector 1 is its only neighbour.
fn two_rooms(inner: Sector) -> Level {
    level_with(
        vec![
            inner.with_tag(1).with_neighbors([1]),
            Sector::new(-32, 128, 96).with_neighbors([0]),
        ],
        1,
    )
}

fn run(level: &mut Level, ticks: usize) {
    for _ in 0..ticks {
        level.tick();
    }
}

fn ceiling(level: &Level, id: ThinkerId) -> Ceiling {
    match level.body(id) {
        Some(Body::Ceiling(c)) => *c,
        other => panic!("not a ceiling: {other:?}"),
    }
}

fn door(level: &Level, id: ThinkerId) -> Door {
    match level.body(id) {
        Some(Body::Door(d)) => *d,
        other => panic!("not a door: {other:?}"),
    }
}

fn plat(level: &Level, id: ThinkerId) -> Plat {
    match level.body(id) {
        Some(Body::Plat(p)) => *p,
        other => panic!("not a plat: {other:?}"),
    }
}

fn special(level: &Level) -> ThinkerId {
    level.sectors()[0].special_data.expect("sector 0 has a special")
}

// ── Lights ──────────────────────────────────────────────────────

#[test]
fn glow_bounces_between_levels() {
    let mut level = two_rooms(Sector::new(0, 128, 192));
    level.spawn_glow(0).unwrap();
    run(&mut level, 11);
    assert_eq!(level.sectors()[0].light_level, 104);
    run(&mut level, 1);
    assert_eq!(level.sectors()[0].light_level, 104);
    run(&mut level, 1);
    assert_eq!(level.sectors()[0].light_level, 112);
}

#[test]
fn fire_flicker_stays_in_range() {
    let mut level = two_rooms(Sector::new(0, 128, 192).with_special(17));
    assert_eq!(level.spawn_specials(), 1);
    assert_eq!(level.sectors()[0].special, 0);
    for _ in 0..200 {
        level.tick();
        let light = level.sectors()[0].light_level;
        assert!((112..=192).contains(&light), "light {light}");
    }
}

#[test]
fn flash_alternates_between_two_levels() {
    let mut level = two_rooms(Sector::new(0, 128, 192).with_special(1));
    level.spawn_specials();
    let mut seen_dark = false;
    for _ in 0..400 {
        level.tick();
        let light = level.sectors()[0].light_level;
        assert!(light == 192 || light == 96, "light {light}");
        seen_dark |= light == 96;
    }
    assert!(seen_dark);
}

#[test]
fn lights_are_deterministic_per_seed() {
    let history = |seed| {
        let mut level = level_with(
            vec![
                Sector::new(0, 128, 200).with_special(1).with_neighbors([1]),
                Sector::new(0, 128, 80).with_special(17).with_neighbors([0]),
                Sector::new(0, 128, 160).with_special(2).with_neighbors([1]),
            ],
            seed,
        );
        level.spawn_specials();
        (0..300)
            .map(|_| {
                level.tick();
                level.sectors().iter().map(|s| s.light_level).collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(history(42), history(42));
}

#[test]
fn strobe_in_sync_switches_on_first_tic() {
    let mut level = two_rooms(Sector::new(0, 128, 192).with_special(13));
    level.spawn_specials();
    level.tick();
    assert_eq!(level.sectors()[0].light_level, 96);
    run(&mut level, 15);
    assert_eq!(level.sectors()[0].light_level, 192);
    run(&mut level, 5);
    assert_eq!(level.sectors()[0].light_level, 96);
}

// ── Doors ───────────────────────────────────────────────────────

#[test]
fn normal_door_opens_waits_closes_and_retires() {
    let mut level = two_rooms(Sector::new(0, 0, 160));
    let free_before = level.mem().total_free_bytes();
    assert!(level.do_door(1, DoorKind::Normal));
    let id = special(&level);
    assert_eq!(door(&level, id).top_height, 124 * FRACUNIT);

    run(&mut level, 63);
    assert_eq!(level.sectors()[0].ceiling_height, 124 * FRACUNIT);
    assert_eq!(door(&level, id).direction, 0);

    run(&mut level, 150);
    assert_eq!(door(&level, id).direction, -1);

    run(&mut level, 62);
    assert_eq!(level.sectors()[0].ceiling_height, 0);
    assert!(level.sectors()[0].special_data.is_some());

    run(&mut level, 1);
    assert!(level.sectors()[0].special_data.is_none());
    assert_eq!(level.thinkers().action(id), Some(Action::Removed));

    let stats = level.tick();
    assert_eq!(stats.reclaimed, 1);
    assert!(!level.thinkers().contains(id));
    assert_eq!(level.mem().total_free_bytes(), free_before);
}

#[test]
fn timed_doors_from_sector_specials() {
    let mut level = level_with(
        vec![
            Sector::new(0, 96, 160).with_special(10).with_neighbors([1]),
            Sector::new(0, 128, 160).with_neighbors([0]),
        ],
        1,
    );
    assert_eq!(level.spawn_specials(), 1);
    let id = special(&level);
    assert_eq!(door(&level, id).direction, 0);
    run(&mut level, 30 * 35);
    assert_eq!(door(&level, id).direction, -1);
}

// ── Ceilings ────────────────────────────────────────────────────

#[test]
fn crusher_cycles_and_is_never_retired() {
    let mut level = two_rooms(Sector::new(0, 128, 160));
    assert!(level.do_ceiling(1, CeilingKind::CrushAndRaise));
    let id = special(&level);
    assert!(level.active_ceilings().contains(id));

    run(&mut level, 121);
    let c = ceiling(&level, id);
    assert_eq!(level.sectors()[0].ceiling_height, 8 * FRACUNIT);
    assert_eq!(c.direction, 1);

    run(&mut level, 121);
    assert_eq!(level.sectors()[0].ceiling_height, 128 * FRACUNIT);
    assert_eq!(ceiling(&level, id).direction, -1);
    assert!(level.active_ceilings().contains(id));
}

#[test]
fn crush_stop_parks_and_retrigger_resumes() {
    let mut level = two_rooms(Sector::new(0, 128, 160));
    level.do_ceiling(1, CeilingKind::CrushAndRaise);
    let id = special(&level);
    run(&mut level, 10);
    assert_eq!(level.sectors()[0].ceiling_height, 118 * FRACUNIT);

    assert!(level.crush_stop(1));
    assert!(!level.crush_stop(1));
    assert_eq!(level.thinkers().action(id), Some(Action::Empty));
    run(&mut level, 5);
    assert_eq!(level.sectors()[0].ceiling_height, 118 * FRACUNIT);
    assert_eq!(ceiling(&level, id).old_direction, -1);

    // The sector is busy, so re-triggering only resumes the parked one.
    assert!(level.do_ceiling(1, CeilingKind::CrushAndRaise));
    assert_eq!(level.thinkers().len(), 1);
    level.tick();
    assert_eq!(level.sectors()[0].ceiling_height, 117 * FRACUNIT);
}

#[test]
fn lower_to_floor_retires_and_leaves_table() {
    let mut level = two_rooms(Sector::new(0, 4, 160));
    level.do_ceiling(1, CeilingKind::LowerToFloor);
    let id = special(&level);
    run(&mut level, 5);
    assert_eq!(level.sectors()[0].ceiling_height, 0);
    assert!(!level.active_ceilings().contains(id));
    assert!(level.sectors()[0].special_data.is_none());
}

// ── Floors ──────────────────────────────────────────────────────

#[test]
fn raise_24_stops_exactly() {
    let mut level = two_rooms(Sector::new(0, 128, 160));
    assert!(level.do_floor(1, FloorKind::RaiseFloor24));
    let id = special(&level);
    run(&mut level, 24);
    assert_eq!(level.sectors()[0].floor_height, 24 * FRACUNIT);
    assert!(level.thinkers().action(id).is_some_and(|a| a.is_active()));
    run(&mut level, 1);
    assert_eq!(level.sectors()[0].floor_height, 24 * FRACUNIT);
    assert_eq!(level.thinkers().action(id), Some(Action::Removed));
}

#[test]
fn lower_and_change_takes_neighbour_special() {
    let mut level = level_with(
        vec![
            Sector::new(0, 128, 160).with_tag(1).with_neighbors([1]),
            Sector {
                floor_pic: 5,
                ..Sector::new(-32, 128, 160).with_special(9).with_neighbors([0])
            },
        ],
        1,
    );
    level.do_floor(1, FloorKind::LowerAndChange);
    run(&mut level, 33);
    let s = &level.sectors()[0];
    assert_eq!(s.floor_height, -32 * FRACUNIT);
    assert_eq!(s.special, 9);
    assert_eq!(s.floor_pic, 5);
}

#[test]
fn geometry_dependent_floors_start_nothing() {
    let mut level = two_rooms(Sector::new(0, 128, 160));
    assert!(!level.do_floor(1, FloorKind::RaiseToTexture));
    assert!(!level.do_floor(1, FloorKind::DonutRaise));
    assert!(level.thinkers().is_empty());
}

// ── Platforms ───────────────────────────────────────────────────

#[test]
fn lift_lowers_waits_and_returns() {
    let mut level = two_rooms(Sector::new(0, 128, 160));
    assert!(level.do_plat(1, PlatKind::DownWaitUpStay, 0));
    let id = special(&level);
    assert_eq!(plat(&level, id).low, -32 * FRACUNIT);

    run(&mut level, 9);
    assert_eq!(level.sectors()[0].floor_height, -32 * FRACUNIT);
    assert_eq!(plat(&level, id).status, PlatStatus::Waiting);

    run(&mut level, 105);
    assert_eq!(plat(&level, id).status, PlatStatus::Up);

    run(&mut level, 9);
    assert_eq!(level.sectors()[0].floor_height, 0);
    assert!(!level.active_plats().contains(id));
    assert_eq!(level.thinkers().action(id), Some(Action::Removed));
}

#[test]
fn stopped_plat_resumes_its_phase() {
    let mut level = two_rooms(Sector::new(0, 128, 160));
    level.do_plat(1, PlatKind::DownWaitUpStay, 0);
    let id = special(&level);
    run(&mut level, 3);
    assert!(level.stop_plat(1));
    let p = plat(&level, id);
    assert_eq!((p.status, p.old_status), (PlatStatus::InStasis, PlatStatus::Down));
    run(&mut level, 10);
    assert_eq!(level.sectors()[0].floor_height, -12 * FRACUNIT);

    assert!(level.activate_in_stasis_plat(1));
    level.tick();
    assert_eq!(level.sectors()[0].floor_height, -16 * FRACUNIT);
}

// ── Map objects ─────────────────────────────────────────────────

#[test]
fn mobj_walks_its_states_then_vanishes() {
    let mut level = two_rooms(Sector::new(0, 128, 160));
    level.set_states([
        MobjState { tics: 3, next: 2 },
        MobjState { tics: 0, next: 3 },
        MobjState { tics: 2, next: 0 },
    ]);
    let free_before = level.mem().total_free_bytes();
    let id = level.spawn_mobj(Mobj {
        state: 1,
        ..Mobj::default()
    });

    run(&mut level, 3);
    match level.body(id) {
        Some(Body::Mobj(m)) => assert_eq!((m.state, m.tics), (3, 2)),
        other => panic!("{other:?}"),
    }
    run(&mut level, 2);
    assert_eq!(level.thinkers().action(id), Some(Action::Removed));
    run(&mut level, 1);
    assert!(!level.thinkers().contains(id));
    assert_eq!(level.mem().total_free_bytes(), free_before);
}

#[test]
fn weak_target_clears_when_target_goes() {
    let mut level = two_rooms(Sector::new(0, 128, 160));
    let prey = level.spawn_mobj(Mobj::default());
    let hunter = level.spawn_mobj(Mobj {
        target: Some(prey),
        tracer: Some(prey),
        ..Mobj::default()
    });
    level.tick();
    assert!(matches!(level.body(hunter), Some(Body::Mobj(m)) if m.target == Some(prey)));

    level.thinkers_mut().remove(prey);
    level.tick();
    match level.body(hunter) {
        Some(Body::Mobj(m)) => {
            assert_eq!(m.target, None);
            assert_eq!(m.tracer, None);
        }
        other => panic!("{other:?}"),
    }
}

// ── Level lifetime ──────────────────────────────────────────────

#[test]
fn level_transition_restores_the_zone() {
    let mut level = Level::new(&LevelConfig::new(ZoneConfig::new(512 * 1024))).unwrap();
    let empty = level.mem().total_free_bytes();
    for _ in 0..3 {
        level.load_sectors(vec![
            Sector::new(0, 128, 160).with_tag(1).with_special(8).with_neighbors([1]),
            Sector::new(-32, 128, 96).with_neighbors([0]),
        ]);
        level.spawn_specials();
        level.do_plat(1, PlatKind::PerpetualRaise, 0);
        for _ in 0..20 {
            level.spawn_mobj(Mobj::default());
        }
        run(&mut level, 50);
        level.free_level();
        assert_eq!(level.mem().total_free_bytes(), empty);
        assert!(level.active_plats().is_empty());
        level.mem().check();
    }
}
