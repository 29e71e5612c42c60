//! A small reference map for integration tests and benchmarks.
//!
//! ```text
//!            ┌── 1 door (tag 1)
//!            ├── 2 crusher (tag 2)
//!   0 hub ───┼── 3 lift (tag 3)
//!            ├── 4 glow
//!            ├── 5 flash
//!            └── 6 strobe
//! ```

use rove_core::ThinkerId;
use rove_level::{
    Body, CeilingKind, DoorKind, Level, LevelConfig, MapThing, Mobj, MobjState, PlatKind, Sector,
    FRACUNIT,
};
use rove_zone::ZoneConfig;

pub const DOOR_TAG: i16 = 1;
pub const CRUSHER_TAG: i16 = 2;
pub const LIFT_TAG: i16 = 3;

/// Zone size used by [`empty_level`].
pub const ZONE_BYTES: usize = 1024 * 1024;

/// Seven sectors around a hub; see the module diagram.
pub fn sample_sectors() -> Vec<Sector> {
    let edge = |s: Sector| s.with_neighbors([0]);
    vec![
        Sector::new(0, 128, 160).with_neighbors(1..=6),
        edge(Sector::new(0, 0, 160).with_tag(DOOR_TAG)),
        edge(Sector::new(0, 96, 160).with_tag(CRUSHER_TAG)),
        edge(Sector::new(64, 192, 160).with_tag(LIFT_TAG)),
        edge(Sector::new(0, 128, 200).with_special(8)),
        edge(Sector::new(0, 128, 192).with_special(1)),
        edge(Sector::new(0, 128, 192).with_special(2)),
    ]
}

/// States 1 and 2 loop forever; state 3 runs out into the null state.
pub fn sample_states() -> [MobjState; 3] {
    [
        MobjState { tics: 4, next: 2 },
        MobjState { tics: 6, next: 1 },
        MobjState { tics: 8, next: 0 },
    ]
}

/// A walking object standing on the hub floor.
pub fn walker(x: i32, y: i32) -> Mobj {
    Mobj {
        x: x * FRACUNIT,
        y: y * FRACUNIT,
        floor_z: 0,
        ceiling_z: 128 * FRACUNIT,
        radius: 20 * FRACUNIT,
        height: 56 * FRACUNIT,
        kind: 3004,
        state: 1,
        health: 20,
        spawn_point: MapThing {
            x: x as i16,
            y: y as i16,
            angle: 90,
            kind: 3004,
            options: 7,
        },
        ..Mobj::default()
    }
}

/// An empty level over a [`ZONE_BYTES`] zone with the sample sectors and
/// states loaded.
pub fn empty_level(seed: u64) -> Level {
    let config = LevelConfig::new(ZoneConfig::new(ZONE_BYTES)).with_seed(seed);
    let mut level = Level::new(&config).expect("fixture zone config is valid");
    level.load_sectors(sample_sectors());
    level.set_states(sample_states());
    level
}

/// The sample map mid-play.
///
/// Three walkers chase each other in a ring (each targets the previous,
/// the first traces the last), the sector specials are spawned, and the
/// door, crusher and lift have been triggered. Returns the walker ids in
/// spawn order.
pub fn sample_level(seed: u64) -> (Level, Vec<ThinkerId>) {
    let mut level = empty_level(seed);
    let walkers: Vec<ThinkerId> = [(-64, 0), (0, 64), (64, 0)]
        .into_iter()
        .map(|(x, y)| level.spawn_mobj(walker(x, y)))
        .collect();
    for (i, &id) in walkers.iter().enumerate() {
        let prev = walkers[(i + walkers.len() - 1) % walkers.len()];
        if let Some(Body::Mobj(m)) = level.body_mut(id) {
            if i == 0 {
                m.tracer = Some(prev);
            } else {
                m.target = Some(prev);
            }
        }
    }
    level.spawn_specials();
    level.do_door(DOOR_TAG, DoorKind::Normal);
    level.do_ceiling(CRUSHER_TAG, CeilingKind::CrushAndRaise);
    level.do_plat(LIFT_TAG, PlatKind::DownWaitUpStay, 0);
    (level, walkers)
}
