//! Benchmark profiles for the Rove zone allocator and scheduler.
//!
//! - [`churn_sizes`]: deterministic allocation sizes via seed
//! - [`crowd_level`]: a level with many rooms, specials and map objects

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rove_level::{Level, LevelConfig, Mobj, MobjState, Sector, FRACUNIT};
use rove_zone::ZoneConfig;

/// `count` allocation sizes between 16 and 1040 bytes, skewed small.
pub fn churn_sizes(count: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let r = rng.next_u32();
            // Three in four requests are thinker-sized.
            if r & 3 == 0 {
                16 + (r >> 2) as usize % 1024
            } else {
                16 + (r >> 2) as usize % 192
            }
        })
        .collect()
}

/// Sector specials cycled across the rooms of [`crowd_level`].
const ROOM_SPECIALS: [i16; 6] = [1, 2, 3, 8, 12, 17];

/// A hub with `rooms` side rooms and `mobjs` map objects.
///
/// Every room carries a light special and every fourth room is tagged `1`
/// for movers. Map objects loop between two states and drift with a small
/// momentum so friction runs every tick.
pub fn crowd_level(rooms: usize, mobjs: usize, seed: u64) -> Level {
    let config = LevelConfig::new(ZoneConfig::with_megabytes(16)).with_seed(seed);
    let mut level = Level::new(&config).expect("16 MiB zone is a valid config");

    let mut sectors = vec![Sector::new(0, 128, 160).with_neighbors(1..=rooms)];
    for i in 0..rooms {
        let mut room = Sector::new(0, 96, 192)
            .with_special(ROOM_SPECIALS[i % ROOM_SPECIALS.len()])
            .with_neighbors([0]);
        if i % 4 == 0 {
            room = room.with_tag(1);
        }
        sectors.push(room);
    }
    level.load_sectors(sectors);
    level.set_states([
        MobjState { tics: 3, next: 2 },
        MobjState { tics: 5, next: 1 },
    ]);
    level.spawn_specials();

    for i in 0..mobjs {
        let i = i as i32;
        level.spawn_mobj(Mobj {
            x: (i % 64) * 32 * FRACUNIT,
            y: (i / 64) * 32 * FRACUNIT,
            ceiling_z: 128 * FRACUNIT,
            mom_x: FRACUNIT / 2,
            state: 1,
            health: 20,
            ..Mobj::default()
        });
    }
    level
}
