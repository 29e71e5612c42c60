//! Rove: zone memory allocation and thinker scheduling for tick-driven
//! simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Rove sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use rove::prelude::*;
//!
//! // A hub with a closed door sector next to it.
//! let config = LevelConfig::new(ZoneConfig::with_megabytes(1)).with_seed(42);
//! let mut level = Level::new(&config).unwrap();
//! level.load_sectors(vec![
//!     Sector::new(0, 128, 160).with_neighbors([1]),
//!     Sector::new(0, 0, 160).with_tag(1).with_neighbors([0]),
//! ]);
//! assert!(level.do_door(1, DoorKind::Open));
//!
//! for _ in 0..62 {
//!     level.tick();
//! }
//! assert_eq!(level.sectors()[1].ceiling_height, 124 * FRACUNIT);
//!
//! // The door retires on the next tick and is reclaimed on the one after.
//! level.tick();
//! let stats = level.tick();
//! assert_eq!(stats.reclaimed, 1);
//! assert!(level.thinkers().is_empty());
//!
//! let bytes = save_level(&level, &SaveHeader::default(), Vec::new()).unwrap();
//! let loaded = load_level(&mut level, bytes.as_slice()).unwrap();
//! assert_eq!(loaded.header.level_time, 64);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rove-core` | Purge tags, zone pointers, owner slots, thinker ids |
//! | [`zone`] | `rove-zone` | The zone allocator and its diagnostics |
//! | [`think`] | `rove-think` | Thinker list, dispatch values, tick statistics |
//! | [`level`] | `rove-level` | Reference level: sectors, specials, map objects |
//! | [`save`] | `rove-save` | Saved-game archive format |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Shared vocabulary (`rove-core`).
pub use rove_core as types;

/// The zone allocator (`rove-zone`).
///
/// [`zone::MemoryResource`] is the fail-fast boundary most code wants;
/// [`zone::Zone`] reports contract violations as values.
pub use rove_zone as zone;

/// Thinker scheduling (`rove-think`).
pub use rove_think as think;

/// Reference level (`rove-level`).
pub use rove_level as level;

/// Saved-game archive (`rove-save`).
pub use rove_save as save;

/// Common imports for typical Rove usage.
///
/// ```rust
/// use rove::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use rove_core::{OwnerSlot, PurgeTag, ThinkerId, TickId, ZonePtr};

    // Zone
    pub use rove_zone::{MemoryResource, ZoneConfig, ZoneObserver};

    // Scheduler
    pub use rove_think::{Action, Thinker, ThinkerHost, ThinkerList, TickStats};

    // Level
    pub use rove_level::{
        Body, CeilingKind, DoorKind, FloorKind, Level, LevelConfig, Mobj, MobjState, PlatKind,
        Sector, FRACUNIT,
    };

    // Persistence
    pub use rove_save::{load_level, save_level, SaveError, SaveHeader};
}
