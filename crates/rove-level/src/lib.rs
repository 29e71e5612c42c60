//! A reference level built on the Rove zone and scheduler.
//!
//! [`Level`] is a [`ThinkerHost`](rove_think::ThinkerHost) that owns a
//! zone, a thinker list and a set of [`Sector`]s. Its thinkers are map
//! objects and sector specials (moving ceilings, doors, floors, platforms,
//! and light effects), each a [`Body`] variant driven by one of the update
//! callbacks in [`think`].
//!
//! # Architecture
//!
//! ```text
//! Level
//!  ├── MemoryResource   every thinker and the sector array live in zone blocks
//!  ├── ThinkerList      runs callbacks once per tic, reclaims lazily
//!  ├── Vec<Sector>      plane heights, light, tag, special_data link
//!  ├── ActiveTable × 2  ceilings and platforms reachable by tag triggers
//!  └── ActionRegistry   callback names for dumps and rebinding
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod active;
pub mod body;
pub mod config;
pub mod level;
pub mod registry;
pub mod sector;
pub mod think;

pub use active::{ActiveTable, TableFull, MAX_CEILINGS, MAX_PLATS};
pub use body::{
    Body, Ceiling, CeilingKind, Door, DoorKind, FireFlicker, Floor, FloorKind, Glow, LightFlash,
    MapThing, Mobj, Plat, PlatKind, PlatStatus, Strobe,
};
pub use config::LevelConfig;
pub use level::{Level, MobjState};
pub use registry::ActionRegistry;
pub use sector::{Fixed, MoveResult, Plane, Sector, FRACBITS, FRACUNIT};
