//! Saved-game archive for Rove levels.
//!
//! A save is a flat little-endian stream:
//!
//! ```text
//! header      description, version, skill/episode/map, players, level time
//! world       per sector: floor, ceiling, flats, light, special, tag
//! thinkers    { TC_MOBJ pad mobj }* TC_END
//! specials    { class pad record }* TC_ENDSPECIALS
//! eof         0x1d
//! ```
//!
//! Records are padded to 4-byte boundaries measured from the start of the
//! stream. Zone addresses are never written: sector references become
//! indices and weak mobj references become 1-based ordinals over the live
//! map objects in list order, resolved again by [`restore_targets`] once
//! the whole thinker list has been rebuilt.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod game;
pub mod header;
pub mod records;
pub mod specials;
pub mod stream;
pub mod thinkers;
pub mod world;

pub use error::SaveError;
pub use game::{load_level, save_level, Loaded};
pub use header::{SaveHeader, SAVEGAME_EOF, SAVE_VERSION};
pub use specials::{archive_specials, unarchive_specials};
pub use stream::{SaveReader, SaveWriter};
pub use thinkers::{archive_thinkers, restore_targets, unarchive_thinkers, PendingRefs};
pub use world::{archive_world, unarchive_world};
