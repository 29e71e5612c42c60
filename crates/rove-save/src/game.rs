//! Whole-level save and load.

use std::io::{Read, Write};

use rove_core::TickId;
use rove_level::Level;

use crate::error::SaveError;
use crate::header::{read_eof, write_eof, SaveHeader};
use crate::specials::{archive_specials, unarchive_specials};
use crate::stream::{SaveReader, SaveWriter};
use crate::thinkers::{archive_thinkers, restore_targets, unarchive_thinkers};
use crate::world::{archive_world, unarchive_world};

/// What a load brought back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loaded {
    /// The header as stored.
    pub header: SaveHeader,
    /// Map objects loaded.
    pub mobjs: usize,
    /// Specials loaded.
    pub specials: usize,
    /// Weak references that could not be resolved and were cleared.
    pub unresolved: u32,
}

/// Write `level` to `sink`.
///
/// The header's level time is taken from the level; the other header
/// fields are written as given.
pub fn save_level<W: Write>(level: &Level, header: &SaveHeader, sink: W) -> Result<W, SaveError> {
    let mut w = SaveWriter::new(sink);
    let header = SaveHeader {
        level_time: (level.time().0 & 0xff_ffff) as u32,
        ..header.clone()
    };
    header.write(&mut w)?;
    archive_world(level, &mut w)?;
    let mobjs = archive_thinkers(level, &mut w)?;
    let specials = archive_specials(level, &mut w)?;
    write_eof(&mut w)?;
    w.flush()?;
    log::info!(
        "saved {:?}: {mobjs} mobjs, {specials} specials, {} bytes",
        header.description,
        w.position()
    );
    Ok(w.into_inner())
}

/// Replace the state of `level` with a save read from `source`.
///
/// `level` must already hold the saved map's sectors. On error the level
/// is left in an unspecified state and should be freed.
pub fn load_level<R: Read>(level: &mut Level, source: R) -> Result<Loaded, SaveError> {
    let mut r = SaveReader::new(source);
    let header = SaveHeader::read(&mut r)?;
    unarchive_world(level, &mut r)?;
    let pending = unarchive_thinkers(level, &mut r)?;
    let specials = unarchive_specials(level, &mut r)?;
    let unresolved = restore_targets(level, &pending);
    read_eof(&mut r)?;
    level.set_time(TickId(u64::from(header.level_time)));
    log::info!(
        "loaded {:?}: {} mobjs, {specials} specials",
        header.description,
        pending.len()
    );
    Ok(Loaded {
        header,
        mobjs: pending.len(),
        specials,
        unresolved,
    })
}
