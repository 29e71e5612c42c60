//! Sector state.

use std::io::{Read, Write};

use rove_level::{Level, FRACBITS};

use crate::error::SaveError;
use crate::stream::{SaveReader, SaveWriter};

/// Write the mutable state of every sector, in index order.
///
/// Heights are stored in whole map units.
pub fn archive_world<W: Write>(level: &Level, w: &mut SaveWriter<W>) -> Result<(), SaveError> {
    for s in level.sectors() {
        w.write_i16((s.floor_height >> FRACBITS) as i16)?;
        w.write_i16((s.ceiling_height >> FRACBITS) as i16)?;
        w.write_i16(s.floor_pic)?;
        w.write_i16(s.ceiling_pic)?;
        w.write_i16(s.light_level)?;
        w.write_i16(s.special)?;
        w.write_i16(s.tag)?;
    }
    Ok(())
}

/// Restore sector state over the level's current sectors.
///
/// The level must already hold the same map's sectors. Special links are
/// reset; loading the specials relinks them.
pub fn unarchive_world<R: Read>(level: &mut Level, r: &mut SaveReader<R>) -> Result<(), SaveError> {
    for s in level.sectors_mut() {
        s.floor_height = i32::from(r.read_i16()?) << FRACBITS;
        s.ceiling_height = i32::from(r.read_i16()?) << FRACBITS;
        s.floor_pic = r.read_i16()?;
        s.ceiling_pic = r.read_i16()?;
        s.light_level = r.read_i16()?;
        s.special = r.read_i16()?;
        s.tag = r.read_i16()?;
        s.special_data = None;
    }
    Ok(())
}
