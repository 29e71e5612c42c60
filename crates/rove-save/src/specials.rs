//! Sector special section.

use std::io::{Read, Write};

use rove_core::ThinkerId;
use rove_level::{think, Body, Level};
use rove_think::{Action, ThinkerHost};

use crate::error::SaveError;
use crate::records::{
    read_ceiling, read_door, read_flash, read_floor, read_glow, read_plat, read_strobe,
    write_ceiling, write_door, write_flash, write_floor, write_glow, write_plat, write_strobe,
};
use crate::stream::{SaveReader, SaveWriter};

/// Ceiling mover.
pub const TC_CEILING: u8 = 0;
/// Door.
pub const TC_DOOR: u8 = 1;
/// Floor mover.
pub const TC_FLOOR: u8 = 2;
/// Platform.
pub const TC_PLAT: u8 = 3;
/// Flashing light.
pub const TC_FLASH: u8 = 4;
/// Strobing light.
pub const TC_STROBE: u8 = 5;
/// Glowing light.
pub const TC_GLOW: u8 = 6;
/// End of the special section.
pub const TC_ENDSPECIALS: u8 = 7;

/// Write every live special in list order, then the end marker.
///
/// Parked ceilings and platforms are written only while their active
/// table still tracks them, with the callback flag clear. Fire flickers
/// are not saved. Returns the number of records written.
pub fn archive_specials<W: Write>(level: &Level, w: &mut SaveWriter<W>) -> Result<usize, SaveError> {
    let mut written = 0;
    for (id, t) in level.thinkers().records() {
        if t.action.is_removed() {
            continue;
        }
        let has_action = t.action.is_active();
        match &t.body {
            Body::Ceiling(c) => {
                if !has_action && !level.active_ceilings().contains(id) {
                    continue;
                }
                begin(w, TC_CEILING)?;
                write_ceiling(w, c, has_action)?;
            }
            Body::Plat(p) => {
                if !has_action && !level.active_plats().contains(id) {
                    continue;
                }
                begin(w, TC_PLAT)?;
                write_plat(w, p, has_action)?;
            }
            Body::Door(d) => {
                begin(w, TC_DOOR)?;
                write_door(w, d)?;
            }
            Body::Floor(f) => {
                begin(w, TC_FLOOR)?;
                write_floor(w, f)?;
            }
            Body::LightFlash(l) => {
                begin(w, TC_FLASH)?;
                write_flash(w, l)?;
            }
            Body::Strobe(s) => {
                begin(w, TC_STROBE)?;
                write_strobe(w, s)?;
            }
            Body::Glow(g) => {
                begin(w, TC_GLOW)?;
                write_glow(w, g)?;
            }
            Body::Mobj(_) | Body::FireFlicker(_) => continue,
        }
        written += 1;
    }
    w.write_u8(TC_ENDSPECIALS)?;
    log::debug!("archived {written} specials");
    Ok(written)
}

/// Rebuild the specials from `r`, appending them to the thinker list.
///
/// Movers are relinked to their sectors; ceilings and platforms rejoin
/// their active tables and stay parked if they were saved parked.
/// Returns the number of records loaded.
pub fn unarchive_specials<R: Read>(level: &mut Level, r: &mut SaveReader<R>) -> Result<usize, SaveError> {
    let sectors = level.sectors().len();
    let mut loaded = 0;
    loop {
        let class = r.read_u8()?;
        if class == TC_ENDSPECIALS {
            break;
        }
        r.skip_pad()?;
        match class {
            TC_CEILING => {
                let (c, has_action) = read_ceiling(r, sectors)?;
                let id = spawn_linked(level, Body::Ceiling(c), c.sector);
                level.add_active_ceiling(id);
                if !has_action {
                    level.stop_moving(id);
                }
            }
            TC_DOOR => {
                let d = read_door(r, sectors)?;
                spawn_linked(level, Body::Door(d), d.sector);
            }
            TC_FLOOR => {
                let f = read_floor(r, sectors)?;
                spawn_linked(level, Body::Floor(f), f.sector);
            }
            TC_PLAT => {
                let (p, has_action) = read_plat(r, sectors)?;
                let id = spawn_linked(level, Body::Plat(p), p.sector);
                level.add_active_plat(id);
                if !has_action {
                    level.stop_moving(id);
                }
            }
            TC_FLASH => {
                spawn(level, Body::LightFlash(read_flash(r, sectors)?));
            }
            TC_STROBE => {
                spawn(level, Body::Strobe(read_strobe(r, sectors)?));
            }
            TC_GLOW => {
                spawn(level, Body::Glow(read_glow(r, sectors)?));
            }
            class => {
                return Err(SaveError::UnknownClass {
                    section: "special",
                    class,
                })
            }
        }
        loaded += 1;
    }
    log::debug!("unarchived {loaded} specials");
    Ok(loaded)
}

fn begin<W: Write>(w: &mut SaveWriter<W>, class: u8) -> Result<(), SaveError> {
    w.write_u8(class)?;
    w.pad()
}

fn spawn(level: &mut Level, body: Body) -> ThinkerId {
    let action = Action::Think(think::action_for(&body));
    level.spawn_thinker(body, action)
}

fn spawn_linked(level: &mut Level, body: Body, sector: usize) -> ThinkerId {
    let id = spawn(level, body);
    // Index was bounds-checked when the record was read.
    if let Some(s) = level.sectors_mut().get_mut(sector) {
        s.special_data = Some(id);
    }
    id
}
