//! Field-level encoding of each thinker body.
//!
//! Every body starts with the thinker-space triple: two zero words where
//! the list links used to be, then a word that is non-zero when the record
//! had an update callback. Sector references are indices; weak mobj
//! references are ordinals resolved after loading.

use std::io::{Read, Write};

use rove_level::{
    Ceiling, CeilingKind, Door, DoorKind, Floor, FloorKind, Glow, LightFlash, MapThing, Mobj,
    Plat, PlatKind, PlatStatus, Strobe,
};

use crate::error::SaveError;
use crate::stream::{SaveReader, SaveWriter};

// ── Shared pieces ───────────────────────────────────────────────

fn write_thinker_space<W: Write>(w: &mut SaveWriter<W>, has_action: bool) -> Result<(), SaveError> {
    w.write_u32(0)?;
    w.write_u32(0)?;
    w.write_u32(u32::from(has_action))
}

fn read_thinker_space<R: Read>(r: &mut SaveReader<R>) -> Result<bool, SaveError> {
    r.read_u32()?;
    r.read_u32()?;
    Ok(r.read_u32()? != 0)
}

fn write_sector<W: Write>(w: &mut SaveWriter<W>, index: usize) -> Result<(), SaveError> {
    w.write_i32(index as i32)
}

fn read_sector<R: Read>(r: &mut SaveReader<R>, sectors: usize) -> Result<usize, SaveError> {
    let index = r.read_i32()?;
    usize::try_from(index)
        .ok()
        .filter(|&i| i < sectors)
        .ok_or(SaveError::BadSector { index })
}

fn read_enum<R: Read, T>(
    r: &mut SaveReader<R>,
    field: &'static str,
    decode: fn(i32) -> Option<T>,
) -> Result<T, SaveError> {
    let value = r.read_i32()?;
    decode(value).ok_or(SaveError::BadEnum { field, value })
}

// ── Map objects ─────────────────────────────────────────────────

/// Write a mobj with its weak references already turned into ordinals.
pub fn write_mobj<W: Write>(
    w: &mut SaveWriter<W>,
    m: &Mobj,
    target: u32,
    tracer: u32,
) -> Result<(), SaveError> {
    write_thinker_space(w, true)?;
    w.write_i32(m.x)?;
    w.write_i32(m.y)?;
    w.write_i32(m.z)?;
    // Sector thing-list links.
    w.write_u32(0)?;
    w.write_u32(0)?;
    w.write_u32(m.angle)?;
    w.write_i32(m.sprite)?;
    w.write_i32(m.frame)?;
    // Block-map links and subsector.
    w.write_u32(0)?;
    w.write_u32(0)?;
    w.write_u32(0)?;
    w.write_i32(m.floor_z)?;
    w.write_i32(m.ceiling_z)?;
    w.write_i32(m.radius)?;
    w.write_i32(m.height)?;
    w.write_i32(m.mom_x)?;
    w.write_i32(m.mom_y)?;
    w.write_i32(m.mom_z)?;
    w.write_i32(m.valid_count)?;
    w.write_i32(m.kind)?;
    // Type info, rebuilt from `kind`.
    w.write_u32(0)?;
    w.write_i32(m.tics)?;
    w.write_u32(m.state)?;
    w.write_u32(m.flags)?;
    w.write_i32(m.health)?;
    w.write_i32(m.move_dir)?;
    w.write_i32(m.move_count)?;
    w.write_u32(target)?;
    w.write_i32(m.reaction_time)?;
    w.write_i32(m.threshold)?;
    w.write_i32(m.player)?;
    w.write_i32(m.last_look)?;
    let p = &m.spawn_point;
    for v in [p.x, p.y, p.angle, p.kind, p.options] {
        w.write_i16(v)?;
    }
    w.write_u32(tracer)
}

/// Read a mobj. Returns it with empty weak references, plus the stored
/// target and tracer ordinals.
pub fn read_mobj<R: Read>(r: &mut SaveReader<R>) -> Result<(Mobj, u32, u32), SaveError> {
    read_thinker_space(r)?;
    let mut m = Mobj {
        x: r.read_i32()?,
        y: r.read_i32()?,
        z: r.read_i32()?,
        ..Mobj::default()
    };
    r.read_u32()?;
    r.read_u32()?;
    m.angle = r.read_u32()?;
    m.sprite = r.read_i32()?;
    m.frame = r.read_i32()?;
    r.read_u32()?;
    r.read_u32()?;
    r.read_u32()?;
    m.floor_z = r.read_i32()?;
    m.ceiling_z = r.read_i32()?;
    m.radius = r.read_i32()?;
    m.height = r.read_i32()?;
    m.mom_x = r.read_i32()?;
    m.mom_y = r.read_i32()?;
    m.mom_z = r.read_i32()?;
    m.valid_count = r.read_i32()?;
    m.kind = r.read_i32()?;
    r.read_u32()?;
    m.tics = r.read_i32()?;
    m.state = r.read_u32()?;
    m.flags = r.read_u32()?;
    m.health = r.read_i32()?;
    m.move_dir = r.read_i32()?;
    m.move_count = r.read_i32()?;
    let target = r.read_u32()?;
    m.reaction_time = r.read_i32()?;
    m.threshold = r.read_i32()?;
    m.player = r.read_i32()?;
    m.last_look = r.read_i32()?;
    m.spawn_point = MapThing {
        x: r.read_i16()?,
        y: r.read_i16()?,
        angle: r.read_i16()?,
        kind: r.read_i16()?,
        options: r.read_i16()?,
    };
    let tracer = r.read_u32()?;
    Ok((m, target, tracer))
}

// ── Moving planes ───────────────────────────────────────────────

/// Write a ceiling mover.
pub fn write_ceiling<W: Write>(w: &mut SaveWriter<W>, c: &Ceiling, has_action: bool) -> Result<(), SaveError> {
    write_thinker_space(w, has_action)?;
    w.write_i32(c.kind.code())?;
    write_sector(w, c.sector)?;
    w.write_i32(c.bottom_height)?;
    w.write_i32(c.top_height)?;
    w.write_i32(c.speed)?;
    w.write_bool(c.crush)?;
    w.write_i32(c.direction)?;
    w.write_i32(i32::from(c.tag))?;
    w.write_i32(c.old_direction)
}

/// Read a ceiling mover and whether it had a callback.
pub fn read_ceiling<R: Read>(r: &mut SaveReader<R>, sectors: usize) -> Result<(Ceiling, bool), SaveError> {
    let has_action = read_thinker_space(r)?;
    let c = Ceiling {
        kind: read_enum(r, "ceiling type", CeilingKind::from_code)?,
        sector: read_sector(r, sectors)?,
        bottom_height: r.read_i32()?,
        top_height: r.read_i32()?,
        speed: r.read_i32()?,
        crush: r.read_bool()?,
        direction: r.read_i32()?,
        tag: r.read_i32()? as i16,
        old_direction: r.read_i32()?,
    };
    Ok((c, has_action))
}

/// Write a door.
pub fn write_door<W: Write>(w: &mut SaveWriter<W>, d: &Door) -> Result<(), SaveError> {
    write_thinker_space(w, true)?;
    w.write_i32(d.kind.code())?;
    write_sector(w, d.sector)?;
    w.write_i32(d.top_height)?;
    w.write_i32(d.speed)?;
    w.write_i32(d.direction)?;
    w.write_i32(d.top_wait)?;
    w.write_i32(d.top_countdown)
}

/// Read a door.
pub fn read_door<R: Read>(r: &mut SaveReader<R>, sectors: usize) -> Result<Door, SaveError> {
    read_thinker_space(r)?;
    Ok(Door {
        kind: read_enum(r, "door type", DoorKind::from_code)?,
        sector: read_sector(r, sectors)?,
        top_height: r.read_i32()?,
        speed: r.read_i32()?,
        direction: r.read_i32()?,
        top_wait: r.read_i32()?,
        top_countdown: r.read_i32()?,
    })
}

/// Write a floor mover.
pub fn write_floor<W: Write>(w: &mut SaveWriter<W>, f: &Floor) -> Result<(), SaveError> {
    write_thinker_space(w, true)?;
    w.write_i32(f.kind.code())?;
    w.write_bool(f.crush)?;
    write_sector(w, f.sector)?;
    w.write_i32(f.direction)?;
    w.write_i32(f.new_special)?;
    w.write_i16(f.texture)?;
    w.write_i32(f.dest_height)?;
    w.write_i32(f.speed)
}

/// Read a floor mover.
pub fn read_floor<R: Read>(r: &mut SaveReader<R>, sectors: usize) -> Result<Floor, SaveError> {
    read_thinker_space(r)?;
    Ok(Floor {
        kind: read_enum(r, "floor type", FloorKind::from_code)?,
        crush: r.read_bool()?,
        sector: read_sector(r, sectors)?,
        direction: r.read_i32()?,
        new_special: r.read_i32()?,
        texture: r.read_i16()?,
        dest_height: r.read_i32()?,
        speed: r.read_i32()?,
    })
}

/// Write a platform.
pub fn write_plat<W: Write>(w: &mut SaveWriter<W>, p: &Plat, has_action: bool) -> Result<(), SaveError> {
    write_thinker_space(w, has_action)?;
    write_sector(w, p.sector)?;
    w.write_i32(p.speed)?;
    w.write_i32(p.low)?;
    w.write_i32(p.high)?;
    w.write_i32(p.wait)?;
    w.write_i32(p.count)?;
    w.write_i32(p.status.code())?;
    w.write_i32(p.old_status.code())?;
    w.write_bool(p.crush)?;
    w.write_i32(i32::from(p.tag))?;
    w.write_i32(p.kind.code())
}

/// Read a platform and whether it had a callback.
pub fn read_plat<R: Read>(r: &mut SaveReader<R>, sectors: usize) -> Result<(Plat, bool), SaveError> {
    let has_action = read_thinker_space(r)?;
    let p = Plat {
        sector: read_sector(r, sectors)?,
        speed: r.read_i32()?,
        low: r.read_i32()?,
        high: r.read_i32()?,
        wait: r.read_i32()?,
        count: r.read_i32()?,
        status: read_enum(r, "plat status", PlatStatus::from_code)?,
        old_status: read_enum(r, "plat status", PlatStatus::from_code)?,
        crush: r.read_bool()?,
        tag: r.read_i32()? as i16,
        kind: read_enum(r, "plat type", PlatKind::from_code)?,
    };
    Ok((p, has_action))
}

// ── Lights ──────────────────────────────────────────────────────

/// Write a flashing light.
pub fn write_flash<W: Write>(w: &mut SaveWriter<W>, l: &LightFlash) -> Result<(), SaveError> {
    write_thinker_space(w, true)?;
    write_sector(w, l.sector)?;
    w.write_i32(l.count)?;
    w.write_i32(i32::from(l.max_light))?;
    w.write_i32(i32::from(l.min_light))?;
    w.write_i32(l.max_time)?;
    w.write_i32(l.min_time)
}

/// Read a flashing light.
pub fn read_flash<R: Read>(r: &mut SaveReader<R>, sectors: usize) -> Result<LightFlash, SaveError> {
    read_thinker_space(r)?;
    Ok(LightFlash {
        sector: read_sector(r, sectors)?,
        count: r.read_i32()?,
        max_light: r.read_i32()? as i16,
        min_light: r.read_i32()? as i16,
        max_time: r.read_i32()?,
        min_time: r.read_i32()?,
    })
}

/// Write a strobing light.
pub fn write_strobe<W: Write>(w: &mut SaveWriter<W>, s: &Strobe) -> Result<(), SaveError> {
    write_thinker_space(w, true)?;
    write_sector(w, s.sector)?;
    w.write_i32(s.count)?;
    w.write_i32(i32::from(s.min_light))?;
    w.write_i32(i32::from(s.max_light))?;
    w.write_i32(s.dark_time)?;
    w.write_i32(s.bright_time)
}

/// Read a strobing light.
pub fn read_strobe<R: Read>(r: &mut SaveReader<R>, sectors: usize) -> Result<Strobe, SaveError> {
    read_thinker_space(r)?;
    Ok(Strobe {
        sector: read_sector(r, sectors)?,
        count: r.read_i32()?,
        min_light: r.read_i32()? as i16,
        max_light: r.read_i32()? as i16,
        dark_time: r.read_i32()?,
        bright_time: r.read_i32()?,
    })
}

/// Write a glowing light.
pub fn write_glow<W: Write>(w: &mut SaveWriter<W>, g: &Glow) -> Result<(), SaveError> {
    write_thinker_space(w, true)?;
    write_sector(w, g.sector)?;
    w.write_i32(i32::from(g.min_light))?;
    w.write_i32(i32::from(g.max_light))?;
    w.write_i32(g.direction)
}

/// Read a glowing light.
pub fn read_glow<R: Read>(r: &mut SaveReader<R>, sectors: usize) -> Result<Glow, SaveError> {
    read_thinker_space(r)?;
    Ok(Glow {
        sector: read_sector(r, sectors)?,
        min_light: r.read_i32()? as i16,
        max_light: r.read_i32()? as i16,
        direction: r.read_i32()?,
    })
}
