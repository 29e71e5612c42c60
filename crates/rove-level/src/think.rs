//! Per-tick update callbacks for level thinkers.
//!
//! Each callback copies its body out of the list, advances it one tic, and
//! writes it back. Callbacks that finish retire their record through the
//! [`Level`] helpers, which also clear the sector link and the active-table
//! entry.

use rove_core::ThinkerId;
use rove_think::action::ThinkFn;

use crate::body::{Body, CeilingKind, DoorKind, FloorKind, Mobj, PlatKind, PlatStatus};
use crate::level::Level;
use crate::sector::{fixed_mul, move_plane, Fixed, MoveResult, Plane, FRACUNIT};

// ── Constants ───────────────────────────────────────────────────

/// Base ceiling speed per tic.
pub const CEILSPEED: Fixed = FRACUNIT;
/// Base door speed per tic.
pub const VDOORSPEED: Fixed = 2 * FRACUNIT;
/// Tics a normal door stays open.
pub const VDOORWAIT: i32 = 150;
/// Base floor speed per tic.
pub const FLOORSPEED: Fixed = FRACUNIT;
/// Base platform speed per tic.
pub const PLATSPEED: Fixed = FRACUNIT;
/// Seconds a platform waits at either end.
pub const PLATWAIT: i32 = 3;
/// Simulation tics per second.
pub const TICRATE: i32 = 35;
/// Light change per tic of a glow.
pub const GLOWSPEED: i16 = 8;
/// Bright tics of a strobe.
pub const STROBEBRIGHT: i32 = 5;
/// Dark tics of a fast strobe.
pub const FASTDARK: i32 = 15;
/// Dark tics of a slow strobe.
pub const SLOWDARK: i32 = 35;
/// Downward acceleration per tic.
pub const GRAVITY: Fixed = FRACUNIT;
/// Momentum multiplier per tic on the ground.
pub const FRICTION: Fixed = 0xe800;
/// Momentum below which ground movement stops.
pub const STOPSPEED: Fixed = 0x1000;
/// Mobj flag: not affected by gravity.
pub const MF_NOGRAVITY: u32 = 0x200;

/// The update callback that drives `body`.
pub fn action_for(body: &Body) -> ThinkFn<Level> {
    match body {
        Body::Mobj(_) => mobj_thinker,
        Body::Ceiling(_) => move_ceiling,
        Body::Door(_) => vertical_door,
        Body::Floor(_) => move_floor,
        Body::Plat(_) => plat_raise,
        Body::LightFlash(_) => light_flash,
        Body::Strobe(_) => strobe_flash,
        Body::Glow(_) => glow,
        Body::FireFlicker(_) => fire_flicker,
    }
}

fn store(level: &mut Level, id: ThinkerId, body: Body) {
    if let Some(t) = level.thinkers.get_mut(id) {
        t.body = body;
    }
}

// ── Map objects ─────────────────────────────────────────────────

/// Integrate momentum, drop weak references to dead objects, and step the
/// state sequence. An object that reaches the null state removes itself.
pub fn mobj_thinker(level: &mut Level, id: ThinkerId) {
    let Some(Body::Mobj(mut m)) = level.body(id).copied() else {
        return;
    };
    if m.target.is_some_and(|t| !level.is_live_mobj(t)) {
        m.target = None;
    }
    if m.tracer.is_some_and(|t| !level.is_live_mobj(t)) {
        m.tracer = None;
    }

    xy_movement(&mut m);
    z_movement(&mut m);

    if m.tics != -1 {
        m.tics -= 1;
        if m.tics == 0 {
            let next = level.state(m.state).map_or(0, |s| s.next);
            if !level.set_mobj_state(&mut m, next) {
                store(level, id, Body::Mobj(m));
                level.thinkers.remove(id);
                return;
            }
        }
    }
    store(level, id, Body::Mobj(m));
}

fn xy_movement(m: &mut Mobj) {
    if m.mom_x == 0 && m.mom_y == 0 {
        return;
    }
    m.x = m.x.wrapping_add(m.mom_x);
    m.y = m.y.wrapping_add(m.mom_y);
    if m.z > m.floor_z {
        return;
    }
    if m.mom_x.abs() < STOPSPEED && m.mom_y.abs() < STOPSPEED {
        m.mom_x = 0;
        m.mom_y = 0;
    } else {
        m.mom_x = fixed_mul(m.mom_x, FRICTION);
        m.mom_y = fixed_mul(m.mom_y, FRICTION);
    }
}

fn z_movement(m: &mut Mobj) {
    m.z = m.z.saturating_add(m.mom_z);
    if m.z <= m.floor_z {
        m.z = m.floor_z;
        m.mom_z = m.mom_z.max(0);
    } else if m.flags & MF_NOGRAVITY == 0 {
        m.mom_z = if m.mom_z == 0 {
            -2 * GRAVITY
        } else {
            m.mom_z - GRAVITY
        };
    }
    if m.z.saturating_add(m.height) > m.ceiling_z {
        m.z = m.ceiling_z.saturating_sub(m.height);
        m.mom_z = m.mom_z.min(0);
    }
}

// ── Moving planes ───────────────────────────────────────────────

/// Move a ceiling one tic.
pub fn move_ceiling(level: &mut Level, id: ThinkerId) {
    let Some(Body::Ceiling(mut c)) = level.body(id).copied() else {
        return;
    };
    let Some(sector) = level.sectors.get_mut(c.sector) else {
        return;
    };
    let mut finished = false;
    match c.direction {
        1 => {
            let res = move_plane(sector, c.speed, c.top_height, false, Plane::Ceiling, 1);
            if res == MoveResult::PastDest {
                match c.kind {
                    CeilingKind::RaiseToHighest => finished = true,
                    k if k.is_perpetual() => c.direction = -1,
                    _ => {}
                }
            }
        }
        -1 => {
            let res = move_plane(sector, c.speed, c.bottom_height, c.crush, Plane::Ceiling, -1);
            match (res, c.kind) {
                (MoveResult::PastDest, CeilingKind::CrushAndRaise | CeilingKind::SilentCrushAndRaise) => {
                    c.speed = CEILSPEED;
                    c.direction = 1;
                }
                (MoveResult::PastDest, CeilingKind::FastCrushAndRaise) => c.direction = 1,
                (MoveResult::PastDest, CeilingKind::LowerAndCrush | CeilingKind::LowerToFloor) => {
                    finished = true
                }
                (
                    MoveResult::Crushed,
                    CeilingKind::CrushAndRaise
                    | CeilingKind::SilentCrushAndRaise
                    | CeilingKind::LowerAndCrush,
                ) => c.speed = CEILSPEED / 8,
                _ => {}
            }
        }
        _ => {}
    }
    store(level, id, Body::Ceiling(c));
    if finished {
        level.remove_active_ceiling(id);
    }
}

/// Move a door one tic, or count down its wait.
pub fn vertical_door(level: &mut Level, id: ThinkerId) {
    let Some(Body::Door(mut d)) = level.body(id).copied() else {
        return;
    };
    let Some(sector) = level.sectors.get_mut(d.sector) else {
        return;
    };
    let mut finished = false;
    match d.direction {
        0 => {
            d.top_countdown -= 1;
            if d.top_countdown == 0 {
                match d.kind {
                    DoorKind::BlazeRaise | DoorKind::Normal => d.direction = -1,
                    DoorKind::Close30ThenOpen => d.direction = 1,
                    _ => {}
                }
            }
        }
        2 => {
            d.top_countdown -= 1;
            if d.top_countdown == 0 && d.kind == DoorKind::RaiseIn5Mins {
                d.direction = 1;
                d.kind = DoorKind::Normal;
            }
        }
        -1 => {
            let floor = sector.floor_height;
            match move_plane(sector, d.speed, floor, false, Plane::Ceiling, -1) {
                MoveResult::PastDest => match d.kind {
                    DoorKind::BlazeRaise | DoorKind::BlazeClose | DoorKind::Normal | DoorKind::Close => {
                        finished = true
                    }
                    DoorKind::Close30ThenOpen => {
                        d.direction = 0;
                        d.top_countdown = TICRATE * 30;
                    }
                    _ => {}
                },
                MoveResult::Crushed => match d.kind {
                    DoorKind::BlazeClose | DoorKind::Close => {}
                    _ => d.direction = 1,
                },
                MoveResult::Ok => {}
            }
        }
        1 => {
            if move_plane(sector, d.speed, d.top_height, false, Plane::Ceiling, 1) == MoveResult::PastDest {
                match d.kind {
                    DoorKind::BlazeRaise | DoorKind::Normal => {
                        d.direction = 0;
                        d.top_countdown = d.top_wait;
                    }
                    DoorKind::Close30ThenOpen | DoorKind::BlazeOpen | DoorKind::Open => finished = true,
                    _ => {}
                }
            }
        }
        _ => {}
    }
    store(level, id, Body::Door(d));
    if finished {
        level.retire_special(id);
    }
}

/// Move a floor one tic.
pub fn move_floor(level: &mut Level, id: ThinkerId) {
    let Some(Body::Floor(f)) = level.body(id).copied() else {
        return;
    };
    let Some(sector) = level.sectors.get_mut(f.sector) else {
        return;
    };
    let res = move_plane(sector, f.speed, f.dest_height, f.crush, Plane::Floor, f.direction);
    if res != MoveResult::PastDest {
        return;
    }
    let changes = match (f.direction, f.kind) {
        (1, FloorKind::DonutRaise) | (-1, FloorKind::LowerAndChange) => true,
        _ => false,
    };
    if changes {
        sector.special = f.new_special as i16;
        sector.floor_pic = f.texture;
    }
    level.retire_special(id);
}

/// Move a platform one tic, or count down its wait.
pub fn plat_raise(level: &mut Level, id: ThinkerId) {
    let Some(Body::Plat(mut p)) = level.body(id).copied() else {
        return;
    };
    let Some(sector) = level.sectors.get_mut(p.sector) else {
        return;
    };
    let mut finished = false;
    match p.status {
        PlatStatus::Up => match move_plane(sector, p.speed, p.high, p.crush, Plane::Floor, 1) {
            MoveResult::Crushed if !p.crush => {
                p.count = p.wait;
                p.status = PlatStatus::Down;
            }
            MoveResult::PastDest => {
                p.count = p.wait;
                p.status = PlatStatus::Waiting;
                finished = p.kind != PlatKind::PerpetualRaise;
            }
            _ => {}
        },
        PlatStatus::Down => {
            if move_plane(sector, p.speed, p.low, false, Plane::Floor, -1) == MoveResult::PastDest {
                p.count = p.wait;
                p.status = PlatStatus::Waiting;
            }
        }
        PlatStatus::Waiting => {
            p.count -= 1;
            if p.count == 0 {
                p.status = if sector.floor_height == p.low {
                    PlatStatus::Up
                } else {
                    PlatStatus::Down
                };
            }
        }
        PlatStatus::InStasis => {}
    }
    store(level, id, Body::Plat(p));
    if finished {
        level.remove_active_plat(id);
    }
}

// ── Lights ──────────────────────────────────────────────────────

/// Switch between bright and dark at random intervals.
pub fn light_flash(level: &mut Level, id: ThinkerId) {
    let Some(Body::LightFlash(mut l)) = level.body(id).copied() else {
        return;
    };
    l.count -= 1;
    if l.count == 0 {
        let r = level.random();
        if let Some(s) = level.sectors.get_mut(l.sector) {
            if s.light_level == l.max_light {
                s.light_level = l.min_light;
                l.count = (r & l.min_time) + 1;
            } else {
                s.light_level = l.max_light;
                l.count = (r & l.max_time) + 1;
            }
        }
    }
    store(level, id, Body::LightFlash(l));
}

/// Switch between bright and dark at fixed intervals.
pub fn strobe_flash(level: &mut Level, id: ThinkerId) {
    let Some(Body::Strobe(mut s)) = level.body(id).copied() else {
        return;
    };
    s.count -= 1;
    if s.count == 0 {
        if let Some(sector) = level.sectors.get_mut(s.sector) {
            if sector.light_level == s.min_light {
                sector.light_level = s.max_light;
                s.count = s.bright_time;
            } else {
                sector.light_level = s.min_light;
                s.count = s.dark_time;
            }
        }
    }
    store(level, id, Body::Strobe(s));
}

/// Ramp the light down to the minimum and back up to the maximum.
pub fn glow(level: &mut Level, id: ThinkerId) {
    let Some(Body::Glow(mut g)) = level.body(id).copied() else {
        return;
    };
    if let Some(sector) = level.sectors.get_mut(g.sector) {
        match g.direction {
            -1 => {
                sector.light_level -= GLOWSPEED;
                if sector.light_level <= g.min_light {
                    sector.light_level += GLOWSPEED;
                    g.direction = 1;
                }
            }
            1 => {
                sector.light_level += GLOWSPEED;
                if sector.light_level >= g.max_light {
                    sector.light_level -= GLOWSPEED;
                    g.direction = -1;
                }
            }
            _ => {}
        }
    }
    store(level, id, Body::Glow(g));
}

/// Drop the light by a random step below the maximum every four tics.
pub fn fire_flicker(level: &mut Level, id: ThinkerId) {
    let Some(Body::FireFlicker(mut f)) = level.body(id).copied() else {
        return;
    };
    f.count -= 1;
    if f.count == 0 {
        let amount = ((level.random() & 3) * 16) as i16;
        if let Some(s) = level.sectors.get_mut(f.sector) {
            s.light_level = if s.light_level - amount < f.min_light {
                f.min_light
            } else {
                f.max_light - amount
            };
        }
        f.count = 4;
    }
    store(level, id, Body::FireFlicker(f));
}
