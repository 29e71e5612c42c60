//! Map object section and weak-reference restoration.

use std::collections::HashMap;
use std::io::{Read, Write};

use rove_core::ThinkerId;
use rove_level::{think, Body, Level};
use rove_think::{Action, Thinker, ThinkerHost};

use crate::error::SaveError;
use crate::records::{read_mobj, write_mobj};
use crate::stream::{SaveReader, SaveWriter};

/// End of the thinker section.
pub const TC_END: u8 = 0;

/// A map object record follows.
pub const TC_MOBJ: u8 = 1;

/// The ordinal space for weak references: live map objects in list order.
pub fn is_mobj(t: &Thinker<Level>) -> bool {
    t.body.is_mobj()
}

/// Weak references of one loaded mobj, still as stored ordinals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRefs {
    /// The loaded mobj.
    pub id: ThinkerId,
    /// Stored target ordinal; `0` for none.
    pub target: u32,
    /// Stored tracer ordinal; `0` for none.
    pub tracer: u32,
}

/// Write every live map object in list order, then the end marker.
///
/// `target` and `tracer` are written as ordinals (see [`is_mobj`]); a
/// reference to anything that is not a live mobj is written as `0`.
/// Returns the number of records written.
pub fn archive_thinkers<W: Write>(level: &Level, w: &mut SaveWriter<W>) -> Result<usize, SaveError> {
    let ordinals: HashMap<ThinkerId, u32> = level
        .thinkers()
        .ordinals(is_mobj)
        .into_iter()
        .zip(1..)
        .collect();
    let ordinal_of = |id: Option<ThinkerId>| id.and_then(|id| ordinals.get(&id).copied()).unwrap_or(0);

    let mut written = 0;
    for (_, t) in level.thinkers().records() {
        if t.action.is_removed() {
            continue;
        }
        let Body::Mobj(m) = &t.body else {
            continue;
        };
        w.write_u8(TC_MOBJ)?;
        w.pad()?;
        write_mobj(w, m, ordinal_of(m.target), ordinal_of(m.tracer))?;
        written += 1;
    }
    w.write_u8(TC_END)?;
    log::debug!("archived {written} mobjs");
    Ok(written)
}

/// Free every current thinker, then rebuild the map objects from `r`.
///
/// Weak references come back empty; pass the returned list to
/// [`restore_targets`] once every record is loaded.
pub fn unarchive_thinkers<R: Read>(
    level: &mut Level,
    r: &mut SaveReader<R>,
) -> Result<Vec<PendingRefs>, SaveError> {
    level.clear_thinkers();
    let mut pending = Vec::new();
    loop {
        match r.read_u8()? {
            TC_END => break,
            TC_MOBJ => {
                r.skip_pad()?;
                let (m, target, tracer) = read_mobj(r)?;
                let id = level.spawn_thinker(Body::Mobj(m), Action::Think(think::mobj_thinker));
                pending.push(PendingRefs { id, target, tracer });
            }
            class => {
                return Err(SaveError::UnknownClass {
                    section: "thinker",
                    class,
                })
            }
        }
    }
    log::debug!("unarchived {} mobjs", pending.len());
    Ok(pending)
}

/// Resolve stored ordinals to live mobj ids.
///
/// An ordinal with no matching mobj resolves to `None`; such failures are
/// counted, logged, and returned.
pub fn restore_targets(level: &mut Level, pending: &[PendingRefs]) -> u32 {
    let mobjs = level.thinkers().ordinals(is_mobj);
    let mut total = 0;
    for p in pending {
        let mut resolve = |ordinal: u32| -> Option<ThinkerId> {
            if ordinal == 0 {
                return None;
            }
            total += 1;
            let found = mobjs.get(ordinal as usize - 1).copied();
            if found.is_none() {
                level.thinkers_mut().note_unresolved();
            }
            found
        };
        let target = resolve(p.target);
        let tracer = resolve(p.tracer);
        if let Some(Body::Mobj(m)) = level.body_mut(p.id) {
            m.target = target;
            m.tracer = tracer;
        }
    }
    let failed = level.thinkers_mut().take_unresolved();
    if failed > 0 {
        log::warn!("failed to restore {failed}/{total} target pointers");
    }
    failed
}
