//! Strongly-typed identifiers for zone allocations and scheduled thinkers.

use std::fmt;
use std::num::NonZeroU32;

/// Payload address of a zone allocation.
///
/// Expressed as a byte offset into the zone region rather than a raw
/// pointer. The offset always lies past the sentinel header at the start of
/// the region, so it is never zero; persisted data uses `0` for "null".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZonePtr(NonZeroU32);

impl ZonePtr {
    /// Wrap a raw payload offset. Returns `None` for `0`.
    pub fn new(offset: u32) -> Option<Self> {
        NonZeroU32::new(offset).map(Self)
    }

    /// The payload offset within the zone region.
    pub fn offset(self) -> u32 {
        self.0.get()
    }

    /// Encode an optional pointer as a 32-bit word (`0` = none).
    pub fn to_raw(ptr: Option<ZonePtr>) -> u32 {
        ptr.map_or(0, ZonePtr::offset)
    }
}

impl fmt::Display for ZonePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// A zone-managed back-reference cell.
///
/// When an allocation is bound to an owner slot, the slot reads the
/// allocation's [`ZonePtr`]. Whenever the zone releases that block (free,
/// purge, tag-range free or clear) the slot is reset to empty, so holders
/// of purgeable memory can observe that their data went away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerSlot(pub u32);

impl fmt::Display for OwnerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

/// Generational handle to a record in the thinker scheduler.
///
/// The `index` addresses a slot in the scheduler's arena; the `generation`
/// is bumped every time the slot is recycled, so a handle held across a
/// reclamation (or a level reload) resolves to nothing instead of to an
/// unrelated record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThinkerId {
    index: u32,
    generation: u32,
}

impl ThinkerId {
    /// Build a handle from its parts.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at the time the handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ThinkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_offset_is_not_a_pointer() {
        assert!(ZonePtr::new(0).is_none());
        assert_eq!(ZonePtr::to_raw(None), 0);
    }

    #[test]
    fn raw_encoding_keeps_offset() {
        let p = ZonePtr::new(48).unwrap();
        assert_eq!(p.offset(), 48);
        assert_eq!(ZonePtr::to_raw(Some(p)), 48);
    }

    #[test]
    fn thinker_ids_differ_by_generation() {
        let a = ThinkerId::new(3, 0);
        let b = ThinkerId::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
        assert_eq!(b.to_string(), "3v1");
    }
}
