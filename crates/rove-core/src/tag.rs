//! Retention tags for zone allocations.

use std::fmt;

/// Retention (purge) class of a zone allocation.
///
/// Tags are ordered. Everything at or above [`PurgeTag::PurgeLevel`] may be
/// reclaimed by the allocator without the owner's consent, which is why
/// such allocations must be bound to an [`OwnerSlot`](crate::OwnerSlot).
/// [`PurgeTag::Free`] is reserved for blocks that are currently unallocated.
///
/// Bulk reclamation uses inclusive ranges over this ordering, e.g. a level
/// transition frees `Level..=LevSpec`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum PurgeTag {
    /// Lives for the whole process.
    Static = 1,
    /// Sound effect data.
    Sound = 2,
    /// Music data.
    Music = 3,
    /// Unallocated block. Never valid for an allocation.
    Free = 4,
    /// Bound to the current level.
    Level = 5,
    /// Level-scoped special effect records (thinkers).
    LevSpec = 6,
    /// First purgeable tag: reclaimable whenever space is needed.
    PurgeLevel = 7,
    /// Cached data, reclaimable whenever space is needed.
    Cache = 8,
}

impl PurgeTag {
    /// Every tag, lowest first.
    pub const ALL: [PurgeTag; 8] = [
        PurgeTag::Static,
        PurgeTag::Sound,
        PurgeTag::Music,
        PurgeTag::Free,
        PurgeTag::Level,
        PurgeTag::LevSpec,
        PurgeTag::PurgeLevel,
        PurgeTag::Cache,
    ];

    /// Lowest tag value.
    pub const MIN: PurgeTag = PurgeTag::Static;

    /// Highest tag value.
    pub const MAX: PurgeTag = PurgeTag::Cache;

    /// Whether the allocator may reclaim blocks with this tag on its own.
    pub fn is_purgeable(self) -> bool {
        self >= PurgeTag::PurgeLevel
    }

    /// Whether `self` lies in the inclusive range `[low, high]`.
    pub fn is_between(self, low: PurgeTag, high: PurgeTag) -> bool {
        self >= low && self <= high
    }

    /// Raw 32-bit value as stored in a block header.
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    /// Decode a raw header value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.to_raw() == raw)
    }

    /// The tag immediately below this one, if any.
    pub fn prev(self) -> Option<Self> {
        Self::from_raw(self.to_raw().checked_sub(1)?)
    }
}

impl fmt::Display for PurgeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Static => "static",
            Self::Sound => "sound",
            Self::Music => "music",
            Self::Free => "free",
            Self::Level => "level",
            Self::LevSpec => "levspec",
            Self::PurgeLevel => "purgelevel",
            Self::Cache => "cache",
        };
        f.write_str(name)
    }
}
