//! Zone error types and the fatal escalation path.

use std::error::Error;
use std::fmt;

use rove_core::{OwnerSlot, PurgeTag, ZonePtr};

/// Structural heap faults detected by [`Zone::check`](crate::Zone::check).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeapFault {
    /// A block does not end where the next one begins.
    Gap,
    /// The last block does not end at the end of the region.
    Overrun,
    /// `next.prev` does not point back at the block.
    BackLink,
    /// Two adjacent blocks are both free.
    AdjacentFree,
    /// A header holds a size smaller than a header or an out-of-range link.
    BadHeader,
}

impl fmt::Display for HeapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gap => write!(f, "block size does not touch the next block"),
            Self::Overrun => write!(f, "last block does not end at the end of the zone"),
            Self::BackLink => write!(f, "next block doesn't have proper back link"),
            Self::AdjacentFree => write!(f, "two consecutive free blocks"),
            Self::BadHeader => write!(f, "corrupt block header"),
        }
    }
}

/// Contract violations reported by the zone.
///
/// Every variant is fatal at the [`MemoryResource`](crate::MemoryResource)
/// boundary; the `try_*` methods surface them for tooling and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZoneError {
    /// The pointer does not address the payload of an allocated block
    /// (never allocated, already freed, out of range or misaligned).
    InvalidPointer {
        /// The rejected payload offset.
        ptr: u32,
    },
    /// `PurgeTag::Free` was passed where an allocation tag is required.
    ReservedTag,
    /// A purgeable tag was requested without an owner slot.
    OwnerRequired {
        /// The purgeable tag.
        tag: PurgeTag,
    },
    /// The owner slot was never issued or has been released.
    UnknownOwner {
        /// The rejected slot.
        slot: OwnerSlot,
    },
    /// The owner slot is still bound to a live allocation.
    OwnerInUse {
        /// The bound slot.
        slot: OwnerSlot,
        /// The allocation it points at.
        ptr: ZonePtr,
    },
    /// No block large enough could be found, even after purging.
    OutOfMemory {
        /// Bytes requested by the caller (before alignment and header).
        requested: usize,
    },
    /// The block ring failed a consistency check.
    Inconsistent {
        /// Zone offset of the offending block header.
        offset: u32,
        /// What was wrong with it.
        fault: HeapFault,
    },
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPointer { ptr } => {
                write!(f, "freed a pointer without ZONEID: {ptr:#010x}")
            }
            Self::ReservedTag => write!(f, "the free tag cannot be assigned to an allocation"),
            Self::OwnerRequired { tag } => {
                write!(f, "an owner is required for purgeable blocks (tag {tag})")
            }
            Self::UnknownOwner { slot } => write!(f, "unknown owner slot {slot}"),
            Self::OwnerInUse { slot, ptr } => {
                write!(f, "owner slot {slot} is still bound to {ptr}")
            }
            Self::OutOfMemory { requested } => {
                write!(f, "failed on allocation of {requested} bytes")
            }
            Self::Inconsistent { offset, fault } => {
                write!(f, "zone check failed at block {offset:#010x}: {fault}")
            }
        }
    }
}

impl Error for ZoneError {}

/// Escalate a contract violation: log it and abort the simulation.
///
/// The zone has no recovery path once a caller breaks its contract, so the
/// boundary logs at `error` level and panics with the same message.
#[track_caller]
pub fn fatal(err: ZoneError) -> ! {
    log::error!("zone: {err}");
    panic!("zone: {err}")
}
