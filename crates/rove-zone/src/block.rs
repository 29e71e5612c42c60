//! Block headers stored inline in the zone bytes.
//!
//! Every block (allocated or free) starts with a [`BlockHeader`] written
//! directly into the region. Headers are plain-old-data and are read and
//! written unaligned through `bytemuck`, so the region stays a plain
//! `Box<[u8]>`.

use bytemuck::{Pod, Zeroable};
use rove_core::{OwnerSlot, PurgeTag, ZonePtr};

/// Validity marker stamped into the header of every allocated block.
pub const ZONE_ID: u32 = 0x1d4a11;

/// Size of a block header in bytes.
pub const HEADER_SIZE: usize = std::mem::size_of::<BlockHeader>();

/// Alignment of every block start and every payload.
pub const MEM_ALIGN: usize = 8;

/// Default minimum tail worth splitting off as a separate free block.
pub const MIN_FRAGMENT: u32 = 64;

/// Offset of the sentinel header that anchors the block ring.
pub(crate) const SENTINEL: u32 = 0;

/// Offset of the first real block.
pub(crate) const FIRST_BLOCK: u32 = HEADER_SIZE as u32;

/// On-region header layout. All offsets are zone offsets of other headers.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub(crate) struct BlockHeader {
    /// Total block size including this header.
    pub size: u32,
    /// Raw [`PurgeTag`] value.
    pub tag: u32,
    /// Owner slot index plus one; zero means no owner.
    pub owner: u32,
    /// [`ZONE_ID`] while allocated, zero once freed.
    pub id: u32,
    pub next: u32,
    pub prev: u32,
}

const _: () = assert!(HEADER_SIZE == 24);
const _: () = assert!(HEADER_SIZE % MEM_ALIGN == 0);

impl BlockHeader {
    /// A free block spanning `size` bytes.
    pub fn free(size: u32, next: u32, prev: u32) -> Self {
        Self {
            size,
            tag: PurgeTag::Free.to_raw(),
            owner: 0,
            id: 0,
            next,
            prev,
        }
    }

    pub fn read(region: &[u8], offset: u32) -> Self {
        let start = offset as usize;
        bytemuck::pod_read_unaligned(&region[start..start + HEADER_SIZE])
    }

    pub fn write(&self, region: &mut [u8], offset: u32) {
        let start = offset as usize;
        region[start..start + HEADER_SIZE].copy_from_slice(bytemuck::bytes_of(self));
    }

    pub fn is_free(&self) -> bool {
        self.tag == PurgeTag::Free.to_raw()
    }

    pub fn is_purgeable(&self) -> bool {
        PurgeTag::from_raw(self.tag).is_some_and(PurgeTag::is_purgeable)
    }

    pub fn purge_tag(&self) -> Option<PurgeTag> {
        PurgeTag::from_raw(self.tag)
    }

    pub fn owner_slot(&self) -> Option<OwnerSlot> {
        self.owner.checked_sub(1).map(OwnerSlot)
    }

    pub fn set_owner(&mut self, owner: Option<OwnerSlot>) {
        self.owner = owner.map_or(0, |slot| slot.0 + 1);
    }
}

/// Zone offset of the payload belonging to the block at `block`.
pub(crate) fn payload_of(block: u32) -> ZonePtr {
    // Blocks never start at offset 0, so the payload offset is non-zero.
    ZonePtr::new(block + FIRST_BLOCK).unwrap_or_else(|| unreachable!("payload offset is zero"))
}

/// Round `size` up to [`MEM_ALIGN`], returning `None` on overflow.
pub(crate) fn align_up(size: usize) -> Option<usize> {
    size.checked_add(MEM_ALIGN - 1).map(|s| s & !(MEM_ALIGN - 1))
}

/// Read-only description of one block, yielded by
/// [`Zone::blocks`](crate::Zone::blocks) and passed to observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Zone offset of the block header.
    pub offset: u32,
    /// Total size including the header.
    pub size: u32,
    /// Retention tag, or `None` if the header holds an unknown tag value.
    pub tag: Option<PurgeTag>,
    /// Bound owner slot, if any.
    pub owner: Option<OwnerSlot>,
    /// Whether the header carries [`ZONE_ID`].
    pub valid: bool,
}

impl BlockInfo {
    pub(crate) fn new(offset: u32, header: &BlockHeader) -> Self {
        Self {
            offset,
            size: header.size,
            tag: header.purge_tag(),
            owner: header.owner_slot(),
            valid: header.id == ZONE_ID,
        }
    }

    /// Whether this block is unallocated.
    pub fn is_free(&self) -> bool {
        self.tag == Some(PurgeTag::Free)
    }

    /// Payload pointer of an allocated block.
    pub fn payload(&self) -> Option<ZonePtr> {
        (!self.is_free()).then(|| payload_of(self.offset))
    }

    /// Usable payload bytes.
    pub fn content_size(&self) -> usize {
        (self.size as usize).saturating_sub(HEADER_SIZE)
    }
}
