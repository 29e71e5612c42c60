//! The zone: a fixed byte region carved into a ring of tagged blocks.
//!
//! Block headers live inside the region (see [`crate::block`]). The ring is
//! anchored by a sentinel header at offset 0 whose tag is `Static`, so the
//! allocation scan treats it like any other immovable block and never
//! merges into it.

use std::io;

use rove_core::{OwnerSlot, PurgeTag, ZonePtr};
use smallvec::SmallVec;

use crate::block::{
    align_up, payload_of, BlockHeader, BlockInfo, FIRST_BLOCK, HEADER_SIZE, MEM_ALIGN, SENTINEL,
    ZONE_ID,
};
use crate::config::{ConfigError, ZoneConfig};
use crate::diag::{DanglingRef, Diagnostics, ZoneObserver};
use crate::error::{HeapFault, ZoneError};

/// A registered owner cell.
#[derive(Clone, Copy, Debug)]
struct OwnerCell {
    live: bool,
    target: Option<ZonePtr>,
}

/// Tag-based zone allocator over a single fixed region.
///
/// All mutating operations take the [`Diagnostics`] to honour the debug
/// toggles and notify the observer. Errors are contract violations; see
/// [`MemoryResource`](crate::MemoryResource) for the fail-fast wrapper.
#[derive(Debug)]
pub struct Zone {
    region: Box<[u8]>,
    rover: u32,
    min_fragment: u32,
    owners: Vec<OwnerCell>,
    released_owners: Vec<u32>,
}

impl Zone {
    /// Build a zone over a freshly allocated region.
    ///
    /// The whole region (minus the sentinel header) starts as one free block.
    pub fn new(config: &ZoneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut zone = Self {
            region: vec![0u8; config.size].into_boxed_slice(),
            rover: FIRST_BLOCK,
            min_fragment: config.min_fragment,
            owners: Vec::new(),
            released_owners: Vec::new(),
        };
        zone.reset_ring();
        Ok(zone)
    }

    /// Total size of the region in bytes.
    pub fn zone_size(&self) -> usize {
        self.region.len()
    }

    fn region_end(&self) -> u32 {
        // Bounded by ZoneConfig::MAX_SIZE.
        self.region.len() as u32
    }

    fn reset_ring(&mut self) {
        let end = self.region_end();
        let sentinel = BlockHeader {
            size: FIRST_BLOCK,
            tag: PurgeTag::Static.to_raw(),
            owner: 0,
            id: ZONE_ID,
            next: FIRST_BLOCK,
            prev: FIRST_BLOCK,
        };
        sentinel.write(&mut self.region, SENTINEL);
        BlockHeader::free(end - FIRST_BLOCK, SENTINEL, SENTINEL).write(&mut self.region, FIRST_BLOCK);
        self.rover = FIRST_BLOCK;
    }

    fn header(&self, offset: u32) -> BlockHeader {
        BlockHeader::read(&self.region, offset)
    }

    fn store(&mut self, offset: u32, header: &BlockHeader) {
        header.write(&mut self.region, offset);
    }

    fn in_range(&self, offset: u32) -> bool {
        offset as usize + HEADER_SIZE <= self.region.len()
    }

    // ── Owner slots ────────────────────────────────────────────────

    /// Register a new owner slot. It reads `None` until bound.
    pub fn new_owner(&mut self) -> OwnerSlot {
        let cell = OwnerCell {
            live: true,
            target: None,
        };
        if let Some(index) = self.released_owners.pop() {
            self.owners[index as usize] = cell;
            return OwnerSlot(index);
        }
        self.owners.push(cell);
        OwnerSlot(self.owners.len() as u32 - 1)
    }

    /// The allocation a slot currently points at.
    pub fn owner_target(&self, slot: OwnerSlot) -> Result<Option<ZonePtr>, ZoneError> {
        self.owner_cell(slot).map(|cell| cell.target)
    }

    /// Return an unbound slot to the registry.
    pub fn release_owner(&mut self, slot: OwnerSlot) -> Result<(), ZoneError> {
        let cell = self.owner_cell(slot)?;
        if let Some(ptr) = cell.target {
            return Err(ZoneError::OwnerInUse { slot, ptr });
        }
        self.owners[slot.0 as usize].live = false;
        self.released_owners.push(slot.0);
        Ok(())
    }

    fn owner_cell(&self, slot: OwnerSlot) -> Result<OwnerCell, ZoneError> {
        match self.owners.get(slot.0 as usize) {
            Some(cell) if cell.live => Ok(*cell),
            _ => Err(ZoneError::UnknownOwner { slot }),
        }
    }

    /// Check that `slot` may be bound to `ptr` (or to a new allocation).
    fn check_bindable(&self, slot: OwnerSlot, ptr: Option<ZonePtr>) -> Result<(), ZoneError> {
        match self.owner_cell(slot)?.target {
            Some(bound) if Some(bound) != ptr => Err(ZoneError::OwnerInUse { slot, ptr: bound }),
            _ => Ok(()),
        }
    }

    fn set_owner_target(&mut self, slot: OwnerSlot, target: Option<ZonePtr>) {
        if let Some(cell) = self.owners.get_mut(slot.0 as usize) {
            cell.target = target;
        }
    }

    // ── Allocation ─────────────────────────────────────────────────

    /// Allocate `size` bytes tagged `tag`, optionally bound to `owner`.
    ///
    /// Purgeable blocks met during the scan are freed on the spot, whether
    /// or not the space they leave behind ends up being used.
    pub fn allocate(
        &mut self,
        size: usize,
        tag: PurgeTag,
        owner: Option<OwnerSlot>,
        diag: &mut Diagnostics,
    ) -> Result<ZonePtr, ZoneError> {
        if tag == PurgeTag::Free {
            return Err(ZoneError::ReservedTag);
        }
        if tag.is_purgeable() && owner.is_none() {
            return Err(ZoneError::OwnerRequired { tag });
        }
        if let Some(slot) = owner {
            self.check_bindable(slot, None)?;
        }
        let oom = ZoneError::OutOfMemory { requested: size };
        let needed = align_up(size)
            .and_then(|s| s.checked_add(HEADER_SIZE))
            .filter(|&s| s <= self.region.len())
            .ok_or_else(|| oom.clone())? as u32;

        let base = self.find_block(needed, diag).ok_or(oom)?;

        let mut header = self.header(base);
        let extra = header.size - needed;
        if extra > self.min_fragment {
            let fragment = base + needed;
            let next = header.next;
            self.store(fragment, &BlockHeader::free(extra, next, base));
            let mut after = self.header(next);
            after.prev = fragment;
            self.store(next, &after);
            header.next = fragment;
            header.size = needed;
            log::trace!("split {extra} free bytes off block {base:#x}");
        }
        header.tag = tag.to_raw();
        header.id = ZONE_ID;
        header.set_owner(owner);
        self.store(base, &header);

        let ptr = payload_of(base);
        if let Some(slot) = owner {
            self.set_owner_target(slot, Some(ptr));
        }
        self.rover = header.next;
        diag.observer.on_alloc(size, tag, owner, ptr);
        Ok(ptr)
    }

    /// Scan from the rover for a free block of at least `needed` bytes.
    fn find_block(&mut self, needed: u32, diag: &mut Diagnostics) -> Option<u32> {
        // Back up one block if the one behind the rover is free, so it can
        // merge with whatever the scan frees next.
        let behind = self.header(self.rover).prev;
        let mut base = if self.header(behind).is_free() {
            behind
        } else {
            self.rover
        };
        let mut rover = base;
        let start = self.header(base).prev;

        loop {
            if rover == start {
                return None;
            }
            let current = self.header(rover);
            if !current.is_free() {
                if current.is_purgeable() {
                    // Keep a handle on the block before `base`; freeing
                    // `rover` may merge `base` away.
                    let anchor = self.header(base).prev;
                    log::debug!(
                        "purging {} ({} bytes) for a {needed}-byte request",
                        payload_of(rover),
                        current.size
                    );
                    self.release(rover, diag);
                    base = self.header(anchor).next;
                    rover = self.header(base).next;
                } else {
                    base = current.next;
                    rover = base;
                }
            } else {
                rover = current.next;
            }

            let candidate = self.header(base);
            if candidate.is_free() && candidate.size >= needed {
                return Some(base);
            }
        }
    }

    // ── Release ────────────────────────────────────────────────────

    /// Free the allocation at `ptr`.
    pub fn free(&mut self, ptr: ZonePtr, diag: &mut Diagnostics) -> Result<(), ZoneError> {
        let block = self.block_of(ptr)?;
        self.release(block, diag);
        Ok(())
    }

    /// Free every allocated block whose tag lies in `[low, high]`.
    ///
    /// Returns the number of blocks freed.
    pub fn free_tags(&mut self, low: PurgeTag, high: PurgeTag, diag: &mut Diagnostics) -> usize {
        let mut freed = 0;
        let mut block = self.header(SENTINEL).next;
        while block != SENTINEL {
            let header = self.header(block);
            let in_range = !header.is_free()
                && header
                    .purge_tag()
                    .is_some_and(|tag| tag.is_between(low, high));
            block = if in_range {
                // The freed block may merge with its neighbours; continue
                // from whichever block survived.
                let survivor = self.release(block, diag);
                freed += 1;
                self.header(survivor).next
            } else {
                header.next
            };
        }
        log::debug!("freed {freed} blocks tagged {low}..={high}");
        freed
    }

    /// Release a validated block and coalesce. Returns the surviving block.
    fn release(&mut self, block: u32, diag: &mut Diagnostics) -> u32 {
        let mut header = self.header(block);
        let ptr = payload_of(block);
        if let Some(slot) = header.owner_slot() {
            self.set_owner_target(slot, None);
        }
        header.tag = PurgeTag::Free.to_raw();
        header.id = 0;
        header.set_owner(None);
        self.store(block, &header);

        if diag.zero_on_free {
            let start = (block + FIRST_BLOCK) as usize;
            let end = (block + header.size) as usize;
            self.region[start..end].fill(0);
        }
        if diag.scan_on_free {
            for report in self.scan_for_block(ptr, block + header.size) {
                diag.report_dangling(report);
            }
        }
        diag.observer.on_free(ptr);

        let mut survivor = block;
        let prev = header.prev;
        if self.header(prev).is_free() {
            self.merge(prev, block);
            if self.rover == block {
                self.rover = prev;
            }
            survivor = prev;
        }
        let next = self.header(survivor).next;
        if self.header(next).is_free() {
            self.merge(survivor, next);
            if self.rover == next {
                self.rover = survivor;
            }
        }
        survivor
    }

    /// Fold `gone` (immediately after `keep`) into `keep`.
    fn merge(&mut self, keep: u32, gone: u32) {
        let absorbed = self.header(gone);
        let mut kept = self.header(keep);
        kept.size += absorbed.size;
        kept.next = absorbed.next;
        self.store(keep, &kept);
        let mut after = self.header(absorbed.next);
        after.prev = keep;
        self.store(absorbed.next, &after);
    }

    /// Words in `Static`/`Level`/`LevSpec` payloads pointing into
    /// `[freed, end]`.
    fn scan_for_block(&self, freed: ZonePtr, end: u32) -> SmallVec<[DanglingRef; 4]> {
        let mut hits = SmallVec::new();
        let start = freed.offset();
        for info in self.blocks() {
            let scanned = matches!(
                info.tag,
                Some(PurgeTag::Static | PurgeTag::Level | PurgeTag::LevSpec)
            );
            let Some(holder) = info.payload().filter(|_| scanned && info.valid) else {
                continue;
            };
            let payload = holder.offset() as usize;
            let block_end = (info.offset + info.size) as usize;
            for (i, word) in self.region[payload..block_end].chunks_exact(4).enumerate() {
                let value = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
                if value >= start && value <= end {
                    hits.push(DanglingRef {
                        holder,
                        word_offset: (i * 4) as u32,
                        value,
                        freed,
                    });
                }
            }
        }
        hits
    }

    /// Reset to a single free block. Every owner slot reads `None`.
    pub fn clear(&mut self, diag: &mut Diagnostics) {
        self.reset_ring();
        for cell in &mut self.owners {
            cell.target = None;
        }
        diag.observer.on_init(self.region.len());
    }

    // ── Retagging ──────────────────────────────────────────────────

    /// Change the retention tag of an allocation.
    pub fn change_tag(
        &mut self,
        ptr: ZonePtr,
        tag: PurgeTag,
        diag: &mut Diagnostics,
    ) -> Result<(), ZoneError> {
        let block = self.block_of(ptr)?;
        if tag == PurgeTag::Free {
            return Err(ZoneError::ReservedTag);
        }
        let mut header = self.header(block);
        if tag.is_purgeable() && header.owner_slot().is_none() {
            return Err(ZoneError::OwnerRequired { tag });
        }
        header.tag = tag.to_raw();
        self.store(block, &header);
        diag.observer.on_change_tag(ptr, tag);
        Ok(())
    }

    /// Rebind an allocation to `slot`. The previous slot reads `None`.
    pub fn change_owner(
        &mut self,
        ptr: ZonePtr,
        slot: OwnerSlot,
        diag: &mut Diagnostics,
    ) -> Result<(), ZoneError> {
        let block = self.block_of(ptr)?;
        self.check_bindable(slot, Some(ptr))?;
        let mut header = self.header(block);
        if let Some(previous) = header.owner_slot().filter(|&p| p != slot) {
            self.set_owner_target(previous, None);
        }
        header.set_owner(Some(slot));
        self.store(block, &header);
        self.set_owner_target(slot, Some(ptr));
        diag.observer.on_change_owner(ptr, slot);
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Resolve a payload pointer to its block header offset.
    fn block_of(&self, ptr: ZonePtr) -> Result<u32, ZoneError> {
        let invalid = ZoneError::InvalidPointer { ptr: ptr.offset() };
        let offset = ptr.offset();
        if offset % MEM_ALIGN as u32 != 0 || offset < 2 * FIRST_BLOCK {
            return Err(invalid);
        }
        let block = offset - FIRST_BLOCK;
        if !self.in_range(block) {
            return Err(invalid);
        }
        let header = self.header(block);
        let fits = (block as usize + header.size as usize) <= self.region.len();
        if header.id != ZONE_ID || header.is_free() || header.purge_tag().is_none() || !fits {
            return Err(invalid);
        }
        if !self.in_range(header.prev) || self.header(header.prev).next != block {
            return Err(invalid);
        }
        Ok(block)
    }

    /// Descriptor of the allocation at `ptr`.
    pub fn block_info(&self, ptr: ZonePtr) -> Result<BlockInfo, ZoneError> {
        let block = self.block_of(ptr)?;
        Ok(BlockInfo::new(block, &self.header(block)))
    }

    /// Payload bytes of the allocation at `ptr`.
    pub fn payload(&self, ptr: ZonePtr) -> Result<&[u8], ZoneError> {
        let block = self.block_of(ptr)?;
        let end = block + self.header(block).size;
        Ok(&self.region[ptr.offset() as usize..end as usize])
    }

    /// Mutable payload bytes of the allocation at `ptr`.
    pub fn payload_mut(&mut self, ptr: ZonePtr) -> Result<&mut [u8], ZoneError> {
        let block = self.block_of(ptr)?;
        let end = block + self.header(block).size;
        Ok(&mut self.region[ptr.offset() as usize..end as usize])
    }

    /// Bytes that an allocation could claim: free blocks plus purgeable
    /// ones, headers included.
    pub fn total_free_bytes(&self) -> usize {
        self.blocks()
            .filter(|b| b.is_free() || b.tag.is_some_and(PurgeTag::is_purgeable))
            .map(|b| b.size as usize)
            .sum()
    }

    /// Iterate the blocks in zone order, excluding the sentinel.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            zone: self,
            cursor: self.header(SENTINEL).next,
        }
    }

    /// Verify the block ring.
    pub fn check(&self) -> Result<(), ZoneError> {
        let end = self.region_end();
        let mut block = self.header(SENTINEL).next;
        loop {
            if !self.in_range(block) {
                return Err(inconsistent(block, HeapFault::BadHeader));
            }
            let header = self.header(block);
            if (header.size as usize) < HEADER_SIZE {
                return Err(inconsistent(block, HeapFault::BadHeader));
            }
            if header.next == SENTINEL {
                if block as u64 + header.size as u64 != end as u64 {
                    return Err(inconsistent(block, HeapFault::Overrun));
                }
                if self.header(SENTINEL).prev != block {
                    return Err(inconsistent(SENTINEL, HeapFault::BackLink));
                }
                return Ok(());
            }
            if block as u64 + header.size as u64 != header.next as u64 {
                return Err(inconsistent(block, HeapFault::Gap));
            }
            if !self.in_range(header.next) {
                return Err(inconsistent(block, HeapFault::BadHeader));
            }
            let next = self.header(header.next);
            if next.prev != block {
                return Err(inconsistent(block, HeapFault::BackLink));
            }
            if header.is_free() && next.is_free() {
                return Err(inconsistent(block, HeapFault::AdjacentFree));
            }
            block = header.next;
        }
    }

    /// Write one line per block whose tag lies in `[low, high]`, with
    /// consistency errors inline.
    pub fn dump(
        &self,
        low: PurgeTag,
        high: PurgeTag,
        out: &mut dyn io::Write,
        observer: &mut dyn ZoneObserver,
    ) -> io::Result<()> {
        writeln!(out, "zone size: {}  rover: {:#010x}", self.region.len(), self.rover)?;
        writeln!(out, "tag range: {low} to {high}")?;
        let mut block = self.header(SENTINEL).next;
        while self.in_range(block) {
            let header = self.header(block);
            let info = BlockInfo::new(block, &header);
            if info.tag.is_some_and(|tag| tag.is_between(low, high)) {
                let owner = info
                    .owner
                    .map_or_else(|| "-".to_string(), |slot| slot.to_string());
                let tag = info.tag.map_or_else(|| "?".to_string(), |t| t.to_string());
                writeln!(
                    out,
                    "block:{block:#010x}    size:{:7}    owner:{owner:>9}    tag:{tag}",
                    header.size
                )?;
                observer.on_block(&info);
            }
            if header.next == SENTINEL {
                break;
            }
            if block as u64 + header.size as u64 != header.next as u64 {
                writeln!(out, "ERROR: {}", HeapFault::Gap)?;
            }
            if !self.in_range(header.next) || header.next <= block {
                writeln!(out, "ERROR: {}", HeapFault::BadHeader)?;
                break;
            }
            let next = self.header(header.next);
            if next.prev != block {
                writeln!(out, "ERROR: {}", HeapFault::BackLink)?;
            }
            if header.is_free() && next.is_free() {
                writeln!(out, "ERROR: {}", HeapFault::AdjacentFree)?;
            }
            block = header.next;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn rover(&self) -> u32 {
        self.rover
    }

    #[cfg(test)]
    pub(crate) fn region_mut(&mut self) -> &mut [u8] {
        &mut self.region
    }
}

fn inconsistent(offset: u32, fault: HeapFault) -> ZoneError {
    ZoneError::Inconsistent { offset, fault }
}

/// Iterator over the blocks of a [`Zone`] in address order.
#[derive(Debug)]
pub struct Blocks<'a> {
    zone: &'a Zone,
    cursor: u32,
}

impl Iterator for Blocks<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        if self.cursor == SENTINEL || !self.zone.in_range(self.cursor) {
            return None;
        }
        let header = self.zone.header(self.cursor);
        let info = BlockInfo::new(self.cursor, &header);
        // Links only ever move forward until the ring closes.
        self.cursor = if header.next > self.cursor {
            header.next
        } else {
            SENTINEL
        };
        Some(info)
    }
}
