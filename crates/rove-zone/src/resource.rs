//! The allocator boundary handed to simulation code.

use std::io;

use rove_core::{OwnerSlot, PurgeTag, ZonePtr};

use crate::block::BlockInfo;
use crate::config::{ConfigError, ZoneConfig};
use crate::diag::{Diagnostics, NullObserver, ZoneObserver};
use crate::error::{fatal, ZoneError};
use crate::zone::{Blocks, Zone};

/// Explicit handle to the simulation's zone.
///
/// Owns the [`Zone`] together with its [`Diagnostics`]. The plain methods
/// treat every [`ZoneError`] as fatal (see [`fatal`]); the `try_*` methods
/// return it instead.
#[derive(Debug)]
pub struct MemoryResource {
    zone: Zone,
    diag: Diagnostics,
}

impl MemoryResource {
    /// Build the zone described by `config`.
    pub fn init(config: &ZoneConfig) -> Result<Self, ConfigError> {
        let zone = Zone::new(config)?;
        let mut diag = Diagnostics::new();
        diag.zero_on_free = config.zero_on_free;
        diag.scan_on_free = config.scan_on_free;
        log::debug!(
            "zone initialised: {} bytes (zero_on_free={}, scan_on_free={})",
            config.size,
            config.zero_on_free,
            config.scan_on_free
        );
        Ok(Self { zone, diag })
    }

    /// Install an observer, replacing the previous one.
    pub fn set_observer(&mut self, observer: Box<dyn ZoneObserver>) {
        self.diag.observer = observer;
        self.diag.observer.on_init(self.zone.zone_size());
    }

    /// Builder-style [`set_observer`](Self::set_observer).
    pub fn with_observer(mut self, observer: Box<dyn ZoneObserver>) -> Self {
        self.set_observer(observer);
        self
    }

    /// Read access to the underlying zone.
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Debug toggles and dangling-reference counters.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    /// Mutable debug toggles.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diag
    }

    // ── Allocation ─────────────────────────────────────────────────

    /// Allocate `size` bytes. Fatal on any contract violation or exhaustion.
    #[track_caller]
    pub fn allocate(&mut self, size: usize, tag: PurgeTag, owner: Option<OwnerSlot>) -> ZonePtr {
        self.try_allocate(size, tag, owner)
            .unwrap_or_else(|err| fatal(err))
    }

    /// Fallible [`allocate`](Self::allocate).
    pub fn try_allocate(
        &mut self,
        size: usize,
        tag: PurgeTag,
        owner: Option<OwnerSlot>,
    ) -> Result<ZonePtr, ZoneError> {
        self.zone.allocate(size, tag, owner, &mut self.diag)
    }

    /// Free an allocation. Fatal if `ptr` is not a live allocation.
    #[track_caller]
    pub fn free(&mut self, ptr: ZonePtr) {
        if let Err(err) = self.try_free(ptr) {
            if log::log_enabled!(log::Level::Debug) {
                let mut heap = Vec::new();
                if self
                    .zone
                    .dump(PurgeTag::MIN, PurgeTag::MAX, &mut heap, &mut NullObserver)
                    .is_ok()
                {
                    log::debug!("heap at failed free:\n{}", String::from_utf8_lossy(&heap));
                }
            }
            fatal(err);
        }
    }

    /// Fallible [`free`](Self::free).
    pub fn try_free(&mut self, ptr: ZonePtr) -> Result<(), ZoneError> {
        self.zone.free(ptr, &mut self.diag)
    }

    /// Free every allocation tagged within `[low, high]`.
    pub fn free_tags(&mut self, low: PurgeTag, high: PurgeTag) -> usize {
        self.zone.free_tags(low, high, &mut self.diag)
    }

    /// Reset the whole zone to a single free block.
    pub fn clear(&mut self) {
        self.zone.clear(&mut self.diag);
    }

    // ── Retagging ──────────────────────────────────────────────────

    /// Change an allocation's tag. Fatal on contract violations.
    #[track_caller]
    pub fn change_tag(&mut self, ptr: ZonePtr, tag: PurgeTag) {
        if let Err(err) = self.try_change_tag(ptr, tag) {
            fatal(err);
        }
    }

    /// Fallible [`change_tag`](Self::change_tag).
    pub fn try_change_tag(&mut self, ptr: ZonePtr, tag: PurgeTag) -> Result<(), ZoneError> {
        self.zone.change_tag(ptr, tag, &mut self.diag)
    }

    /// Rebind an allocation to a new owner slot. Fatal on contract violations.
    #[track_caller]
    pub fn change_owner(&mut self, ptr: ZonePtr, slot: OwnerSlot) {
        if let Err(err) = self.try_change_owner(ptr, slot) {
            fatal(err);
        }
    }

    /// Fallible [`change_owner`](Self::change_owner).
    pub fn try_change_owner(&mut self, ptr: ZonePtr, slot: OwnerSlot) -> Result<(), ZoneError> {
        self.zone.change_owner(ptr, slot, &mut self.diag)
    }

    // ── Owner slots ────────────────────────────────────────────────

    /// Register a fresh owner slot.
    pub fn new_owner(&mut self) -> OwnerSlot {
        self.zone.new_owner()
    }

    /// Current target of an owner slot. Fatal for unknown slots.
    #[track_caller]
    pub fn owner_target(&self, slot: OwnerSlot) -> Option<ZonePtr> {
        self.zone
            .owner_target(slot)
            .unwrap_or_else(|err| fatal(err))
    }

    /// Return an unbound owner slot. Fatal if it is still bound.
    #[track_caller]
    pub fn release_owner(&mut self, slot: OwnerSlot) {
        if let Err(err) = self.zone.release_owner(slot) {
            fatal(err);
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Free plus purgeable bytes, headers included.
    pub fn total_free_bytes(&self) -> usize {
        self.zone.total_free_bytes()
    }

    /// Total region size.
    pub fn zone_size(&self) -> usize {
        self.zone.zone_size()
    }

    /// Payload of a live allocation. Fatal for invalid pointers.
    #[track_caller]
    pub fn payload(&self, ptr: ZonePtr) -> &[u8] {
        self.zone.payload(ptr).unwrap_or_else(|err| fatal(err))
    }

    /// Mutable payload of a live allocation. Fatal for invalid pointers.
    #[track_caller]
    pub fn payload_mut(&mut self, ptr: ZonePtr) -> &mut [u8] {
        self.zone.payload_mut(ptr).unwrap_or_else(|err| fatal(err))
    }

    /// Descriptor of a live allocation, if `ptr` is one.
    pub fn block_info(&self, ptr: ZonePtr) -> Option<BlockInfo> {
        self.zone.block_info(ptr).ok()
    }

    /// Iterate blocks in address order.
    pub fn blocks(&self) -> Blocks<'_> {
        self.zone.blocks()
    }

    /// Verify the heap. Fatal on the first inconsistency.
    #[track_caller]
    pub fn check(&self) {
        if let Err(err) = self.try_check() {
            fatal(err);
        }
    }

    /// Fallible [`check`](Self::check).
    pub fn try_check(&self) -> Result<(), ZoneError> {
        self.zone.check()
    }

    /// Print every block tagged within `[low, high]` to `out`, notifying
    /// the installed observer of each one.
    pub fn dump(&mut self, low: PurgeTag, high: PurgeTag, out: &mut dyn io::Write) -> io::Result<()> {
        self.zone.dump(low, high, out, self.diag.observer.as_mut())
    }
}
