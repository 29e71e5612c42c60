//! Diagnostic hooks and debug toggles for zone operations.

use rove_core::{OwnerSlot, PurgeTag, ZonePtr};

use crate::block::BlockInfo;

/// A word in a surviving block that still points into a freed extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DanglingRef {
    /// Payload of the block holding the stale word.
    pub holder: ZonePtr,
    /// Byte offset of the word within the holder's payload.
    pub word_offset: u32,
    /// The stale value (a zone offset inside the freed extent).
    pub value: u32,
    /// Payload of the block that was just freed.
    pub freed: ZonePtr,
}

/// Observer of heap operations.
///
/// Every method has an empty default, so implementors override only what
/// they need. Observers are notified after the operation has been applied.
pub trait ZoneObserver {
    /// The zone was (re)initialised over `size` bytes.
    fn on_init(&mut self, _size: usize) {}

    /// `requested` bytes were granted at `ptr`.
    fn on_alloc(
        &mut self,
        _requested: usize,
        _tag: PurgeTag,
        _owner: Option<OwnerSlot>,
        _ptr: ZonePtr,
    ) {
    }

    /// The block at `ptr` was released (explicitly, by purge or by range).
    fn on_free(&mut self, _ptr: ZonePtr) {}

    /// The block at `ptr` was retagged.
    fn on_change_tag(&mut self, _ptr: ZonePtr, _tag: PurgeTag) {}

    /// The block at `ptr` was rebound to `owner`.
    fn on_change_owner(&mut self, _ptr: ZonePtr, _owner: OwnerSlot) {}

    /// A block was listed by a heap dump.
    fn on_block(&mut self, _info: &BlockInfo) {}

    /// The free-time scan found a stale reference.
    fn on_dangling(&mut self, _report: &DanglingRef) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl ZoneObserver for NullObserver {}

/// Debug toggles plus the installed observer, threaded through every
/// mutating zone operation.
pub struct Diagnostics {
    /// Zero freed payloads.
    pub zero_on_free: bool,
    /// Scan `Static`, `Level` and `LevSpec` blocks for dangling words on free.
    pub scan_on_free: bool,
    /// Installed observer.
    pub observer: Box<dyn ZoneObserver>,
    dangling: u64,
}

impl Diagnostics {
    /// Toggles off, no observer.
    pub fn new() -> Self {
        Self {
            zero_on_free: false,
            scan_on_free: false,
            observer: Box::new(NullObserver),
            dangling: 0,
        }
    }

    /// Total dangling references reported since construction.
    pub fn dangling_reports(&self) -> u64 {
        self.dangling
    }

    pub(crate) fn report_dangling(&mut self, report: DanglingRef) {
        self.dangling += 1;
        log::warn!(
            "dangling reference: {} +{} holds {:#010x} into freed block {}",
            report.holder,
            report.word_offset,
            report.value,
            report.freed
        );
        self.observer.on_dangling(&report);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("zero_on_free", &self.zero_on_free)
            .field("scan_on_free", &self.scan_on_free)
            .field("dangling", &self.dangling)
            .finish_non_exhaustive()
    }
}
