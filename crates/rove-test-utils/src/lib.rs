//! Test utilities for Rove development.
//!
//! Provides a recording [`ZoneObserver`] ([`HeapRecorder`]), one-line log
//! setup for tests ([`init_logging`]) and a small reference map in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use rove_core::{OwnerSlot, PurgeTag, ZonePtr};
use rove_zone::{DanglingRef, ZoneObserver};

/// Route `log` output through the test harness.
///
/// Safe to call from every test; only the first call installs the logger.
/// Honours `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One observed heap operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeapEvent {
    Init { size: usize },
    Alloc { requested: usize, tag: PurgeTag, owner: Option<OwnerSlot>, ptr: ZonePtr },
    Free { ptr: ZonePtr },
    ChangeTag { ptr: ZonePtr, tag: PurgeTag },
    ChangeOwner { ptr: ZonePtr, owner: OwnerSlot },
    Dangling(DanglingRef),
}

/// Observer that appends every heap operation to a shared log.
///
/// Clone the recorder before handing it to the zone; the clone you keep
/// sees the same events.
///
/// ```ignore
/// let rec = HeapRecorder::new();
/// mem.set_observer(Box::new(rec.clone()));
/// // ...
/// assert_eq!(rec.frees(), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct HeapRecorder {
    events: Rc<RefCell<Vec<HeapEvent>>>,
}

impl HeapRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything recorded so far.
    pub fn events(&self) -> Vec<HeapEvent> {
        self.events.borrow().clone()
    }

    /// Drop everything recorded so far.
    pub fn reset(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn allocs(&self) -> usize {
        self.count(|e| matches!(e, HeapEvent::Alloc { .. }))
    }

    pub fn frees(&self) -> usize {
        self.count(|e| matches!(e, HeapEvent::Free { .. }))
    }

    pub fn dangling(&self) -> Vec<DanglingRef> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                HeapEvent::Dangling(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Allocations granted under `tag`.
    pub fn allocs_tagged(&self, tag: PurgeTag) -> usize {
        self.count(|e| matches!(e, HeapEvent::Alloc { tag: t, .. } if *t == tag))
    }

    fn count(&self, pred: impl Fn(&HeapEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: HeapEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl ZoneObserver for HeapRecorder {
    fn on_init(&mut self, size: usize) {
        self.push(HeapEvent::Init { size });
    }

    fn on_alloc(&mut self, requested: usize, tag: PurgeTag, owner: Option<OwnerSlot>, ptr: ZonePtr) {
        self.push(HeapEvent::Alloc {
            requested,
            tag,
            owner,
            ptr,
        });
    }

    fn on_free(&mut self, ptr: ZonePtr) {
        self.push(HeapEvent::Free { ptr });
    }

    fn on_change_tag(&mut self, ptr: ZonePtr, tag: PurgeTag) {
        self.push(HeapEvent::ChangeTag { ptr, tag });
    }

    fn on_change_owner(&mut self, ptr: ZonePtr, owner: OwnerSlot) {
        self.push(HeapEvent::ChangeOwner { ptr, owner });
    }

    fn on_dangling(&mut self, report: &DanglingRef) {
        self.push(HeapEvent::Dangling(*report));
    }
}
