//! Thinker scheduling for Rove simulations.
//!
//! A *thinker* is a live actor record: a dispatch value ([`Action`]), the
//! zone block that accounts for its memory, and a host-defined body. The
//! [`ThinkerList`] keeps every record in insertion order and runs them once
//! per tick.
//!
//! Removal is lazy. [`ThinkerList::remove`] only marks a record; the record
//! stays linked (and is skipped) until the compaction at the start of the
//! next [`ThinkerList::run`], which unlinks it, frees its zone block and
//! recycles its arena slot under a new generation. Weak references between
//! records are [`ThinkerId`](rove_core::ThinkerId)s and therefore resolve
//! to nothing once their target has been reclaimed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod host;
pub mod list;
pub mod metrics;

pub use action::Action;
pub use host::ThinkerHost;
pub use list::{Thinker, ThinkerList};
pub use metrics::TickStats;
