//! Core types for the Rove simulation core.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the zone allocator, the thinker scheduler and the
//! persistence layer: retention tags, zone pointers, owner slots, thinker
//! handles and tick counters.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod tag;

pub use id::{OwnerSlot, ThinkerId, TickId, ZonePtr};
pub use tag::PurgeTag;
