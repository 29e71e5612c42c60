//! Zone memory allocation for Rove simulations.
//!
//! A single fixed-size byte region services every dynamic allocation of the
//! simulation. Allocations carry a retention [`PurgeTag`](rove_core::PurgeTag)
//! instead of being individually tracked by their users: level-scoped data
//! is reclaimed in bulk with [`MemoryResource::free_tags`], and purgeable
//! cache data is reclaimed automatically whenever an allocation needs room.
//!
//! # Architecture
//!
//! ```text
//! MemoryResource (explicit context, fail-fast boundary)
//! ├── Zone
//! │   ├── region: Box<[u8]>      one contiguous allocation, never resized
//! │   │   ├── sentinel header    offset 0, anchors the block ring
//! │   │   └── Block ring         [header | payload] [header | payload] ...
//! │   ├── rover                  where the next allocation scan starts
//! │   └── owner slots            back-references nulled on free
//! └── Diagnostics
//!     ├── zero_on_free / scan_on_free
//!     └── Box<dyn ZoneObserver>  heap-operation hooks
//! ```
//!
//! # Invariants
//!
//! - Blocks are gapless: every block ends exactly where the next begins,
//!   and the last block ends at the end of the region.
//! - No two adjacent blocks are free; frees coalesce eagerly.
//! - `PurgeTag::Free` marks unallocated blocks and nothing else.
//!
//! Contract violations (double free, foreign pointer, purgeable allocation
//! without an owner, exhaustion, corruption) are fatal at the
//! [`MemoryResource`] boundary. The [`Zone`] itself reports them as
//! [`ZoneError`] values so tools and tests can inspect them.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod block;
pub mod config;
pub mod diag;
pub mod error;
pub mod resource;
pub mod zone;

// Public re-exports for the primary API surface.
pub use block::{BlockInfo, HEADER_SIZE, MEM_ALIGN, ZONE_ID};
pub use config::{ConfigError, ZoneConfig};
pub use diag::{DanglingRef, Diagnostics, NullObserver, ZoneObserver};
pub use error::{fatal, HeapFault, ZoneError};
pub use resource::MemoryResource;
pub use zone::Zone;
