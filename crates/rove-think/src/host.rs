//! The context a [`ThinkerList`] runs against.

use rove_core::ThinkerId;
use rove_zone::MemoryResource;

use crate::list::ThinkerList;

/// A simulation context that owns a thinker list and the zone backing it.
///
/// Callbacks receive `&mut Self`, so they can reach the list (to remove
/// themselves, spawn, or look up other records), the zone, and whatever
/// world state the host keeps alongside.
pub trait ThinkerHost: Sized {
    /// Per-record payload, opaque to the scheduler.
    type Body;

    /// Input bundle handed to [`Action::Input`](crate::Action::Input)
    /// callbacks.
    type Input: Copy;

    /// The scheduler.
    fn thinkers(&self) -> &ThinkerList<Self>;

    /// The scheduler, mutably.
    fn thinkers_mut(&mut self) -> &mut ThinkerList<Self>;

    /// The scheduler and the zone at once, for reclamation.
    fn split_mut(&mut self) -> (&mut ThinkerList<Self>, &mut MemoryResource);

    /// The input bundle for `id`, if it has one this tick.
    fn input_for(&self, _id: ThinkerId) -> Option<Self::Input> {
        None
    }
}
