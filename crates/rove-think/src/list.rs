//! The thinker list: a generational arena linked in insertion order.
//!
//! Slots are recycled through a vacant list; every recycle bumps the slot
//! generation so stale [`ThinkerId`]s stop resolving. Records are linked
//! `head → … → tail` through slot indices, which gives stable iteration
//! order independent of slot reuse.

use std::fmt;

use rove_core::{PurgeTag, ThinkerId, ZonePtr};
use rove_zone::MemoryResource;

use crate::action::Action;
use crate::host::ThinkerHost;
use crate::metrics::TickStats;

/// One live actor record.
pub struct Thinker<H: ThinkerHost> {
    /// What the scheduler calls for this record.
    pub action: Action<H>,
    /// Host-defined payload.
    pub body: H::Body,
    block: ZonePtr,
}

impl<H: ThinkerHost> Thinker<H> {
    /// A record backed by the zone allocation `block`.
    pub fn new(block: ZonePtr, body: H::Body, action: Action<H>) -> Self {
        Self {
            action,
            body,
            block,
        }
    }

    /// The zone allocation accounting for this record.
    pub fn block(&self) -> ZonePtr {
        self.block
    }
}

impl<H: ThinkerHost> fmt::Debug for Thinker<H>
where
    H::Body: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thinker")
            .field("action", &self.action)
            .field("block", &self.block)
            .field("body", &self.body)
            .finish()
    }
}

struct Link<H: ThinkerHost> {
    thinker: Thinker<H>,
    prev: Option<u32>,
    next: Option<u32>,
}

struct Slot<H: ThinkerHost> {
    generation: u32,
    link: Option<Link<H>>,
}

/// Insertion-ordered scheduler of [`Thinker`] records.
pub struct ThinkerList<H: ThinkerHost> {
    slots: Vec<Slot<H>>,
    vacant: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
    unresolved: u32,
    // Reused snapshot buffer for `run`.
    order: Vec<ThinkerId>,
}

impl<H: ThinkerHost> ThinkerList<H> {
    /// An empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            unresolved: 0,
            order: Vec::new(),
        }
    }

    /// Linked records, including those pending removal.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no records are linked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records marked for removal but not yet reclaimed.
    pub fn pending_removal(&self) -> usize {
        self.records().filter(|(_, t)| t.action.is_removed()).count()
    }

    // ── Insertion ──────────────────────────────────────────────────

    /// Append a record at the tail.
    pub fn push_back(&mut self, thinker: Thinker<H>) -> ThinkerId {
        let index = match self.vacant.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    link: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let prev = self.tail;
        let slot = &mut self.slots[index as usize];
        slot.link = Some(Link {
            thinker,
            prev,
            next: None,
        });
        let id = ThinkerId::new(index, slot.generation);
        match prev.and_then(|tail| self.link_mut(tail)) {
            Some(tail) => tail.next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        id
    }

    /// Allocate a zone block of `size` bytes tagged `tag` and append a
    /// record backed by it.
    #[track_caller]
    pub fn spawn(
        &mut self,
        mem: &mut MemoryResource,
        tag: PurgeTag,
        size: usize,
        body: H::Body,
        action: Action<H>,
    ) -> ThinkerId {
        let block = mem.allocate(size, tag, None);
        self.push_back(Thinker::new(block, body, action))
    }

    // ── Lookup ─────────────────────────────────────────────────────

    fn link(&self, index: u32) -> Option<&Link<H>> {
        self.slots.get(index as usize)?.link.as_ref()
    }

    fn link_mut(&mut self, index: u32) -> Option<&mut Link<H>> {
        self.slots.get_mut(index as usize)?.link.as_mut()
    }

    fn resolve(&self, id: ThinkerId) -> Option<&Link<H>> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.link.as_ref()
    }

    fn resolve_mut(&mut self, id: ThinkerId) -> Option<&mut Link<H>> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.link.as_mut()
    }

    /// Whether `id` names a linked record.
    pub fn contains(&self, id: ThinkerId) -> bool {
        self.resolve(id).is_some()
    }

    /// The record named by `id`.
    pub fn get(&self, id: ThinkerId) -> Option<&Thinker<H>> {
        self.resolve(id).map(|link| &link.thinker)
    }

    /// The record named by `id`, mutably.
    pub fn get_mut(&mut self, id: ThinkerId) -> Option<&mut Thinker<H>> {
        self.resolve_mut(id).map(|link| &mut link.thinker)
    }

    /// The dispatch value of `id`.
    pub fn action(&self, id: ThinkerId) -> Option<Action<H>> {
        self.get(id).map(|t| t.action)
    }

    /// Replace the dispatch value of a live record.
    ///
    /// Records already marked for removal cannot be revived. Setting
    /// `Removed` is the same as [`remove`](Self::remove).
    pub fn set_action(&mut self, id: ThinkerId, action: Action<H>) -> bool {
        if action.is_removed() {
            return self.remove(id);
        }
        match self.get_mut(id) {
            Some(t) if !t.action.is_removed() => {
                t.action = action;
                true
            }
            _ => false,
        }
    }

    /// Mark a record for removal. It stays linked, and is skipped, until
    /// the next compaction.
    pub fn remove(&mut self, id: ThinkerId) -> bool {
        let Some(t) = self.get_mut(id) else {
            return false;
        };
        if t.action.is_removed() {
            return false;
        }
        t.action.mark_removed();
        log::trace!("thinker {id} marked for removal");
        true
    }

    /// Ids in list order.
    pub fn iter(&self) -> Ids<'_, H> {
        Ids {
            list: self,
            cursor: self.head,
        }
    }

    /// `(id, record)` pairs in list order.
    pub fn records(&self) -> impl Iterator<Item = (ThinkerId, &Thinker<H>)> + '_ {
        self.iter()
            .filter_map(move |id| self.get(id).map(|t| (id, t)))
    }

    // ── Ordinals ───────────────────────────────────────────────────

    /// 1-based position of `id` among live records matching `kind`;
    /// `0` for `None`, for records that do not match, and for stale ids.
    ///
    /// Records pending removal are not counted.
    pub fn index_of(&self, id: Option<ThinkerId>, kind: impl Fn(&Thinker<H>) -> bool) -> u32 {
        let Some(id) = id else {
            return 0;
        };
        let mut ordinal = 0;
        for (candidate, t) in self.records() {
            if t.action.is_removed() || !kind(t) {
                continue;
            }
            ordinal += 1;
            if candidate == id {
                return ordinal;
            }
        }
        0
    }

    /// The record at 1-based `ordinal` among live records matching `kind`.
    ///
    /// `0` yields `None`. A non-zero ordinal past the end also yields
    /// `None` and counts as an unresolved reference.
    pub fn record_at(&mut self, ordinal: u32, kind: impl Fn(&Thinker<H>) -> bool) -> Option<ThinkerId> {
        if ordinal == 0 {
            return None;
        }
        let found = self
            .ordinals(kind)
            .into_iter()
            .nth(ordinal as usize - 1);
        if found.is_none() {
            self.unresolved += 1;
        }
        found
    }

    /// Ids of live records matching `kind`, in ordinal order
    /// (`result[n - 1]` is ordinal `n`).
    pub fn ordinals(&self, kind: impl Fn(&Thinker<H>) -> bool) -> Vec<ThinkerId> {
        self.records()
            .filter(|(_, t)| !t.action.is_removed() && kind(t))
            .map(|(id, _)| id)
            .collect()
    }

    /// Count a reference that could not be resolved.
    pub fn note_unresolved(&mut self) {
        self.unresolved += 1;
    }

    /// Unresolved references counted since the last call.
    pub fn take_unresolved(&mut self) -> u32 {
        std::mem::take(&mut self.unresolved)
    }

    // ── Reclamation ────────────────────────────────────────────────

    /// Unlink `index`, recycling its slot under a new generation.
    fn unlink(&mut self, index: u32) -> Option<Thinker<H>> {
        let slot = self.slots.get_mut(index as usize)?;
        let link = slot.link.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        match link.prev.and_then(|p| self.link_mut(p)) {
            Some(prev) => prev.next = link.next,
            None => self.head = link.next,
        }
        match link.next.and_then(|n| self.link_mut(n)) {
            Some(next) => next.prev = link.prev,
            None => self.tail = link.prev,
        }
        self.vacant.push(index);
        self.len -= 1;
        Some(link.thinker)
    }

    /// Unlink every record marked for removal, preserving the order of the
    /// rest, and free their zone blocks.
    ///
    /// Returns the number of records reclaimed and the zone bytes released.
    #[track_caller]
    pub fn compact(&mut self, mem: &mut MemoryResource) -> (usize, usize) {
        let mut reclaimed = 0;
        let mut bytes = 0;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let Some(link) = self.link(index) else {
                break;
            };
            cursor = link.next;
            if !link.thinker.action.is_removed() {
                continue;
            }
            if let Some(thinker) = self.unlink(index) {
                bytes += mem.block_info(thinker.block).map_or(0, |b| b.size as usize);
                mem.free(thinker.block);
                reclaimed += 1;
            }
        }
        (reclaimed, bytes)
    }

    /// Run one tick: compact, then invoke every record once in list order.
    ///
    /// The set of records visited is fixed before the first callback runs.
    /// Records appended by callbacks are first visited on the next run;
    /// records removed by callbacks are skipped for the rest of this one.
    pub fn run(host: &mut H) -> TickStats {
        let (list, mem) = host.split_mut();
        let (reclaimed, reclaimed_bytes) = list.compact(mem);
        let mut order = std::mem::take(&mut list.order);
        order.clear();
        order.extend(list.iter());

        let mut invoked = 0;
        for &id in &order {
            let Some(action) = host.thinkers().action(id) else {
                continue;
            };
            if action.invoke(host, id) {
                invoked += 1;
            }
        }

        let stats = TickStats {
            visited: order.len(),
            invoked,
            reclaimed,
            reclaimed_bytes,
        };
        host.thinkers_mut().order = order;
        if reclaimed > 0 {
            log::debug!("reclaimed {reclaimed} thinkers ({reclaimed_bytes} bytes)");
        }
        stats
    }

    /// Forget every record without touching the zone.
    ///
    /// For use after the backing blocks were already released in bulk, e.g.
    /// by a level-range [`free_tags`](MemoryResource::free_tags).
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.link.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.vacant = (0..self.slots.len() as u32).rev().collect();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Free every record's zone block, then [`clear`](Self::clear).
    #[track_caller]
    pub fn clear_and_free(&mut self, mem: &mut MemoryResource) {
        let mut cursor = self.head;
        while let Some(link) = cursor.and_then(|index| self.link(index)) {
            mem.free(link.thinker.block);
            cursor = link.next;
        }
        self.clear();
    }
}

impl<H: ThinkerHost> Default for ThinkerList<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ThinkerHost> fmt::Debug for ThinkerList<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThinkerList")
            .field("len", &self.len)
            .field("pending", &self.pending_removal())
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// Iterator over [`ThinkerId`]s in list order.
pub struct Ids<'a, H: ThinkerHost> {
    list: &'a ThinkerList<H>,
    cursor: Option<u32>,
}

impl<H: ThinkerHost> Iterator for Ids<'_, H> {
    type Item = ThinkerId;

    fn next(&mut self) -> Option<ThinkerId> {
        let index = self.cursor?;
        let slot = self.list.slots.get(index as usize)?;
        let link = slot.link.as_ref()?;
        self.cursor = link.next;
        Some(ThinkerId::new(index, slot.generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rove_zone::ZoneConfig;

    struct World {
        list: ThinkerList<World>,
        mem: MemoryResource,
        seen: Vec<u32>,
    }

    impl ThinkerHost for World {
        type Body = u32;
        type Input = ();

        fn thinkers(&self) -> &ThinkerList<Self> {
            &self.list
        }

        fn thinkers_mut(&mut self) -> &mut ThinkerList<Self> {
            &mut self.list
        }

        fn split_mut(&mut self) -> (&mut ThinkerList<Self>, &mut MemoryResource) {
            (&mut self.list, &mut self.mem)
        }
    }

    fn world() -> World {
        World {
            list: ThinkerList::new(),
            mem: MemoryResource::init(&ZoneConfig::new(64 * 1024)).unwrap(),
            seen: Vec::new(),
        }
    }

    fn record(world: &mut World, id: ThinkerId) {
        let tag = world.list.get(id).map_or(0, |t| t.body);
        world.seen.push(tag);
    }

    fn spawn(world: &mut World, body: u32) -> ThinkerId {
        world
            .list
            .spawn(&mut world.mem, PurgeTag::LevSpec, 32, body, Action::Think(record))
    }

    #[test]
    fn runs_in_insertion_order() {
        let mut w = world();
        for n in 1..=3 {
            spawn(&mut w, n);
        }
        let stats = ThinkerList::run(&mut w);
        assert_eq!(w.seen, vec![1, 2, 3]);
        assert_eq!(stats.visited, 3);
        assert_eq!(stats.invoked, 3);
    }

    #[test]
    fn removed_records_stay_linked_until_compaction() {
        let mut w = world();
        let a = spawn(&mut w, 1);
        let b = spawn(&mut w, 2);
        assert!(w.list.remove(a));
        assert!(!w.list.remove(a));
        assert_eq!(w.list.len(), 2);
        assert_eq!(w.list.pending_removal(), 1);

        let stats = ThinkerList::run(&mut w);
        assert_eq!(stats.reclaimed, 1);
        assert_eq!(w.seen, vec![2]);
        assert!(!w.list.contains(a));
        assert!(w.list.contains(b));
        assert_eq!(w.list.len(), 1);
    }

    #[test]
    fn recycled_slots_get_new_generation() {
        let mut w = world();
        let a = spawn(&mut w, 1);
        w.list.remove(a);
        let (list, mem) = w.split_mut();
        list.compact(mem);
        let b = spawn(&mut w, 2);
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert!(w.list.get(a).is_none());
        assert_eq!(w.list.get(b).map(|t| t.body), Some(2));
    }

    #[test]
    fn removed_records_cannot_be_revived() {
        let mut w = world();
        let a = spawn(&mut w, 1);
        w.list.remove(a);
        assert!(!w.list.set_action(a, Action::Think(record)));
        assert_eq!(w.list.action(a), Some(Action::Removed));
    }

    #[test]
    fn index_round_trip() {
        let mut w = world();
        let ids: Vec<_> = (1..=5).map(|n| spawn(&mut w, n)).collect();
        let odd = |t: &Thinker<World>| t.body % 2 == 1;
        assert_eq!(w.list.index_of(Some(ids[0]), odd), 1);
        assert_eq!(w.list.index_of(Some(ids[2]), odd), 2);
        assert_eq!(w.list.index_of(Some(ids[1]), odd), 0);
        assert_eq!(w.list.index_of(None, odd), 0);
        for &id in &ids {
            let ordinal = w.list.index_of(Some(id), |_| true);
            assert_eq!(w.list.record_at(ordinal, |_| true), Some(id));
        }
        assert_eq!(w.list.record_at(0, |_| true), None);
        assert_eq!(w.list.take_unresolved(), 0);
        assert_eq!(w.list.record_at(99, |_| true), None);
        assert_eq!(w.list.take_unresolved(), 1);
        assert_eq!(w.list.take_unresolved(), 0);
    }

    #[test]
    fn clear_and_free_returns_all_memory() {
        let mut w = world();
        let before = w.mem.total_free_bytes();
        let ids: Vec<_> = (0..8).map(|n| spawn(&mut w, n)).collect();
        w.list.remove(ids[3]);
        w.list.clear_and_free(&mut w.mem);
        assert!(w.list.is_empty());
        assert_eq!(w.mem.total_free_bytes(), before);
        assert!(ids.iter().all(|&id| !w.list.contains(id)));
        // Fresh records reuse the lowest slots first.
        assert_eq!(spawn(&mut w, 0).index(), 0);
    }
}
