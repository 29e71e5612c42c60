//! Fixed-capacity tables of active moving-plane thinkers.
//!
//! Ceilings and platforms that can be stopped and restarted by trigger are
//! tracked here so the triggers can find them by tag, including while they
//! are parked with no callback.

use rove_core::ThinkerId;

/// Capacity of the active ceiling table.
pub const MAX_CEILINGS: usize = 30;

/// Capacity of the active platform table.
pub const MAX_PLATS: usize = 30 * 256;

/// Returned when a table has no free slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableFull {
    /// Capacity of the table that was full.
    pub capacity: usize,
}

impl std::fmt::Display for TableFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no free slot in active table of {}", self.capacity)
    }
}

impl std::error::Error for TableFull {}

/// A table of at most `N` thinker ids.
///
/// Entries keep their slot until removed; freed slots are reused lowest
/// first.
#[derive(Clone, Debug)]
pub struct ActiveTable<const N: usize> {
    slots: Box<[Option<ThinkerId>]>,
    len: usize,
}

impl<const N: usize> ActiveTable<N> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            slots: vec![None; N].into_boxed_slice(),
            len: 0,
        }
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Entries in use.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Record `id` in the lowest free slot.
    pub fn add(&mut self, id: ThinkerId) -> Result<usize, TableFull> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.is_none())
            .ok_or(TableFull { capacity: N })?;
        *slot = Some(id);
        self.len += 1;
        Ok(index)
    }

    /// Drop `id` from the table. Returns whether it was present.
    pub fn remove(&mut self, id: ThinkerId) -> bool {
        match self.slots.iter_mut().find(|s| **s == Some(id)) {
            Some(slot) => {
                *slot = None;
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Whether `id` is in the table.
    pub fn contains(&self, id: ThinkerId) -> bool {
        self.slots.contains(&Some(id))
    }

    /// Ids in slot order.
    pub fn iter(&self) -> impl Iterator<Item = ThinkerId> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.len = 0;
    }
}

impl<const N: usize> Default for ActiveTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
