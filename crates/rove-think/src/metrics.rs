//! Per-run scheduler counters.

/// What one [`ThinkerList::run`](crate::ThinkerList::run) did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Records in the run's snapshot (linked after compaction).
    pub visited: usize,
    /// Records whose callback was actually called.
    pub invoked: usize,
    /// Records reclaimed by the compaction at the start of the run.
    pub reclaimed: usize,
    /// Zone bytes returned by that compaction, headers included.
    pub reclaimed_bytes: usize,
}

impl TickStats {
    /// Fold another run's counters into this one.
    pub fn accumulate(&mut self, other: &TickStats) {
        self.visited += other.visited;
        self.invoked += other.invoked;
        self.reclaimed += other.reclaimed;
        self.reclaimed_bytes += other.reclaimed_bytes;
    }
}
