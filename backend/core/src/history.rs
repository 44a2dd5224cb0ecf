use std::collections::VecDeque;

/// Number of finished generations a session keeps.
pub const HISTORY_CAPACITY: usize = 3;

/// Fixed-capacity history, most recent first. Pushing into a full ring evicts
/// the oldest entry.
#[derive(Debug, Clone)]
pub struct HistoryRing<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> HistoryRing<T> {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// A zero capacity is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert as the most recent entry, returning the evicted one if any.
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_back()
        } else {
            None
        };
        self.entries.push_front(entry);
        evicted
    }

    /// Entry by recency, 0 being the newest.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for HistoryRing<T> {
    fn default() -> Self {
        Self::new()
    }
}
