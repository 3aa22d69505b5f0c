//! Bounded history of analyzed pose frames.

use crate::types::PoseFrame;

/// Maximum number of frames retained for temporal metrics
pub const HISTORY_CAPACITY: usize = 30;

/// Fixed-capacity FIFO ring of the most recent frames.
///
/// Pushing onto a full ring overwrites the oldest frame in O(1).
#[derive(Debug, Clone)]
pub struct PoseHistory {
    frames: Vec<PoseFrame>,
    /// Index of the oldest frame once the ring is full
    head: usize,
    capacity: usize,
}

impl PoseHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    pub fn push(&mut self, frame: PoseFrame) {
        if self.frames.len() < self.capacity {
            self.frames.push(frame);
        } else {
            self.frames[self.head] = frame;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.head = 0;
    }

    /// Frame at logical position `index`, 0 being the oldest
    pub fn get(&self, index: usize) -> Option<&PoseFrame> {
        if index >= self.frames.len() {
            return None;
        }
        self.frames.get((self.head + index) % self.frames.len())
    }

    pub fn latest(&self) -> Option<&PoseFrame> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// The frame pushed just before the latest one
    pub fn previous(&self) -> Option<&PoseFrame> {
        self.len().checked_sub(2).and_then(|i| self.get(i))
    }

    /// Frames from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PoseFrame> + '_ {
        let (wrapped, start) = self.frames.split_at(self.head);
        start.iter().chain(wrapped.iter())
    }

    /// The last `n` frames (or fewer), oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &PoseFrame> + '_ {
        self.iter().skip(self.len().saturating_sub(n))
    }
}

impl Default for PoseHistory {
    fn default() -> Self {
        Self::new()
    }
}
