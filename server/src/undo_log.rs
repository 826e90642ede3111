//! Bounded history of match snapshots used to reverse commands

use scoreboard_shared::{MatchState, UNDO_LIMIT};
use std::collections::VecDeque;

/// Most recent snapshot is at the back; the oldest is dropped on overflow
#[derive(Debug, Clone)]
pub struct UndoLog {
    entries: VecDeque<MatchState>,
    capacity: usize,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::with_capacity(UNDO_LIMIT)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(UNDO_LIMIT)),
            capacity,
        }
    }

    /// Stores a snapshot, discarding the oldest one past capacity
    pub fn push(&mut self, snapshot: MatchState) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<MatchState> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new()
    }
}
