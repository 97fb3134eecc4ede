//! Bounded action-outcome memory
//!
//! A fixed-capacity circular buffer: O(1) append, oldest entry evicted
//! once full. Agents keep the last 100 outcomes; pattern effectiveness
//! histories reuse the same buffer with capacity 20.

use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;
use crate::core::types::SimTime;

/// How many action outcomes an agent remembers
pub const AGENT_MEMORY_CAPACITY: usize = 100;

/// Snapshot of the four need levels at record time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NeedSnapshot {
    pub hunger: f32,
    pub energy: f32,
    pub happiness: f32,
    pub social: f32,
}

/// One remembered action outcome with full post-action state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub action: ActionKind,
    pub success: bool,
    pub reward: f32,
    pub cost: f32,
    pub sim_time: SimTime,
    pub needs: NeedSnapshot,
    pub money: f32,
    pub mood: f32,
}

/// Fixed-capacity circular buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingBuffer<T> {
    items: Vec<T>,
    capacity: usize,
    /// Index of the oldest element once the buffer has wrapped
    head: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn push(&mut self, item: T) {
        if self.items.len() < self.capacity {
            self.items.push(item);
        } else {
            self.items[self.head] = item;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (wrapped, linear) = self.items.split_at(self.head);
        linear.iter().chain(wrapped.iter())
    }

    /// The newest `n` entries, oldest first
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.len().saturating_sub(n);
        self.iter().skip(skip)
    }

    pub fn last(&self) -> Option<&T> {
        self.iter().last()
    }
}
