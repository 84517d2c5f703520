//! In-memory state
//!
//! [`State`] is the full durable dataset: a KV table and a set of named FIFO
//! queues. It is a plain owned value; the engine guards it with a lock and
//! the snapshot store persists it whole.
//!
//! ## Invariants
//!
//! - Keys are unique
//! - Queue contents preserve FIFO insertion order
//! - A queue with an empty sequence still exists (it is listed, and
//!   `clear_queue` on it succeeds); only `apply` of an enqueue creates queues

use crate::operation::Operation;
use crate::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Full in-memory dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// KV table
    #[serde(default)]
    pub kv: BTreeMap<String, Value>,
    /// Named FIFO queues
    #[serde(default)]
    pub queues: BTreeMap<String, VecDeque<Value>>,
}

impl State {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are no keys and no queues
    pub fn is_empty(&self) -> bool {
        self.kv.is_empty() && self.queues.is_empty()
    }

    // ========== KV reads ==========

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.kv.get(key)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.kv.contains_key(key)
    }

    /// All (key, value) pairs
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.kv
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    // ========== Queue reads ==========

    /// Contents of `queue`, front first
    pub fn queue(&self, queue: &str) -> Option<&VecDeque<Value>> {
        self.queues.get(queue)
    }

    /// Front element of `queue`
    pub fn front(&self, queue: &str) -> Option<&Value> {
        self.queues.get(queue).and_then(|q| q.front())
    }

    /// Number of elements in `queue` (0 if absent)
    pub fn queue_len(&self, queue: &str) -> usize {
        self.queues.get(queue).map_or(0, |q| q.len())
    }

    /// Whether `queue` exists (possibly empty)
    pub fn has_queue(&self, queue: &str) -> bool {
        self.queues.contains_key(queue)
    }

    /// Names of all queues, including empty ones
    pub fn queue_names(&self) -> Vec<String> {
        self.queues.keys().cloned().collect()
    }

    // ========== Mutation ==========

    /// Apply a mutation
    ///
    /// Returns `false` when the operation found nothing to change (delete of
    /// an absent key, dequeue from an empty or absent queue, clear of an
    /// absent queue). Such operations never create a queue.
    pub fn apply(&mut self, op: &Operation) -> bool {
        match op {
            Operation::Set { key, value } => {
                self.kv.insert(key.clone(), value.clone());
                true
            }
            Operation::Delete { key } => self.kv.remove(key).is_some(),
            Operation::Clear => {
                self.kv.clear();
                true
            }
            Operation::Enqueue { queue, value } => {
                self.queues
                    .entry(queue.clone())
                    .or_default()
                    .push_back(value.clone());
                true
            }
            Operation::Dequeue { queue, .. } => self
                .queues
                .get_mut(queue)
                .and_then(|q| q.pop_front())
                .is_some(),
            Operation::ClearQueue { queue } => match self.queues.get_mut(queue) {
                Some(q) => {
                    q.clear();
                    true
                }
                None => false,
            },
        }
    }
}
