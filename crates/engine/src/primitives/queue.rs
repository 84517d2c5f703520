//! QueueStore: named FIFO queues
//!
//! Stateless facade over the Database engine, like [`KVStore`].
//!
//! Reads (`peek`, `size`, `list`) never touch the log. `dequeue` and
//! `clear_queue` on an absent (or, for dequeue, empty) queue return a
//! not-found result without logging anything and without creating the
//! queue.
//!
//! [`KVStore`]: crate::primitives::KVStore

use crate::database::Database;
use durakv_core::{Error, Operation, Result, Value};
use std::sync::Arc;

/// Result of a successful enqueue
#[derive(Debug, Clone, PartialEq)]
pub struct Enqueued {
    /// Queue the value was appended to
    pub queue: String,
    /// The appended value
    pub value: Value,
    /// Queue length after the append
    pub size: usize,
}

/// Named-queue primitive
///
/// # Example
///
/// ```ignore
/// let queues = QueueStore::new(db);
/// queues.enqueue("jobs", json!("a"))?;
/// assert_eq!(queues.dequeue("jobs")?, Some(json!("a")));
/// ```
#[derive(Clone)]
pub struct QueueStore {
    db: Arc<Database>,
}

impl QueueStore {
    /// Create new QueueStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get the underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Append a value, creating the queue if absent
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty queue name; otherwise only I/O failures.
    pub fn enqueue(&self, queue: &str, value: Value) -> Result<Enqueued> {
        if queue.is_empty() {
            return Err(Error::InvalidInput("queue name must not be empty".into()));
        }
        let op = Operation::Enqueue {
            queue: queue.to_string(),
            value: value.clone(),
        };
        let size = self
            .db
            .mutate(|_| Some(op), |_, state| state.queue_len(queue))?
            .unwrap_or_default();

        Ok(Enqueued {
            queue: queue.to_string(),
            value,
            size,
        })
    }

    /// Remove and return the front value
    ///
    /// Returns `None` if the queue is absent or empty.
    pub fn dequeue(&self, queue: &str) -> Result<Option<Value>> {
        let mut removed = None;
        self.db.mutate(
            |state| {
                let front = state.front(queue)?.clone();
                removed = Some(front.clone());
                Some(Operation::Dequeue {
                    queue: queue.to_string(),
                    value: Some(front),
                })
            },
            |_, _| (),
        )?;
        Ok(removed)
    }

    /// Front value without removing it
    pub fn peek(&self, queue: &str) -> Option<Value> {
        self.db.read(|state| state.front(queue).cloned())
    }

    /// Every value in the queue, front first (empty if absent)
    pub fn items(&self, queue: &str) -> Vec<Value> {
        self.db.read(|state| {
            state
                .queue(queue)
                .map(|q| q.iter().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// Queue length (0 if absent)
    pub fn size(&self, queue: &str) -> usize {
        self.db.read(|state| state.queue_len(queue))
    }

    /// Whether the queue exists (it may be empty)
    pub fn exists(&self, queue: &str) -> bool {
        self.db.read(|state| state.has_queue(queue))
    }

    /// Names of all queues, including empty ones
    pub fn list(&self) -> Vec<String> {
        self.db.read(|state| state.queue_names())
    }

    /// Empty a queue in place
    ///
    /// Returns `false` if the queue doesn't exist (no log record is written).
    pub fn clear_queue(&self, queue: &str) -> Result<bool> {
        let cleared = self.db.mutate(
            |state| {
                state.has_queue(queue).then(|| Operation::ClearQueue {
                    queue: queue.to_string(),
                })
            },
            |_, _| (),
        )?;
        Ok(cleared.is_some())
    }
}
