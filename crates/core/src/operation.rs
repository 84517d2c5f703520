//! Decoded mutations
//!
//! [`Operation`] is the typed form of a non-COMMIT [`Record`]: the engine
//! builds one per mutating call, the log stores it as a record, and recovery
//! decodes records back into operations before replaying them.

use crate::error::{Error, Result};
use crate::record::{Record, RecordId, RecordKind};
use crate::Value;

/// A state mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Write `value` under `key`
    Set {
        /// Target key
        key: String,
        /// Value to store
        value: Value,
    },
    /// Remove `key`
    Delete {
        /// Target key
        key: String,
    },
    /// Empty the KV table (queues are untouched)
    Clear,
    /// Append `value` to the end of `queue`, creating it if absent
    Enqueue {
        /// Target queue
        queue: String,
        /// Value to append
        value: Value,
    },
    /// Remove the front element of `queue`
    ///
    /// `value` records the element that was at the front when the operation
    /// was logged. Replay removes whatever is at the front now.
    Dequeue {
        /// Target queue
        queue: String,
        /// Element observed at the front when logged
        value: Option<Value>,
    },
    /// Empty `queue` in place
    ClearQueue {
        /// Target queue
        queue: String,
    },
}

impl Operation {
    /// Record kind this operation is logged as
    pub fn kind(&self) -> RecordKind {
        match self {
            Operation::Set { .. } => RecordKind::Set,
            Operation::Delete { .. } => RecordKind::Delete,
            Operation::Clear => RecordKind::Clear,
            Operation::Enqueue { .. } => RecordKind::QueueEnqueue,
            Operation::Dequeue { .. } => RecordKind::QueueDequeue,
            Operation::ClearQueue { .. } => RecordKind::QueueClear,
        }
    }

    /// Build the STARTED record for this operation
    ///
    /// The timestamp is left at epoch; the log writer stamps it.
    pub fn to_record(&self, id: RecordId) -> Record {
        let record = Record::started(id, self.kind());
        match self {
            Operation::Set { key, value } => record.with_key(key.clone()).with_value(value.clone()),
            Operation::Delete { key } => record.with_key(key.clone()),
            Operation::Clear => record,
            Operation::Enqueue { queue, value } => {
                record.with_queue(queue.clone()).with_value(value.clone())
            }
            Operation::Dequeue { queue, value } => {
                let record = record.with_queue(queue.clone());
                match value {
                    Some(v) => record.with_value(v.clone()),
                    None => record,
                }
            }
            Operation::ClearQueue { queue } => record.with_queue(queue.clone()),
        }
    }

    /// Decode a record into an operation
    ///
    /// Returns `Ok(None)` for COMMIT and unknown kinds, and
    /// `Err(InvalidRecord)` when a field required by the kind is missing.
    pub fn from_record(record: &Record) -> Result<Option<Self>> {
        let op = match &record.kind {
            RecordKind::Set => Operation::Set {
                key: require_key(record)?,
                value: record
                    .value
                    .clone()
                    .ok_or_else(|| missing(record, "value"))?,
            },
            RecordKind::Delete => Operation::Delete {
                key: require_key(record)?,
            },
            RecordKind::Clear => Operation::Clear,
            RecordKind::QueueEnqueue => Operation::Enqueue {
                queue: require_queue(record)?,
                value: record
                    .value
                    .clone()
                    .ok_or_else(|| missing(record, "value"))?,
            },
            RecordKind::QueueDequeue => Operation::Dequeue {
                queue: require_queue(record)?,
                value: record.value.clone(),
            },
            RecordKind::QueueClear => Operation::ClearQueue {
                queue: require_queue(record)?,
            },
            RecordKind::Commit | RecordKind::Unknown(_) => return Ok(None),
        };
        Ok(Some(op))
    }
}

fn missing(record: &Record, field: &str) -> Error {
    Error::InvalidRecord(format!(
        "{} record {} has no {}",
        record.kind, record.id, field
    ))
}

fn require_key(record: &Record) -> Result<String> {
    record.key.clone().ok_or_else(|| missing(record, "key"))
}

fn require_queue(record: &Record) -> Result<String> {
    record.queue.clone().ok_or_else(|| missing(record, "queue"))
}
