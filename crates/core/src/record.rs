//! Durability log records
//!
//! A [`Record`] is one line of the write-ahead log. Every mutating operation
//! produces a STARTED record before it touches memory, and a COMMIT record
//! carrying the same [`RecordId`] once the snapshot that makes its effect
//! durable has been written.
//!
//! ## Wire Format
//!
//! One JSON object per line:
//!
//! ```text
//! {"id":"6f1c…","type":"SET","key":"user:1","value":{"name":"Alice"},"status":"STARTED","timestamp":1700000000000}
//! {"id":"6f1c…","type":"COMMIT","timestamp":1700000000002}
//! ```
//!
//! Absent optional fields are omitted. A present `"value": null` is a real
//! null value and is kept distinct from an absent value.

use crate::timestamp::Timestamp;
use crate::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier correlating a STARTED record with its COMMIT
///
/// Freshly generated ids are UUID v4 strings. Ids read back from a log are
/// accepted verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh, unique id
    pub fn new() -> Self {
        RecordId(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId(s)
    }
}

/// Kind of a log record
///
/// Serialized as the upper-case names used on disk. Any other string is kept
/// as [`RecordKind::Unknown`] so that recovery can report it instead of
/// discarding the whole line as corrupt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordKind {
    /// Write a key
    Set,
    /// Remove a key
    Delete,
    /// Empty the KV table
    Clear,
    /// Append to a named queue
    QueueEnqueue,
    /// Remove the front of a named queue
    QueueDequeue,
    /// Empty a named queue
    QueueClear,
    /// Completion marker for a previously STARTED record
    Commit,
    /// Kind not understood by this version
    Unknown(String),
}

impl RecordKind {
    /// On-disk name of this kind
    pub fn as_str(&self) -> &str {
        match self {
            RecordKind::Set => "SET",
            RecordKind::Delete => "DELETE",
            RecordKind::Clear => "CLEAR",
            RecordKind::QueueEnqueue => "QUEUE_ENQUEUE",
            RecordKind::QueueDequeue => "QUEUE_DEQUEUE",
            RecordKind::QueueClear => "QUEUE_CLEAR",
            RecordKind::Commit => "COMMIT",
            RecordKind::Unknown(other) => other,
        }
    }

    /// Check if this is a COMMIT marker
    pub fn is_commit(&self) -> bool {
        matches!(self, RecordKind::Commit)
    }
}

impl From<String> for RecordKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SET" => RecordKind::Set,
            "DELETE" => RecordKind::Delete,
            "CLEAR" => RecordKind::Clear,
            "QUEUE_ENQUEUE" => RecordKind::QueueEnqueue,
            "QUEUE_DEQUEUE" => RecordKind::QueueDequeue,
            "QUEUE_CLEAR" => RecordKind::QueueClear,
            "COMMIT" => RecordKind::Commit,
            _ => RecordKind::Unknown(s),
        }
    }
}

impl From<RecordKind> for String {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an operation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// Intent logged; effect not yet known to be durable
    Started,
}

/// One entry of the write-ahead log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Operation id (shared by the STARTED record and its COMMIT)
    pub id: RecordId,

    /// Record kind
    #[serde(rename = "type")]
    pub kind: RecordKind,

    /// Target key (SET, DELETE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Target queue (QUEUE_*)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,

    /// Payload (SET, QUEUE_ENQUEUE, QUEUE_DEQUEUE)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub value: Option<Value>,

    /// STARTED on every non-COMMIT record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,

    /// Wall-clock time at write
    #[serde(default)]
    pub timestamp: Timestamp,
}

/// Keep an explicit `null` as `Some(Value::Null)`; only a missing field is `None`
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Record {
    /// Create a STARTED record of the given kind with no target or payload
    pub fn started(id: RecordId, kind: RecordKind) -> Self {
        Record {
            id,
            kind,
            key: None,
            queue: None,
            value: None,
            status: Some(RecordStatus::Started),
            timestamp: Timestamp::EPOCH,
        }
    }

    /// Create a COMMIT record for `id`
    pub fn commit(id: RecordId) -> Self {
        Record {
            id,
            kind: RecordKind::Commit,
            key: None,
            queue: None,
            value: None,
            status: None,
            timestamp: Timestamp::EPOCH,
        }
    }

    /// Set the target key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the target queue
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Set the payload
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the timestamp
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check if this is a COMMIT marker
    pub fn is_commit(&self) -> bool {
        self.kind.is_commit()
    }

    /// Check if this record opens an operation that needs a COMMIT
    pub fn is_started(&self) -> bool {
        !self.is_commit() && self.status == Some(RecordStatus::Started)
    }

    /// Encode as one log line (without the trailing newline)
    pub fn to_line(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode one log line
    pub fn from_line(line: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}
