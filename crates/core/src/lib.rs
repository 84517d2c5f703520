//! Core types for durakv
//!
//! This crate defines the foundational types shared by the durability layer
//! and the engine:
//! - Error: Error type hierarchy
//! - Timestamp: Millisecond wall-clock stamp carried by every log record
//! - RecordId / RecordKind / RecordStatus / Record: the durability log entry
//! - Operation: A decoded, validated mutation
//! - State: The full in-memory table (KV map + named FIFO queues)
//! - Value: Opaque structured value (re-exported `serde_json::Value`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod operation;
pub mod record;
pub mod state;
pub mod timestamp;

pub use error::{Error, Result};
pub use operation::Operation;
pub use record::{Record, RecordId, RecordKind, RecordStatus};
pub use state::State;
pub use timestamp::Timestamp;

/// Opaque value stored under a key or inside a queue
///
/// Any JSON-representable structure, including `null`.
pub use serde_json::Value;
