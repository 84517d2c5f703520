//! Database engine for durakv
//!
//! This crate orchestrates the lower layers:
//! - Database: open/close, config file, process lock
//! - Recovery integration at open
//! - The durable mutation pipeline (log, apply, snapshot, commit)
//! - Checkpoint policy
//! - KV and queue primitives

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod primitives;

pub use database::{ConfigError, Database, StoreConfig, DEFAULT_CHECKPOINT_INTERVAL};
pub use primitives::{Enqueued, KVStore, QueueStore};
