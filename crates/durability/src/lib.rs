//! Durability layer for durakv
//!
//! This crate handles everything that touches disk:
//!
//! - WAL: one append-only file of JSON-line records (STARTED/COMMIT pairs)
//! - Durability modes: Sync (default), Buffered
//! - Snapshot store: the full state as one JSON document, replaced atomically
//! - Recovery: snapshot + uncommitted log records, replayed in log order
//! - Store directory layout

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod paths; // Store directory layout
pub mod recovery; // Startup replay of uncommitted operations
pub mod snapshot; // Atomic full-state snapshots
pub mod wal; // Log writer/reader, durability modes

pub use paths::{StorePaths, CONFIG_FILE_NAME, LOCK_FILE_NAME, SNAPSHOT_FILE_NAME, WAL_FILE_NAME};
pub use recovery::{RecoveryEngine, RecoveryResult, RecoveryStats};
pub use snapshot::{LoadedSnapshot, SnapshotStore, SNAPSHOT_FORMAT_VERSION};
pub use wal::{DurabilityMode, WalReadResult, WalReader, WalWriter};
