//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from any suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

pub use durakv::core::{Operation, Record, RecordId, RecordKind, State};
pub use durakv::durability::{
    DurabilityMode, RecoveryStats, SnapshotStore, StorePaths, WalReader, WalWriter,
};
pub use durakv::{Database, Enqueued, Error, KVStore, QueueStore, StoreConfig, Value};
pub use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// TestDb - database wrapper with restart support
// ============================================================================

/// Test database wrapper owning its directory.
///
/// The handle is optional so tests can close the store, tamper with its
/// files, and open it again.
pub struct TestDb {
    db: Option<Arc<Database>>,
    pub dir: TempDir,
}

impl TestDb {
    /// Create a test database with sync durability (the default).
    pub fn new() -> Self {
        Self::with_config(StoreConfig::sync())
    }

    /// Create a test database with buffered durability.
    pub fn new_buffered() -> Self {
        Self::with_config(StoreConfig::buffered())
    }

    /// Create a test database with an explicit config.
    pub fn with_config(config: StoreConfig) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::open_with_config(dir.path(), config)
            .expect("Failed to create test database");
        TestDb { db: Some(db), dir }
    }

    /// The open database handle.
    pub fn db(&self) -> &Arc<Database> {
        self.db.as_ref().expect("database is closed")
    }

    pub fn kv(&self) -> KVStore {
        KVStore::new(self.db().clone())
    }

    pub fn queues(&self) -> QueueStore {
        QueueStore::new(self.db().clone())
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn paths(&self) -> StorePaths {
        StorePaths::from_root(self.dir.path())
    }

    pub fn wal_path(&self) -> PathBuf {
        self.paths().wal()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.paths().snapshot()
    }

    /// Drop the handle (releasing the lock) so the files can be manipulated.
    pub fn close(&mut self) {
        self.db = None;
    }

    /// Open the store again from its directory (reads durakv.toml).
    pub fn open(&mut self) {
        self.close();
        self.db = Some(Database::open(self.dir.path()).expect("Failed to reopen database"));
    }

    /// Abandon the handle without running any destructor, as a killed
    /// process would, then remove the lock file the leaked handle holds.
    pub fn kill(&mut self) {
        if let Some(db) = self.db.take() {
            std::mem::forget(db);
        }
        fs::remove_file(self.paths().lock()).expect("Failed to remove lock file");
    }

    /// Close and reopen the database (simulates a restart).
    pub fn reopen(&mut self) {
        self.open();
    }
}

// ============================================================================
// Crash simulation
// ============================================================================

/// Open a raw log writer on a closed store and append STARTED records
/// without COMMITs, as if the process died mid-operation.
pub fn append_uncommitted(dir: &Path, ops: &[Operation]) -> Vec<RecordId> {
    let mut wal = WalWriter::open(StorePaths::from_root(dir).wal(), DurabilityMode::Sync)
        .expect("Failed to open log");
    ops.iter()
        .map(|op| wal.append_operation(op).expect("Failed to append"))
        .collect()
}

/// Append raw bytes to a file.
pub fn append_bytes(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .expect("Failed to open file");
    file.write_all(bytes).expect("Failed to append");
    file.sync_all().expect("Failed to sync");
}

/// Truncate a file to `len` bytes.
pub fn truncate_file(path: &Path, len: u64) {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .expect("Failed to open file");
    file.set_len(len).expect("Failed to truncate");
}

pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read every record in a log.
pub fn read_log(path: &Path) -> Vec<Record> {
    WalReader::new(path)
        .read_all()
        .expect("Failed to read log")
        .records
}

/// Number of COMMIT records in a log.
pub fn commit_count(path: &Path) -> usize {
    read_log(path).iter().filter(|r| r.is_commit()).count()
}

// ============================================================================
// State capture
// ============================================================================

/// Full observable state of a database, via its public API.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedState {
    pub kv: Vec<(String, Value)>,
    pub queues: Vec<(String, Vec<Value>)>,
}

impl CapturedState {
    pub fn capture(db: &Arc<Database>) -> Self {
        let kv_store = KVStore::new(db.clone());
        let queue_store = QueueStore::new(db.clone());

        let mut kv = kv_store.all();
        kv.sort_by(|a, b| a.0.cmp(&b.0));

        let mut names = queue_store.list();
        names.sort();
        let queues = names
            .into_iter()
            .map(|name| {
                let items = queue_store.items(&name);
                (name, items)
            })
            .collect();

        CapturedState { kv, queues }
    }

    /// Capture from a [`State`] value.
    pub fn from_state(state: &State) -> Self {
        let mut kv = state.entries();
        kv.sort_by(|a, b| a.0.cmp(&b.0));
        let queues = state
            .queues
            .iter()
            .map(|(name, q)| (name.clone(), q.iter().cloned().collect()))
            .collect();
        CapturedState { kv, queues }
    }
}

pub fn assert_states_equal(a: &CapturedState, b: &CapturedState, msg: &str) {
    assert_eq!(a, b, "{}", msg);
}
