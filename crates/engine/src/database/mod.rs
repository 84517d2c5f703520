//! Database struct and open/close logic
//!
//! This module provides the main Database struct that orchestrates:
//! - Store directory, config file and process lock
//! - Automatic recovery on startup
//! - The durable mutation pipeline shared by the KV and queue facades
//! - Checkpoints (snapshot + log truncation)
//!
//! ## Mutation Pipeline
//!
//! Every mutating call runs under one writer lock, in this order:
//!
//! 1. Decide the operation from the current state (or return not-found
//!    without touching the log)
//! 2. Append the STARTED record
//! 3. Apply the operation to the in-memory state
//! 4. Save the snapshot, stamped with the operation's id
//! 5. Append the COMMIT record
//!
//! If the snapshot fails, the error is returned and no COMMIT is written, so
//! recovery sees the operation as pending.

pub mod config;

pub use config::{ConfigError, StoreConfig, DEFAULT_CHECKPOINT_INTERVAL};

use durakv_core::{Error, Operation, RecordId, Result, State};
use durakv_durability::{
    DurabilityMode, RecoveryEngine, RecoveryStats, SnapshotStore, StorePaths, WalReader, WalWriter,
};
use parking_lot::{Mutex, RwLock};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Writer-side state, only touched under the writer lock
struct WriterState {
    wal: WalWriter,
    /// Id of the last STARTED record appended
    last_started: Option<RecordId>,
    /// Non-COMMIT records in the log since the last checkpoint
    since_checkpoint: u64,
}

/// Main database struct
///
/// Owns the in-memory [`State`] and serializes every mutation through the
/// log, snapshot and commit steps. Reads take a shared lock and never block
/// each other. Create a database by calling `Database::open()`.
///
/// # Example
///
/// ```text
/// use durakv_engine::{Database, KVStore};
///
/// let db = Database::open("/path/to/data")?;
/// let kv = KVStore::new(db.clone());
/// kv.set("user:1", serde_json::json!({"name": "Alice"}))?;
/// ```
pub struct Database {
    paths: StorePaths,
    config: StoreConfig,
    durability_mode: DurabilityMode,
    state: RwLock<State>,
    writer: Mutex<WriterState>,
    snapshots: SnapshotStore,
    reader: WalReader,
    recovery_stats: RecoveryStats,
    /// Exclusive process lock, released on drop
    _lock_file: File,
}

impl Database {
    /// Open a database at the given directory.
    ///
    /// Creates the directory if needed. If `durakv.toml` does not exist, a
    /// default one is written; the config is then read from it.
    ///
    /// # Errors
    ///
    /// Invalid config, directory already in use by another process, or an
    /// I/O failure during recovery.
    ///
    /// # Example
    ///
    /// ```text
    /// use durakv_engine::Database;
    ///
    /// let db = Database::open("/path/to/data")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let paths = StorePaths::from_root(path);
        paths.create_directories()?;

        let config_path = paths.config();
        StoreConfig::write_default_if_missing(&config_path)?;
        let cfg = StoreConfig::from_file(&config_path)?;

        Self::open_inner(paths, cfg)
    }

    /// Open a database with an explicit configuration.
    ///
    /// The supplied config is written to `durakv.toml` so that subsequent
    /// `Database::open()` calls (e.g. after restart) pick up the same settings.
    ///
    /// # Example
    ///
    /// ```text
    /// use durakv_engine::{Database, StoreConfig};
    ///
    /// let db = Database::open_with_config("/path/to/data", StoreConfig::buffered())?;
    /// ```
    pub fn open_with_config<P: AsRef<Path>>(path: P, cfg: StoreConfig) -> Result<Arc<Self>> {
        let paths = StorePaths::from_root(path);
        paths.create_directories()?;

        cfg.durability_mode()?;
        cfg.write_to_file(&paths.config())?;

        Self::open_inner(paths, cfg)
    }

    fn open_inner(paths: StorePaths, cfg: StoreConfig) -> Result<Arc<Self>> {
        let durability_mode = cfg.durability_mode()?;

        // Refuse a second process on the same directory; interleaved appends
        // from two writers would corrupt the log.
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(paths.lock())
            .map_err(|e| Error::Storage(format!("failed to open lock file: {}", e)))?;
        fs2::FileExt::try_lock_exclusive(&lock_file).map_err(|_| {
            Error::Storage(format!(
                "store at '{}' is already in use by another process",
                paths.root().display()
            ))
        })?;

        let snapshots = SnapshotStore::new(paths.snapshot());
        snapshots.cleanup_temp()?;

        let reader = WalReader::new(paths.wal());
        let mut wal = WalWriter::open(paths.wal(), durability_mode)?;

        let recovery = RecoveryEngine::new(reader.clone(), snapshots.clone());
        let result = recovery.recover(&mut wal)?;
        let since_checkpoint = reader.count_pending()? as u64;

        info!(
            target: "durakv::db",
            path = %paths.root().display(),
            durability = durability_mode.as_str(),
            keys = result.state.kv.len(),
            queues = result.state.queues.len(),
            replayed = result.stats.replayed,
            "Database opened"
        );

        let db = Arc::new(Database {
            paths,
            durability_mode,
            state: RwLock::new(result.state),
            writer: Mutex::new(WriterState {
                wal,
                last_started: None,
                since_checkpoint,
            }),
            snapshots,
            reader,
            recovery_stats: result.stats,
            config: cfg,
            _lock_file: lock_file,
        });

        // A log already past the interval is compacted right away
        if db.checkpoint_due(since_checkpoint) {
            db.checkpoint()?;
        }

        Ok(db)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Store directory
    pub fn path(&self) -> &Path {
        self.paths.root()
    }

    /// Configuration the database was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Durability mode of the log
    pub fn durability_mode(&self) -> DurabilityMode {
        self.durability_mode
    }

    /// What recovery found and did when this database was opened
    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery_stats
    }

    // ========================================================================
    // State access
    // ========================================================================

    /// Run `f` against a consistent view of the state
    pub(crate) fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.state.read())
    }

    /// Run one durable mutation
    ///
    /// `plan` sees the current state and returns the operation to perform, or
    /// `None` when there is nothing to do (no log record is written). `report`
    /// sees the operation and the state right after it was applied.
    ///
    /// Returns `Ok(None)` when `plan` declined.
    pub(crate) fn mutate<R>(
        &self,
        plan: impl FnOnce(&State) -> Option<Operation>,
        report: impl FnOnce(&Operation, &State) -> R,
    ) -> Result<Option<R>> {
        let mut writer = self.writer.lock();

        let Some(op) = plan(&self.state.read()) else {
            return Ok(None);
        };

        let id = writer.wal.append_operation(&op)?;
        writer.last_started = Some(id.clone());
        writer.since_checkpoint += 1;

        let outcome = {
            let mut state = self.state.write();
            state.apply(&op);
            report(&op, &state)
        };

        self.snapshots.save(&self.state.read(), Some(&id))?;
        writer.wal.commit(&id)?;

        debug!(target: "durakv::db", id = %id, kind = %op.kind(), "Operation committed");

        if self.checkpoint_due(writer.since_checkpoint) {
            // The operation is already committed; a failed checkpoint is
            // retried after the next one.
            if let Err(e) = self.checkpoint_locked(&mut writer) {
                warn!(target: "durakv::db", error = %e, "Automatic checkpoint failed");
            }
        }

        Ok(Some(outcome))
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Save a snapshot and truncate the log
    ///
    /// Afterwards the snapshot alone reflects every operation and the log is
    /// empty.
    pub fn checkpoint(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        self.checkpoint_locked(&mut writer)
    }

    fn checkpoint_locked(&self, writer: &mut WriterState) -> Result<()> {
        self.snapshots
            .save(&self.state.read(), writer.last_started.as_ref())?;
        writer.wal.clear()?;

        info!(
            target: "durakv::db",
            operations = writer.since_checkpoint,
            "Checkpoint complete"
        );
        writer.since_checkpoint = 0;
        Ok(())
    }

    fn checkpoint_due(&self, since_checkpoint: u64) -> bool {
        self.config.checkpoint_interval > 0 && since_checkpoint >= self.config.checkpoint_interval
    }

    /// Number of non-COMMIT records in the log
    pub fn pending_operations(&self) -> Result<usize> {
        let mut writer = self.writer.lock();
        writer.wal.flush()?;
        self.reader.count_pending()
    }

    /// Force buffered log records to disk
    pub fn flush(&self) -> Result<()> {
        self.writer.lock().wal.fsync()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.paths.root())
            .field("durability_mode", &self.durability_mode)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
