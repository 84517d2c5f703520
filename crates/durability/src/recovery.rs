//! Crash recovery
//!
//! Rebuilds the in-memory state at startup from the last snapshot plus the
//! operations the log shows as started but never committed.
//!
//! ## Recovery Process
//!
//! 1. Load the snapshot (empty state if missing or unparsable)
//! 2. Read every record from the log, in file order
//! 3. Classify: a STARTED record inserts (or overwrites) its id in the
//!    pending set, a COMMIT removes it, a COMMIT for an unknown id is a no-op
//! 4. Drop pending records at or before the snapshot watermark; their effect
//!    is already in the snapshot
//! 5. Replay the rest in log order, directly against the state
//! 6. Checkpoint the state and COMMIT every resolved id
//!
//! Step 6 makes recovery idempotent: a second run with no new operations
//! finds nothing pending and leaves the state unchanged.
//!
//! ## Failure Handling
//!
//! Replay is per record. An unknown kind or a malformed record is logged,
//! counted and skipped; it never aborts the remaining replay. Skipped records
//! are committed with the rest, so they are reported once. Only I/O
//! failures (reading the files, the final checkpoint) fail recovery.

use crate::snapshot::SnapshotStore;
use crate::wal::{WalReader, WalWriter};
use durakv_core::{Operation, Record, RecordId, Result, State};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Statistics from one recovery run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Records parsed from the log
    pub records_read: usize,
    /// Unparsable log lines that were skipped
    pub skipped_lines: usize,
    /// Operations started but not committed
    pub pending: usize,
    /// Pending operations already reflected in the snapshot
    pub already_applied: usize,
    /// Pending operations re-applied to the state
    pub replayed: usize,
    /// Pending records of a kind this version does not understand
    pub unknown_kinds: usize,
    /// Pending records that could not be decoded
    pub failed: usize,
}

impl RecoveryStats {
    /// Whether recovery had to change anything
    pub fn is_clean(&self) -> bool {
        self.pending == 0
    }
}

/// Result of a recovery run
#[derive(Debug, Clone)]
pub struct RecoveryResult {
    /// Reconstructed state
    pub state: State,
    /// What recovery found and did
    pub stats: RecoveryStats,
}

/// Recovery engine
///
/// Runs once at startup, before the store accepts operations.
///
/// # Example
///
/// ```ignore
/// let engine = RecoveryEngine::new(WalReader::new(paths.wal()), SnapshotStore::new(paths.snapshot()));
/// let mut wal = WalWriter::open(paths.wal(), DurabilityMode::Sync)?;
/// let result = engine.recover(&mut wal)?;
/// ```
#[derive(Debug, Clone)]
pub struct RecoveryEngine {
    reader: WalReader,
    snapshots: SnapshotStore,
}

impl RecoveryEngine {
    /// Create a recovery engine over a log and a snapshot store
    pub fn new(reader: WalReader, snapshots: SnapshotStore) -> Self {
        RecoveryEngine { reader, snapshots }
    }

    /// Log reader used for the scan
    pub fn reader(&self) -> &WalReader {
        &self.reader
    }

    /// Snapshot store used for load and checkpoint
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Run recovery
    ///
    /// `wal` must be the writer for the same log the reader scans; it is used
    /// to append the COMMIT records that close out resolved operations.
    ///
    /// # Errors
    ///
    /// I/O failure reading the log or snapshot, saving the checkpoint, or
    /// appending the COMMIT records.
    pub fn recover(&self, wal: &mut WalWriter) -> Result<RecoveryResult> {
        let loaded = self.snapshots.load()?;
        let mut state = loaded.state;

        let read = self.reader.read_all()?;
        let mut stats = RecoveryStats {
            records_read: read.records.len(),
            skipped_lines: read.skipped_lines,
            ..RecoveryStats::default()
        };

        let pending = pending_positions(&read.records);
        stats.pending = pending.len();

        let watermark = loaded
            .applied_through
            .as_ref()
            .and_then(|id| watermark_position(&read.records, id));

        let mut resolved: Vec<RecordId> = Vec::new();
        let mut last_replayed: Option<RecordId> = None;

        for position in pending {
            let record = &read.records[position];

            if watermark.map_or(false, |w| position <= w) {
                debug!(
                    target: "durakv::recovery",
                    id = %record.id,
                    kind = %record.kind,
                    "Pending operation already in snapshot"
                );
                stats.already_applied += 1;
                resolved.push(record.id.clone());
                continue;
            }

            match Operation::from_record(record) {
                Ok(Some(op)) => {
                    state.apply(&op);
                    debug!(
                        target: "durakv::recovery",
                        id = %record.id,
                        kind = %record.kind,
                        "Replayed pending operation"
                    );
                    stats.replayed += 1;
                    resolved.push(record.id.clone());
                    last_replayed = Some(record.id.clone());
                }
                Ok(None) => {
                    warn!(
                        target: "durakv::recovery",
                        id = %record.id,
                        kind = %record.kind,
                        "Skipping pending record of unknown kind"
                    );
                    stats.unknown_kinds += 1;
                    resolved.push(record.id.clone());
                }
                Err(e) => {
                    warn!(
                        target: "durakv::recovery",
                        id = %record.id,
                        error = %e,
                        "Failed to replay pending record"
                    );
                    stats.failed += 1;
                    resolved.push(record.id.clone());
                }
            }
        }

        if let Some(id) = &last_replayed {
            self.snapshots.save(&state, Some(id))?;
        }

        if !resolved.is_empty() {
            for id in &resolved {
                wal.commit(id)?;
            }
            wal.fsync()?;
        }

        info!(
            target: "durakv::recovery",
            records = stats.records_read,
            skipped_lines = stats.skipped_lines,
            pending = stats.pending,
            already_applied = stats.already_applied,
            replayed = stats.replayed,
            unknown_kinds = stats.unknown_kinds,
            failed = stats.failed,
            "Recovery complete"
        );

        Ok(RecoveryResult { state, stats })
    }
}

/// Log positions of operations started but never committed, in log order
///
/// A repeated STARTED id keeps only its last position.
fn pending_positions(records: &[Record]) -> Vec<usize> {
    let mut pending: HashMap<&RecordId, usize> = HashMap::new();
    for (position, record) in records.iter().enumerate() {
        if record.is_commit() {
            pending.remove(&record.id);
        } else {
            pending.insert(&record.id, position);
        }
    }

    let mut positions: Vec<usize> = pending.into_values().collect();
    positions.sort_unstable();
    positions
}

/// Position of the last STARTED record for the snapshot watermark
fn watermark_position(records: &[Record], id: &RecordId) -> Option<usize> {
    records
        .iter()
        .rposition(|record| !record.is_commit() && &record.id == id)
}
