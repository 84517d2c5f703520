//! Full-state snapshot store
//!
//! Persists the whole [`State`] as one JSON document and loads it back.
//!
//! # File Format
//!
//! ```text
//! {
//!   "format": 1,
//!   "applied_through": "<record id>" | null,
//!   "kv": { "<key>": <value>, ... },
//!   "queues": { "<name>": [<value>, ...], ... }
//! }
//! ```
//!
//! `applied_through` is the id of the last logged operation whose effect the
//! snapshot contains. Recovery uses it to avoid replaying an operation that
//! crashed after its snapshot but before its COMMIT.
//!
//! Any other document shape is read in the legacy layout: a reserved
//! top-level `queues` object, every other entry a KV pair. In that layout
//! `format` or `kv` are ordinary keys, so the current layout is only assumed
//! when the document has exactly its fields (see [`is_current_layout`]).
//!
//! # Crash Safety
//!
//! 1. Write to `<snapshot>.tmp`
//! 2. fsync the temporary file
//! 3. Atomic rename over the canonical path
//! 4. fsync the parent directory
//!
//! The canonical file is only ever replaced by rename, so it is never seen
//! half-written. On failure the temporary file is removed.

use crate::paths::temp_path_for;
use durakv_core::{Error, RecordId, Result, State, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Current snapshot document version
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Reserved top-level field of the legacy layout
const LEGACY_QUEUES_FIELD: &str = "queues";

/// Top-level fields of the current layout
const DOCUMENT_FIELDS: [&str; 4] = ["format", "applied_through", "kv", "queues"];

#[derive(Serialize)]
struct SnapshotDocumentRef<'a> {
    format: u32,
    applied_through: Option<&'a RecordId>,
    #[serde(flatten)]
    state: &'a State,
}

#[derive(Deserialize)]
struct SnapshotDocument {
    format: u32,
    #[serde(default)]
    applied_through: Option<RecordId>,
    #[serde(flatten)]
    state: State,
}

/// A snapshot read back from disk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedSnapshot {
    /// The persisted state (empty if there was no usable snapshot)
    pub state: State,
    /// Last operation reflected in `state`
    pub applied_through: Option<RecordId>,
}

/// Snapshot store bound to one snapshot path
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    temp_path: PathBuf,
}

impl SnapshotStore {
    /// Create a store for the snapshot at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let temp_path = temp_path_for(&path);
        SnapshotStore { path, temp_path }
    }

    /// Canonical snapshot path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary path used during `save`
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Whether a snapshot file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Durably replace the snapshot with `state`
    ///
    /// # Errors
    ///
    /// Serialization or I/O failure. The canonical file is left untouched
    /// and the temporary file is removed.
    pub fn save(&self, state: &State, applied_through: Option<&RecordId>) -> Result<()> {
        let document = SnapshotDocumentRef {
            format: SNAPSHOT_FORMAT_VERSION,
            applied_through,
            state,
        };
        let bytes = serde_json::to_vec_pretty(&document)?;

        if let Err(e) = self.write_atomic(&bytes) {
            if self.temp_path.exists() {
                let _ = std::fs::remove_file(&self.temp_path);
            }
            return Err(Error::Storage(format!(
                "Failed to save snapshot to '{}': {}",
                self.path.display(),
                e
            )));
        }

        debug!(
            target: "durakv::snapshot",
            keys = state.kv.len(),
            queues = state.queues.len(),
            bytes = bytes.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    fn write_atomic(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&self.temp_path, &self.path)?;

        #[cfg(unix)]
        if let Some(parent) = self.path.parent() {
            let dir = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            File::open(dir)?.sync_all()?;
        }

        Ok(())
    }

    /// Load the snapshot
    ///
    /// A missing file yields the empty state. An unparsable file is treated
    /// the same way (with a warning): recovery rebuilds from the log.
    ///
    /// # Errors
    ///
    /// I/O errors other than "not found" while reading the file.
    pub fn load(&self) -> Result<LoadedSnapshot> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LoadedSnapshot::default()),
            Err(e) => return Err(e.into()),
        };

        match decode(&bytes) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(
                    target: "durakv::snapshot",
                    path = %self.path.display(),
                    error = %e,
                    "Snapshot is unparsable; starting from empty state"
                );
                Ok(LoadedSnapshot::default())
            }
        }
    }

    /// Remove a temporary file left behind by a crash during `save`
    ///
    /// Returns `true` if a file was removed.
    pub fn cleanup_temp(&self) -> Result<bool> {
        match std::fs::remove_file(&self.temp_path) {
            Ok(()) => {
                warn!(
                    target: "durakv::snapshot",
                    path = %self.temp_path.display(),
                    "Removed stale snapshot temp file"
                );
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether a top-level object is a current-layout document
///
/// Requires a numeric `format`, an object `kv`, and nothing outside
/// [`DOCUMENT_FIELDS`].
fn is_current_layout(object: &serde_json::Map<String, Value>) -> bool {
    object.get("format").map_or(false, Value::is_u64)
        && object.get("kv").map_or(false, Value::is_object)
        && object
            .keys()
            .all(|key| DOCUMENT_FIELDS.contains(&key.as_str()))
}

fn decode(bytes: &[u8]) -> Result<LoadedSnapshot> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Object(mut object) = value else {
        return Err(Error::Corruption(
            "snapshot document is not an object".to_string(),
        ));
    };

    if is_current_layout(&object) {
        let document: SnapshotDocument = serde_json::from_value(Value::Object(object))?;
        if document.format != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::Corruption(format!(
                "unsupported snapshot format {}",
                document.format
            )));
        }
        return Ok(LoadedSnapshot {
            state: document.state,
            applied_through: document.applied_through,
        });
    }

    // Legacy layout: KV pairs at top level next to a reserved `queues` field
    let queues: BTreeMap<String, VecDeque<Value>> = match object.remove(LEGACY_QUEUES_FIELD) {
        Some(q) => serde_json::from_value(q)?,
        None => BTreeMap::new(),
    };
    let kv = object.into_iter().collect();

    Ok(LoadedSnapshot {
        state: State { kv, queues },
        applied_through: None,
    })
}
