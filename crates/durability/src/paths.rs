//! Store directory structure
//!
//! A store is a directory containing all durable state:
//!
//! ```text
//! <dir>/
//! ├── durakv.toml     # Configuration
//! ├── .lock           # Exclusive process lock
//! ├── wal.log         # Write-ahead log (JSON lines)
//! ├── db.json         # Full-state snapshot
//! └── db.json.tmp     # Transient, only while a snapshot is being saved
//! ```

use std::path::{Path, PathBuf};

/// Log file name
pub const WAL_FILE_NAME: &str = "wal.log";
/// Snapshot file name
pub const SNAPSHOT_FILE_NAME: &str = "db.json";
/// Lock file name
pub const LOCK_FILE_NAME: &str = ".lock";
/// Config file name
pub const CONFIG_FILE_NAME: &str = "durakv.toml";

/// Store directory paths
#[derive(Debug, Clone)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    /// Create paths from root directory
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        StorePaths {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root store directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the log file path
    pub fn wal(&self) -> PathBuf {
        self.root.join(WAL_FILE_NAME)
    }

    /// Get the snapshot file path
    pub fn snapshot(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE_NAME)
    }

    /// Get the temporary path used while saving a snapshot
    pub fn snapshot_tmp(&self) -> PathBuf {
        temp_path_for(&self.snapshot())
    }

    /// Get the lock file path
    pub fn lock(&self) -> PathBuf {
        self.root.join(LOCK_FILE_NAME)
    }

    /// Get the config file path
    pub fn config(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Create the store directory
    pub fn create_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}

/// `<path>.tmp`
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
