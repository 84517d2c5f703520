//! Log reader
//!
//! Parses the log file into records, in file order.
//!
//! # Corruption Handling
//!
//! A crash mid-append can leave a torn last line; bit rot can damage any
//! line. Lines that fail to parse are skipped (and counted), never fatal, so
//! recovery always sees the longest readable history.

use durakv_core::{Record, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Result of reading the log
#[derive(Debug, Default, Clone)]
pub struct WalReadResult {
    /// Parsed records in file order
    pub records: Vec<Record>,
    /// Non-blank lines that failed to parse
    pub skipped_lines: usize,
}

/// Log reader
///
/// Stateless: every call re-reads the file, so results are restartable.
#[derive(Debug, Clone)]
pub struct WalReader {
    path: PathBuf,
}

impl WalReader {
    /// Create a reader for the log at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        WalReader {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in file order
    ///
    /// A missing file reads as empty. Blank lines are ignored; unparsable
    /// lines are skipped with a warning.
    ///
    /// # Errors
    ///
    /// I/O errors other than "not found".
    pub fn read_all(&self) -> Result<WalReadResult> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(WalReadResult::default()),
            Err(e) => return Err(e.into()),
        };

        let mut result = WalReadResult::default();
        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line?;
            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            match Record::from_line(text) {
                Ok(record) => result.records.push(record),
                Err(e) => {
                    warn!(
                        target: "durakv::wal",
                        line = index + 1,
                        error = %e,
                        "Skipping unparsable log line"
                    );
                    result.skipped_lines += 1;
                }
            }
        }

        Ok(result)
    }

    /// Number of non-COMMIT records in the log
    ///
    /// Callers use this to decide when to checkpoint.
    pub fn count_pending(&self) -> Result<usize> {
        Ok(self
            .read_all()?
            .records
            .iter()
            .filter(|r| !r.is_commit())
            .count())
    }
}
