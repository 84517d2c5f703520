//! Log writer
//!
//! Appends newline-delimited JSON records to the single log file.
//!
//! # Durability
//!
//! - `Sync`: every `append` writes, flushes and fsyncs before returning, so
//!   a STARTED record is on disk before the caller touches memory.
//! - `Buffered`: every `append` hands the line to the OS without fsync. A
//!   process crash loses nothing; a power failure may lose records the OS
//!   had not yet written back.
//!
//! A record must reach the OS before the snapshot that reflects it is
//! saved. Otherwise a killed process could leave a snapshot whose watermark
//! is missing from the log, and recovery would apply older pending records
//! a second time.
//!
//! The writer only ever appends. The one exception is [`WalWriter::clear`],
//! which truncates the whole file after a checkpoint has made every record
//! redundant.

use crate::wal::mode::DurabilityMode;
use durakv_core::{Operation, Record, RecordId, Result, Timestamp};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Append-only log writer
///
/// # Example
///
/// ```ignore
/// let mut wal = WalWriter::open("data/wal.log", DurabilityMode::Sync)?;
/// let id = wal.append_operation(&Operation::Clear)?;
/// // ... mutate, snapshot ...
/// wal.commit(&id)?;
/// ```
pub struct WalWriter {
    /// File path
    path: PathBuf,

    /// Buffered append handle
    writer: BufWriter<File>,

    /// Durability mode
    durability_mode: DurabilityMode,

    /// Current file size (offset of the next record)
    size: u64,

    /// Records appended through this handle
    records_written: u64,

    /// Last timestamp issued; stamps never go backwards
    last_timestamp: Timestamp,

    /// A failed append may have left a partial line at the end of the file
    torn_tail: bool,
}

impl WalWriter {
    /// Open existing log or create a new one
    ///
    /// Creates parent directories if they don't exist. If the file ends in a
    /// torn record (no trailing newline, left by a crash mid-write), a newline
    /// is appended so the next record starts on its own line.
    pub fn open<P: AsRef<Path>>(path: P, durability_mode: DurabilityMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;

        let mut size = file.metadata()?.len();
        if size > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(size - 1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                warn!(
                    target: "durakv::wal",
                    path = %path.display(),
                    "Log ends in a torn record; terminating it"
                );
                file.write_all(b"\n")?;
                file.sync_all()?;
                size += 1;
            }
        }

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            durability_mode,
            size,
            records_written: 0,
            last_timestamp: Timestamp::EPOCH,
            torn_tail: false,
        })
    }

    /// Append a record
    ///
    /// Stamps the record with the current time (clamped so timestamps never
    /// decrease), writes it as one line and applies the durability mode.
    /// Returns the record's id.
    ///
    /// # Errors
    ///
    /// Any I/O error. In `Sync` mode an `Ok` means the record is on disk.
    /// After an error the next append first terminates whatever partial line
    /// the failed write left behind.
    pub fn append(&mut self, mut record: Record) -> Result<RecordId> {
        record.timestamp = self.next_timestamp();

        let mut line = record.to_line()?;
        line.push('\n');

        if self.torn_tail {
            self.terminate_torn_tail()?;
        }

        if let Err(e) = self.write_line(line.as_bytes()) {
            self.torn_tail = true;
            warn!(
                target: "durakv::wal",
                id = %record.id,
                error = %e,
                "Log append failed"
            );
            return Err(e);
        }

        self.size += line.len() as u64;
        self.records_written += 1;

        debug!(
            target: "durakv::wal",
            id = %record.id,
            kind = %record.kind,
            "Appended record"
        );
        Ok(record.id)
    }

    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_all(line)?;
        if self.durability_mode.requires_immediate_fsync() {
            self.fsync()
        } else {
            self.flush()
        }
    }

    fn terminate_torn_tail(&mut self) -> Result<()> {
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.size = self.writer.get_ref().metadata()?.len();
        self.torn_tail = false;
        Ok(())
    }

    /// Append the STARTED record for `op` under a fresh id
    pub fn append_operation(&mut self, op: &Operation) -> Result<RecordId> {
        self.append(op.to_record(RecordId::new()))
    }

    /// Append the COMMIT record for `id`
    pub fn commit(&mut self, id: &RecordId) -> Result<()> {
        self.append(Record::commit(id.clone()))?;
        Ok(())
    }

    /// Flush buffered writes to OS buffers
    ///
    /// This does not force data to disk; use [`WalWriter::fsync`] for that.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Force sync to disk (flush + fsync)
    pub fn fsync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_mut().sync_all()?;
        Ok(())
    }

    /// Truncate the log to empty
    ///
    /// Must only be called right after a snapshot that reflects every record
    /// in the log has been durably written. Buffered records are flushed first
    /// so none can land after the truncation.
    pub fn clear(&mut self) -> Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_mut();
        file.set_len(0)?;
        file.sync_all()?;
        self.size = 0;
        self.torn_tail = false;
        debug!(target: "durakv::wal", path = %self.path.display(), "Log truncated");
        Ok(())
    }

    /// Current file size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of records appended through this handle
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get durability mode
    pub fn durability_mode(&self) -> DurabilityMode {
        self.durability_mode
    }

    fn next_timestamp(&mut self) -> Timestamp {
        let now = Timestamp::now().max(self.last_timestamp);
        self.last_timestamp = now;
        now
    }
}

impl Drop for WalWriter {
    fn drop(&mut self) {
        let _ = self.fsync();
    }
}
