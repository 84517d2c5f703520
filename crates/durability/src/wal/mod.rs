//! WAL (Write-Ahead Log) module
//!
//! A single append-only file of newline-delimited JSON records:
//!
//! - `mode`: Durability modes (Sync, Buffered)
//! - `writer`: Appends STARTED/COMMIT records, truncates after checkpoints
//! - `reader`: Parses the file back for recovery and pending counts

pub mod mode;
pub mod reader;
pub mod writer;

pub use mode::DurabilityMode;
pub use reader::{WalReadResult, WalReader};
pub use writer::WalWriter;
