//! durakv - single-node durable key-value and queue store
//!
//! Two data models, a flat key-value map and named FIFO queues, backed by a
//! write-ahead log and a full-state snapshot.
//!
//! # Quick Start
//!
//! ```ignore
//! use durakv::{Database, KVStore, QueueStore};
//! use serde_json::json;
//!
//! let db = Database::open("/path/to/data")?;
//!
//! let kv = KVStore::new(db.clone());
//! kv.set("user:1", json!({"name": "Alice"}))?;
//! assert_eq!(kv.get("user:1"), Some(json!({"name": "Alice"})));
//!
//! let queues = QueueStore::new(db);
//! queues.enqueue("jobs", json!("a"))?;
//! assert_eq!(queues.dequeue("jobs")?, Some(json!("a")));
//! ```
//!
//! # Architecture
//!
//! Every mutation appends a STARTED record to the log, changes memory, saves
//! the snapshot and appends a COMMIT record. At open, operations that started
//! but never committed are replayed on top of the snapshot.
//!
//! Lower layers are re-exported for tools that inspect the files directly.

pub use durakv_core::{Error, Result, Value};
pub use durakv_engine::{
    ConfigError, Database, Enqueued, KVStore, QueueStore, StoreConfig,
    DEFAULT_CHECKPOINT_INTERVAL,
};

/// Shared record and state types
pub mod core {
    pub use durakv_core::*;
}

/// Log, snapshot and recovery layers
pub mod durability {
    pub use durakv_durability::*;
}

pub use durakv_durability::{DurabilityMode, RecoveryStats};
