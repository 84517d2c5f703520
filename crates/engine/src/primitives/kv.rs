//! KVStore: flat key-value map
//!
//! ## Design
//!
//! KVStore is a stateless facade over the Database engine. It holds no
//! in-memory state beyond an `Arc<Database>` reference.
//!
//! ## Thread Safety
//!
//! KVStore is `Send + Sync` and can be safely shared across threads.
//! Multiple KVStore instances on the same Database are safe.
//!
//! ## API
//!
//! - `set(key, value)` - Store a value
//! - `get(key)` - Read a value
//! - `update(key, value)` - Overwrite an existing key only
//! - `delete(key)` - Remove a key
//! - `has(key)`, `all()` - Inspect the map
//! - `clear()` - Remove every key

use crate::database::Database;
use durakv_core::{Error, Operation, Result, Value};
use std::sync::Arc;

/// Key-value store primitive
///
/// Stateless facade over Database - all state lives in the engine.
///
/// # Example
///
/// ```ignore
/// let db = Database::open("/path/to/data")?;
/// let kv = KVStore::new(db);
///
/// kv.set("user:1", json!({"name": "Alice"}))?;
/// let value = kv.get("user:1");
/// kv.delete("user:1")?;
/// ```
#[derive(Clone)]
pub struct KVStore {
    db: Arc<Database>,
}

impl KVStore {
    /// Create new KVStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get the underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Store a value
    ///
    /// Creates the key if it doesn't exist, overwrites if it does. Returns
    /// the stored pair.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty key; otherwise only I/O failures.
    pub fn set(&self, key: &str, value: Value) -> Result<(String, Value)> {
        validate_key(key)?;
        let op = Operation::Set {
            key: key.to_string(),
            value: value.clone(),
        };
        self.db.mutate(|_| Some(op), |_, _| ())?;
        Ok((key.to_string(), value))
    }

    /// Get a value by key
    ///
    /// Returns None if the key doesn't exist.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.db.read(|state| state.get(key).cloned())
    }

    /// Overwrite an existing key
    ///
    /// Returns `None` (and writes nothing to the log) if the key doesn't
    /// exist.
    pub fn update(&self, key: &str, value: Value) -> Result<Option<(String, Value)>> {
        let op = Operation::Set {
            key: key.to_string(),
            value: value.clone(),
        };
        let updated = self
            .db
            .mutate(|state| state.contains_key(key).then_some(op), |_, _| ())?;
        Ok(updated.map(|()| (key.to_string(), value)))
    }

    /// Delete a key
    ///
    /// Returns `true` if the key existed and was deleted, `false` if it
    /// didn't exist (no log record is written).
    pub fn delete(&self, key: &str) -> Result<bool> {
        let deleted = self.db.mutate(
            |state| {
                state.contains_key(key).then(|| Operation::Delete {
                    key: key.to_string(),
                })
            },
            |_, _| (),
        )?;
        Ok(deleted.is_some())
    }

    /// Whether the key exists
    pub fn has(&self, key: &str) -> bool {
        self.db.read(|state| state.contains_key(key))
    }

    /// Every key-value pair
    pub fn all(&self) -> Vec<(String, Value)> {
        self.db.read(|state| state.entries())
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.db.read(|state| state.kv.len())
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every key
    ///
    /// Queues are untouched.
    pub fn clear(&self) -> Result<()> {
        self.db.mutate(|_| Some(Operation::Clear), |_, _| ())?;
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("key must not be empty".into()));
    }
    Ok(())
}
