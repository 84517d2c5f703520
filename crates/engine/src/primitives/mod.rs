//! Primitives layer for durakv
//!
//! Provides the two data models as stateless facades over the Database engine:
//! - **KVStore**: flat key-value map
//! - **QueueStore**: named FIFO queues
//!
//! ## Design Principle: Stateless Facades
//!
//! Primitives hold only an `Arc<Database>` reference and delegate every
//! operation to the engine, so multiple instances on the same Database are
//! safe and see the same data.

pub mod kv;
pub mod queue;

pub use kv::KVStore;
pub use queue::{Enqueued, QueueStore};
