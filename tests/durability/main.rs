//! Integration tests for the durability layer.
//!
//! These tests exercise log, snapshot, and recovery behaviors at the
//! Database level: things that need a real lifecycle
//! (open → write → close → tamper → reopen).
//!
//! Unit tests in crates/durability/src/ cover record parsing, snapshot
//! format and replay logic in isolation.

#[path = "../common/mod.rs"]
mod common;

mod mode_equivalence;
mod recovery_invariants;
mod wal_lifecycle;
