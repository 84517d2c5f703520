//! Mode Equivalence Tests
//!
//! Sync and buffered durability differ only in when bytes reach the disk;
//! after a clean shutdown or a process kill both recover the same state.

use crate::common::*;

fn workload(test_db: &TestDb) {
    let kv = test_db.kv();
    let queues = test_db.queues();
    for i in 0..20 {
        kv.set(&format!("k{}", i % 7), json!(i)).unwrap();
        queues.enqueue(if i % 2 == 0 { "even" } else { "odd" }, json!(i)).unwrap();
        if i % 5 == 0 {
            queues.dequeue("even").unwrap();
        }
    }
    kv.delete("k3").unwrap();
}

#[test]
fn sync_and_buffered_recover_identically() {
    let mut sync_db = TestDb::new();
    let mut buffered_db = TestDb::new_buffered();
    assert_eq!(sync_db.db().durability_mode(), DurabilityMode::Sync);
    assert_eq!(buffered_db.db().durability_mode(), DurabilityMode::Buffered);

    workload(&sync_db);
    workload(&buffered_db);

    sync_db.reopen();
    buffered_db.reopen();

    assert_states_equal(
        &CapturedState::capture(sync_db.db()),
        &CapturedState::capture(buffered_db.db()),
        "modes diverged after restart",
    );
    // The mode is read back from durakv.toml
    assert_eq!(buffered_db.db().durability_mode(), DurabilityMode::Buffered);
}

#[test]
fn buffered_flush_makes_log_visible() {
    let test_db = TestDb::new_buffered();
    test_db.kv().set("k", json!(1)).unwrap();

    test_db.db().flush().unwrap();
    let records = read_log(&test_db.wal_path());
    assert_eq!(records.len(), 2);
    assert!(records[1].is_commit());
}

#[test]
fn killed_process_recovers_identically_in_both_modes() {
    let mut sync_db = TestDb::new();
    let mut buffered_db = TestDb::new_buffered();

    workload(&sync_db);
    workload(&buffered_db);
    let expected = CapturedState::capture(sync_db.db());
    assert_states_equal(
        &expected,
        &CapturedState::capture(buffered_db.db()),
        "modes diverged before the kill",
    );

    sync_db.kill();
    buffered_db.kill();
    sync_db.open();
    buffered_db.open();

    for test_db in [&sync_db, &buffered_db] {
        assert_states_equal(
            &expected,
            &CapturedState::capture(test_db.db()),
            "state changed across a kill",
        );
        assert!(test_db.db().recovery_stats().is_clean());
    }
}
