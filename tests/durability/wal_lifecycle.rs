//! Log Lifecycle Tests
//!
//! What the log contains after each kind of operation.

use crate::common::*;

#[test]
fn every_mutation_is_a_started_commit_pair() {
    let test_db = TestDb::new();
    test_db.kv().set("k", json!(1)).unwrap();
    test_db.kv().delete("k").unwrap();
    test_db.kv().clear().unwrap();
    test_db.queues().enqueue("q", json!("a")).unwrap();
    test_db.queues().dequeue("q").unwrap();
    test_db.queues().clear_queue("q").unwrap();

    let records = read_log(&test_db.wal_path());
    assert_eq!(records.len(), 12);

    let kinds: Vec<RecordKind> = records
        .chunks(2)
        .map(|pair| {
            assert!(pair[0].is_started());
            assert!(pair[1].is_commit());
            assert_eq!(pair[0].id, pair[1].id);
            pair[0].kind.clone()
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            RecordKind::Set,
            RecordKind::Delete,
            RecordKind::Clear,
            RecordKind::QueueEnqueue,
            RecordKind::QueueDequeue,
            RecordKind::QueueClear,
        ]
    );
    assert!(records
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn reads_and_misses_write_nothing() {
    let test_db = TestDb::new();
    let kv = test_db.kv();
    let queues = test_db.queues();

    kv.get("absent");
    kv.has("absent");
    kv.all();
    assert!(!kv.delete("absent").unwrap());
    assert_eq!(kv.update("absent", json!(1)).unwrap(), None);
    assert_eq!(queues.dequeue("absent").unwrap(), None);
    assert_eq!(queues.peek("absent"), None);
    assert!(!queues.clear_queue("absent").unwrap());
    queues.size("absent");
    queues.list();

    assert_eq!(file_size(&test_db.wal_path()), 0);
    assert_eq!(test_db.db().pending_operations().unwrap(), 0);
}

#[test]
fn pending_operations_counts_started_records() {
    let test_db = TestDb::with_config(StoreConfig::default().with_checkpoint_interval(0));
    for i in 0..5 {
        test_db.kv().set("k", json!(i)).unwrap();
    }
    assert_eq!(test_db.db().pending_operations().unwrap(), 5);

    test_db.db().checkpoint().unwrap();
    assert_eq!(test_db.db().pending_operations().unwrap(), 0);
}

#[test]
fn automatic_checkpoint_bounds_log_growth() {
    let test_db = TestDb::with_config(StoreConfig::default().with_checkpoint_interval(10));
    for i in 0..95 {
        test_db.queues().enqueue("q", json!(i)).unwrap();
    }

    assert_eq!(test_db.db().pending_operations().unwrap(), 5);
    assert_eq!(test_db.queues().size("q"), 95);
}

#[test]
fn checkpoint_interval_survives_restart() {
    let mut test_db = TestDb::with_config(StoreConfig::default().with_checkpoint_interval(4));
    for i in 0..3 {
        test_db.kv().set("k", json!(i)).unwrap();
    }
    test_db.reopen();

    assert_eq!(test_db.db().config().checkpoint_interval, 4);
    // The count carries over: one more write reaches the interval
    test_db.kv().set("k", json!(3)).unwrap();
    assert_eq!(test_db.db().pending_operations().unwrap(), 0);
}
