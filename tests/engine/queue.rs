//! QueueStore behavior through the public API.

use crate::common::*;

#[test]
fn fifo_scenario() {
    let test_db = TestDb::new();
    let queues = test_db.queues();

    queues.enqueue("jobs", json!("a")).unwrap();
    queues.enqueue("jobs", json!("b")).unwrap();
    assert_eq!(queues.dequeue("jobs").unwrap(), Some(json!("a")));
    assert_eq!(queues.size("jobs"), 1);
    assert_eq!(queues.peek("jobs"), Some(json!("b")));
}

#[test]
fn enqueue_reports_size_and_value() {
    let test_db = TestDb::new();
    let queues = test_db.queues();

    let first = queues.enqueue("q", json!({"n": 1})).unwrap();
    assert_eq!(
        first,
        Enqueued {
            queue: "q".into(),
            value: json!({"n": 1}),
            size: 1,
        }
    );
    assert_eq!(queues.enqueue("q", json!({"n": 2})).unwrap().size, 2);
}

#[test]
fn absent_queue_is_not_created_by_reads_or_misses() {
    let test_db = TestDb::new();
    let queues = test_db.queues();

    assert_eq!(queues.dequeue("nope").unwrap(), None);
    assert_eq!(queues.peek("nope"), None);
    assert!(!queues.clear_queue("nope").unwrap());
    assert_eq!(queues.size("nope"), 0);

    assert!(queues.list().is_empty());
    assert_eq!(file_size(&test_db.wal_path()), 0);
}

#[test]
fn queues_are_independent() {
    let test_db = TestDb::new();
    let queues = test_db.queues();

    queues.enqueue("a", json!(1)).unwrap();
    queues.enqueue("b", json!(2)).unwrap();
    queues.clear_queue("a").unwrap();

    assert_eq!(queues.size("a"), 0);
    assert_eq!(queues.peek("b"), Some(json!(2)));
    let mut names = queues.list();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn order_survives_restart() {
    let mut test_db = TestDb::new();
    {
        let queues = test_db.queues();
        for i in 0..10 {
            queues.enqueue("jobs", json!(i)).unwrap();
        }
        queues.dequeue("jobs").unwrap();
    }

    test_db.reopen();
    let expected: Vec<Value> = (1..10).map(|i| json!(i)).collect();
    assert_eq!(test_db.queues().items("jobs"), expected);
}
