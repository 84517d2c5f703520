//! Recovery Invariant Tests
//!
//! Tests the fundamental recovery guarantees:
//! 1. No committed data is lost
//! 2. Uncommitted operations are re-applied exactly once, in log order
//! 3. Recovery is idempotent
//! 4. Recovery is deterministic

use crate::common::*;
use proptest::prelude::*;

// ============================================================================
// Invariant 1: Committed data survives restart
// ============================================================================

#[test]
fn committed_data_survives_restart() {
    let mut test_db = TestDb::new();
    {
        let kv = test_db.kv();
        let queues = test_db.queues();
        for i in 0..50 {
            kv.set(&format!("key_{}", i), json!(i)).unwrap();
            queues.enqueue("q", json!(i)).unwrap();
        }
        kv.delete("key_0").unwrap();
        queues.dequeue("q").unwrap();
    }

    let state_before = CapturedState::capture(test_db.db());
    test_db.reopen();
    let state_after = CapturedState::capture(test_db.db());

    assert_states_equal(&state_before, &state_after, "data lost after restart");
    assert!(test_db.db().recovery_stats().is_clean());
}

#[test]
fn empty_queue_survives_restart() {
    let mut test_db = TestDb::new();
    {
        let queues = test_db.queues();
        queues.enqueue("drained", json!(1)).unwrap();
        queues.dequeue("drained").unwrap();
    }

    test_db.reopen();
    let queues = test_db.queues();
    assert!(queues.exists("drained"));
    assert_eq!(queues.size("drained"), 0);
    assert_eq!(queues.list(), vec!["drained".to_string()]);
}

// ============================================================================
// Invariant 3: Idempotence
// ============================================================================

#[test]
fn recovery_twice_yields_same_state() {
    let mut test_db = TestDb::new();
    test_db.kv().set("base", json!(0)).unwrap();
    test_db.close();

    append_uncommitted(
        test_db.path(),
        &[
            Operation::Set {
                key: "a".into(),
                value: json!(1),
            },
            Operation::Enqueue {
                queue: "q".into(),
                value: json!("x"),
            },
        ],
    );

    test_db.open();
    let first = CapturedState::capture(test_db.db());
    assert_eq!(test_db.db().recovery_stats().replayed, 2);

    test_db.reopen();
    let second = CapturedState::capture(test_db.db());
    assert_states_equal(&first, &second, "second recovery changed state");
    let stats = test_db.db().recovery_stats();
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.replayed, 0);
}

// ============================================================================
// Invariants 1, 2 and 4 over arbitrary histories
// ============================================================================

fn arb_operation() -> impl Strategy<Value = Operation> {
    let key = "[a-d]";
    let queue = "[xy]";
    prop_oneof![
        (key, 0i64..100).prop_map(|(key, v)| Operation::Set {
            key,
            value: json!(v),
        }),
        key.prop_map(|key| Operation::Delete { key }),
        Just(Operation::Clear),
        (queue, 0i64..100).prop_map(|(queue, v)| Operation::Enqueue {
            queue,
            value: json!(v),
        }),
        queue.prop_map(|queue| Operation::Dequeue { queue, value: None }),
        queue.prop_map(|queue| Operation::ClearQueue { queue }),
    ]
}

/// Run an operation through the public API.
fn run(test_db: &TestDb, op: &Operation) {
    let kv = test_db.kv();
    let queues = test_db.queues();
    match op {
        Operation::Set { key, value } => {
            kv.set(key, value.clone()).unwrap();
        }
        Operation::Delete { key } => {
            kv.delete(key).unwrap();
        }
        Operation::Clear => kv.clear().unwrap(),
        Operation::Enqueue { queue, value } => {
            queues.enqueue(queue, value.clone()).unwrap();
        }
        Operation::Dequeue { queue, .. } => {
            queues.dequeue(queue).unwrap();
        }
        Operation::ClearQueue { queue } => {
            queues.clear_queue(queue).unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn recovered_state_matches_model(
        committed in prop::collection::vec(arb_operation(), 0..15),
        pending in prop::collection::vec(arb_operation(), 0..8),
    ) {
        let mut test_db = TestDb::new();
        let mut model = State::new();
        for op in &committed {
            run(&test_db, op);
            model.apply(op);
        }
        test_db.close();

        append_uncommitted(test_db.path(), &pending);
        for op in &pending {
            model.apply(op);
        }

        test_db.open();
        let recovered = CapturedState::capture(test_db.db());
        prop_assert_eq!(&recovered, &CapturedState::from_state(&model));

        // Deterministic and idempotent
        test_db.reopen();
        prop_assert_eq!(&CapturedState::capture(test_db.db()), &recovered);
        prop_assert_eq!(test_db.db().recovery_stats().pending, 0);
    }
}
