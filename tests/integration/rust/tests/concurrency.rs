//! Concurrent evaluation integration tests
//!
//! Exercises the shared-state contracts: per-call results stay
//! isolated, statistics lose no increments, the error slot is
//! last-writer-wins, and collection never deadlocks against
//! in-flight evaluations.

use core_types::{ErrorKind, Value};
use engine::EngineConfig;
use integration_tests::{ready_engine, ready_engine_with};
use std::thread;

/// Test: K concurrent evaluations each produce their own result and
/// stats count exactly K attempts.
#[test]
fn test_concurrent_results_stay_isolated() {
    let engine = ready_engine();
    let threads = 8;
    let per_thread = 25;

    thread::scope(|scope| {
        for t in 0..threads {
            let engine = &engine;
            scope.spawn(move || {
                for i in 0..per_thread {
                    let n = (t * per_thread + i) as f64;
                    let value = engine.evaluate(&format!("{} + 0", n));
                    assert_eq!(value, Value::from_number(n));
                }
            });
        }
    });

    assert_eq!(
        engine.stats().scripts_evaluated,
        (threads * per_thread) as u64
    );
    assert_eq!(engine.stats().failed_evaluations, 0);
}

/// Test: concurrent failures leave one of the failing errors in the
/// slot, never a corrupted mixture.
#[test]
fn test_error_slot_is_last_writer_wins() {
    let engine = ready_engine();

    thread::scope(|scope| {
        for name in ["alpha", "beta", "gamma", "delta"] {
            let engine = &engine;
            scope.spawn(move || {
                for _ in 0..20 {
                    assert!(engine.evaluate(name).is_undefined());
                }
            });
        }
    });

    let error = engine.last_error();
    assert_eq!(error.kind, ErrorKind::RuntimeError);
    let expected = ["alpha", "beta", "gamma", "delta"]
        .iter()
        .map(|name| format!("'{}' is not defined", name))
        .collect::<Vec<_>>();
    assert!(expected.contains(&error.message));
    assert_eq!(engine.stats().failed_evaluations, 80);
}

/// Test: garbage collection runs concurrently with evaluations without
/// deadlock, and the memory limit holds throughout.
#[test]
fn test_collection_under_evaluation_load() {
    let limit = 8 * 1024 * 1024;
    let engine = ready_engine_with(EngineConfig::default().with_memory_limit(limit));

    thread::scope(|scope| {
        for _ in 0..4 {
            let engine = &engine;
            scope.spawn(move || {
                for i in 0..200 {
                    let text = engine.evaluate(&format!("'block' + {}", i));
                    assert_eq!(text.to_string(), format!("block{}", i));
                    assert!(engine.current_memory_usage() <= limit);
                }
            });
        }
        let engine = &engine;
        scope.spawn(move || {
            for _ in 0..50 {
                engine.collect_garbage();
                assert!(engine.current_memory_usage() <= limit);
            }
        });
    });

    engine.collect_garbage();
    assert_eq!(engine.current_memory_usage(), 0);
    assert_eq!(engine.stats().scripts_evaluated, 800);
}

/// Test: held results keep their cells alive while other threads
/// trigger collections.
#[test]
fn test_live_results_survive_concurrent_collection() {
    let engine = ready_engine();

    thread::scope(|scope| {
        let evaluator = scope.spawn(|| {
            let mut held = Vec::new();
            for i in 0..100 {
                held.push(engine.evaluate(&format!("'v' + {}", i)));
            }
            held
        });
        let collector = scope.spawn(|| {
            for _ in 0..100 {
                engine.collect_garbage();
            }
        });

        let held = evaluator.join().unwrap();
        collector.join().unwrap();

        for (i, value) in held.iter().enumerate() {
            assert_eq!(value.to_string(), format!("v{}", i));
        }
    });
}

/// Test: synchronous and asynchronous evaluation interleave safely.
#[test]
fn test_mixed_sync_and_async_load() {
    let engine = ready_engine_with(EngineConfig::default().with_worker_threads(4));

    thread::scope(|scope| {
        let engine_ref = &engine;
        scope.spawn(move || {
            for i in 0..50 {
                assert_eq!(
                    engine_ref.evaluate(&format!("{} * 2", i)),
                    Value::from_number((i * 2) as f64)
                );
            }
        });
        scope.spawn(move || {
            let handles: Vec<_> = (0..50)
                .map(|i| engine_ref.evaluate_async(&format!("{} * 3", i)))
                .collect();
            for (i, handle) in handles.into_iter().enumerate() {
                assert_eq!(handle.wait(), Value::from_number((i * 3) as f64));
            }
        });
    });

    assert_eq!(engine.stats().scripts_evaluated, 100);
}
