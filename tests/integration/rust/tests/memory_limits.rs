//! Memory limit and garbage collection integration tests
//!
//! Verifies the heap budget holds through the engine facade: usage
//! never exceeds the limit, garbage from evaluations is reclaimable,
//! and denial is a recoverable error.

use core_types::{cell_base_bytes, ErrorKind, Value};
use engine::EngineConfig;
use integration_tests::{eval_number, ready_engine, ready_engine_with};

/// Test: evaluation temporaries are garbage once released and a
/// collection returns usage to zero.
#[test]
fn test_collect_reclaims_evaluation_garbage() {
    let engine = ready_engine();
    for _ in 0..10 {
        engine.evaluate("'abc' + 'def' + 'ghi'");
    }
    assert!(engine.current_memory_usage() > 0);

    let outcome = engine.collect_garbage();
    assert!(outcome.cells_freed > 0);
    assert!(outcome.bytes_freed > 0);
    assert_eq!(engine.current_memory_usage(), 0);
    assert_eq!(engine.stats().heap.live_cells, 0);
}

/// Test: values held by the caller survive collection; their contents
/// are intact afterwards.
#[test]
fn test_held_values_survive_collection() {
    let engine = ready_engine();
    let kept = engine.evaluate("'kept' + ' around'");
    engine.evaluate("'temporary'");

    engine.collect_garbage();
    assert_eq!(kept.to_string(), "kept around");
    assert_eq!(engine.stats().heap.live_cells, 1);
}

/// Test: a full heap denies allocation with MemoryLimitExceeded after
/// a collection attempt, and the engine recovers once values die.
#[test]
fn test_limit_denial_is_recoverable() {
    // Room for three ten-byte strings and their cells, nothing more.
    let limit = 3 * (cell_base_bytes() + 10) + 5;
    let engine = ready_engine_with(EngineConfig::default().with_memory_limit(limit));

    let mut held = Vec::new();
    for _ in 0..3 {
        let value = engine.evaluate("'0123456789'");
        assert!(value.is_string());
        held.push(value);
    }

    let denied = engine.evaluate("'0123456789'");
    assert!(denied.is_undefined());
    assert_eq!(engine.last_error().kind, ErrorKind::MemoryLimitExceeded);
    assert!(engine.current_memory_usage() <= engine.memory_limit());

    held.clear();
    let value = engine.evaluate("'0123456789'");
    assert!(value.is_string());
    assert_eq!(value.to_string(), "0123456789");
}

/// Test: usage stays within the limit across interleaved evaluations
/// and collections.
#[test]
fn test_usage_never_exceeds_limit() {
    let limit = 64 * 1024;
    let engine = ready_engine_with(EngineConfig::default().with_memory_limit(limit));
    let sources = [
        "'a' + 'b'",
        "[1, 2, 3, 4, 5]",
        "{a: 'x', b: 'y'}",
        "'repeat' + 'repeat' + 'repeat'",
        "[[1], [2], [3]]",
    ];

    for round in 0..20 {
        for source in &sources {
            engine.evaluate(source);
            assert!(engine.current_memory_usage() <= limit);
        }
        if round % 3 == 0 {
            engine.collect_garbage();
            assert!(engine.current_memory_usage() <= limit);
        }
    }
}

/// Test: cyclic values built through the factory are reclaimed once
/// unreachable from outside the heap.
#[test]
fn test_cycles_are_reclaimed_through_the_engine() {
    let engine = ready_engine();
    let values = engine.values().unwrap();

    let first = values.create_array().unwrap();
    let second = values.create_array().unwrap();
    first.push(second.clone()).unwrap();
    second.push(first.clone()).unwrap();
    assert_eq!(engine.stats().heap.live_cells, 2);

    drop(first);
    drop(second);
    let outcome = engine.collect_garbage();
    assert_eq!(outcome.cells_freed, 2);
    assert_eq!(engine.current_memory_usage(), 0);
}

/// Test: collection statistics accumulate across passes.
#[test]
fn test_collection_statistics_accumulate() {
    let engine = ready_engine();
    engine.evaluate("'x' + 'y'");
    engine.collect_garbage();
    engine.evaluate("'p' + 'q'");
    engine.collect_garbage();

    let heap = engine.stats().heap;
    assert_eq!(heap.collections, 2);
    assert!(heap.cells_freed >= 4);
    assert!(heap.bytes_freed > 0);
}

/// Test: a memory denial does not poison later evaluations or smaller
/// allocations.
#[test]
fn test_denial_leaves_the_engine_usable() {
    let limit = 2 * (cell_base_bytes() + 16);
    let engine = ready_engine_with(EngineConfig::default().with_memory_limit(limit));

    let big = "'".to_string() + &"x".repeat(4096) + "'";
    assert!(engine.evaluate(&big).is_undefined());
    assert_eq!(engine.last_error().kind, ErrorKind::MemoryLimitExceeded);

    assert_eq!(eval_number(&engine, "2 + 2"), 4.0);
    assert_eq!(engine.evaluate("'ok'").to_string(), "ok");
}
