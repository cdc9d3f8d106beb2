//! Tier promotion integration tests
//!
//! A script crossing the compile threshold must keep producing exactly
//! the results the interpreter produced, and the tier must stay out of
//! the way entirely when disabled.

use core_types::Value;
use engine::EngineConfig;
use integration_tests::ready_engine_with;

/// Test: results are identical before, during, and after promotion for
/// a spread of expression shapes.
#[test]
fn test_promotion_does_not_change_results() {
    let engine = ready_engine_with(EngineConfig::default().with_jit_threshold(3));
    let sources = [
        "12 * (3 + 4)",
        "'ab' + 'cd' + 7",
        "'10' < '9'",
        "1 == '1'",
        "'hello'.length",
        "[1, 2, 3] + ''",
        "({a: 1}).a",
        "!0 === true",
    ];

    for source in sources {
        let first = engine.evaluate(source);
        for round in 1..10 {
            let later = engine.evaluate(source);
            assert_eq!(later, first, "source {:?} diverged on round {}", source, round);
        }
    }

    assert_eq!(engine.stats().tier.programs_compiled, sources.len() as u64);
    assert!(engine.stats().tier.cache_hits > 0);
}

/// Test: a hot script is compiled exactly once and served from cache
/// afterwards.
#[test]
fn test_compilation_happens_once_per_script() {
    let engine = ready_engine_with(EngineConfig::default().with_jit_threshold(2));

    for _ in 0..10 {
        assert_eq!(engine.evaluate("6 * 9"), Value::from_number(54.0));
    }

    let tier = engine.stats().tier;
    assert_eq!(tier.programs_compiled, 1);
    assert_eq!(tier.cache_hits, 8);
    assert_eq!(tier.compile_failures, 0);
}

/// Test: with the tier disabled nothing is profiled or compiled, and
/// results still come back correct.
#[test]
fn test_disabled_tier_never_compiles() {
    let engine = ready_engine_with(EngineConfig::default().with_jit_enabled(false));
    assert!(!engine.is_jit_enabled());

    for _ in 0..50 {
        assert_eq!(engine.evaluate("7 * 8"), Value::from_number(56.0));
    }

    let tier = engine.stats().tier;
    assert_eq!(tier.programs_compiled, 0);
    assert_eq!(tier.cache_hits, 0);
}

/// Test: scripts that fail at runtime are never promoted, and their
/// failures do not stop a healthy script from being promoted.
#[test]
fn test_failing_scripts_are_not_promoted() {
    let engine = ready_engine_with(EngineConfig::default().with_jit_threshold(2));

    for _ in 0..6 {
        assert!(engine.evaluate("missingName").is_undefined());
        assert_eq!(engine.evaluate("2 + 2"), Value::from_number(4.0));
    }

    let stats = engine.stats();
    assert_eq!(stats.failed_evaluations, 6);
    assert_eq!(stats.tier.programs_compiled, 1);
    assert_eq!(stats.tier.compile_failures, 0);
}

/// Test: resubmissions that differ only in surrounding whitespace
/// count against one profile and share the compiled program.
#[test]
fn test_whitespace_variants_share_a_profile() {
    let engine = ready_engine_with(EngineConfig::default().with_jit_threshold(3));

    for variant in ["  5 + 5  ", "5 + 5", "\n5 + 5\n", "5 + 5 "] {
        assert_eq!(engine.evaluate(variant), Value::from_number(10.0));
    }

    let tier = engine.stats().tier;
    assert_eq!(tier.programs_compiled, 1);
    assert_eq!(tier.cache_hits, 1);
}

/// Test: the compiled form agrees with the interpreter on type and
/// rendering for edge-heavy sources, NaN included.
#[test]
fn test_folded_and_interpreted_agree() {
    let engine = ready_engine_with(EngineConfig::default().with_jit_threshold(1));
    let sources = [
        "1 / 0",
        "-1 / 0",
        "0 / 0",
        "'' + 0.1 + 0.2",
        "10 % 3",
        "'b' > 'a'",
        "null == 0",
        "undefined == null",
    ];

    for source in sources {
        let interpreted = engine.evaluate(source);
        let compiled = engine.evaluate(source);
        assert_eq!(compiled.type_of(), interpreted.type_of(), "source: {}", source);
        assert_eq!(
            compiled.to_string(),
            interpreted.to_string(),
            "source: {}",
            source
        );
    }

    assert_eq!(engine.stats().tier.programs_compiled, sources.len() as u64);
}
