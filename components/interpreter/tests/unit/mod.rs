//! Unit tests for evaluator semantics

use core_types::{EngineError, ErrorKind, Value};
use interpreter::Evaluator;
use memory_manager::Heap;

fn eval(source: &str) -> Value {
    Evaluator::new(Heap::new())
        .evaluate(source)
        .unwrap_or_else(|err| panic!("{} failed: {}", source, err))
}

fn eval_err(source: &str) -> EngineError {
    Evaluator::new(Heap::new())
        .evaluate(source)
        .expect_err("expected failure")
}

fn eval_number(source: &str) -> f64 {
    match eval(source) {
        Value::Number(n) => n,
        other => panic!("{} produced {:?}, expected a number", source, other),
    }
}

fn eval_bool(source: &str) -> bool {
    match eval(source) {
        Value::Boolean(b) => b,
        other => panic!("{} produced {:?}, expected a boolean", source, other),
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_basic_arithmetic() {
    assert_eq!(eval_number("42 + 58"), 100.0);
    assert_eq!(eval_number("123 * 456"), 56088.0);
    assert_eq!(eval_number("10 - 3"), 7.0);
    assert_eq!(eval_number("10 / 4"), 2.5);
    assert_eq!(eval_number("7 % 3"), 1.0);
    assert_eq!(eval_number("7.5 % 2"), 1.5);
}

#[test]
fn test_precedence_and_grouping() {
    assert_eq!(eval_number("2 + 3 * 4"), 14.0);
    assert_eq!(eval_number("(2 + 3) * 4"), 20.0);
    assert_eq!(eval_number("20 - 8 - 2"), 10.0);
    assert_eq!(eval_number("100 / 10 / 2"), 5.0);
}

#[test]
fn test_division_follows_ieee754() {
    assert_eq!(eval_number("1 / 0"), f64::INFINITY);
    assert_eq!(eval_number("-1 / 0"), f64::NEG_INFINITY);
    assert!(eval_number("0 / 0").is_nan());
}

#[test]
fn test_remainder_keeps_dividend_sign() {
    assert_eq!(eval_number("-7 % 3"), -1.0);
    assert_eq!(eval_number("7 % -3"), 1.0);
}

#[test]
fn test_unary_operators() {
    assert_eq!(eval_number("-5"), -5.0);
    assert_eq!(eval_number("- -5"), 5.0);
    assert_eq!(eval_number("+true"), 1.0);
    assert_eq!(eval_number("-'5'"), -5.0);
    assert!(eval_bool("!0"));
    assert!(eval_bool("!''"));
    assert!(!eval_bool("!'a'"));
    assert!(eval_bool("!!3"));
}

// ============================================================================
// String operations
// ============================================================================

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("'Hello' + ' ' + 'World!'").to_string(), "Hello World!");
    assert_eq!(eval("'a' + 'b'").to_string(), "ab");
}

#[test]
fn test_plus_concatenates_when_either_side_is_stringlike() {
    assert_eq!(eval("1 + '2'").to_string(), "12");
    assert_eq!(eval("'' + true").to_string(), "true");
    assert_eq!(eval("'' + null").to_string(), "null");
    assert_eq!(eval("'' + undefined").to_string(), "undefined");
    assert_eq!(eval("[1, 2] + ''").to_string(), "1,2");
    assert_eq!(eval("({}) + ''").to_string(), "[object Object]");
}

#[test]
fn test_non_plus_operators_coerce_to_numbers() {
    assert_eq!(eval_number("5 - '2'"), 3.0);
    assert_eq!(eval_number("'3' * '4'"), 12.0);
    assert_eq!(eval_number("'0x10' - 0"), 16.0);
    assert!(eval_number("'abc' - 1").is_nan());
}

#[test]
fn test_nested_array_display() {
    assert_eq!(eval("[1, [2, 3]] + ''").to_string(), "1,2,3");
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_numeric_comparison() {
    assert!(eval_bool("1 < 2"));
    assert!(!eval_bool("10 < 9"));
    assert!(eval_bool("2 <= 2"));
    assert!(eval_bool("3 > 2"));
    assert!(eval_bool("1 < '2'"));
}

#[test]
fn test_string_comparison_is_lexicographic() {
    assert!(eval_bool("'b' > 'a'"));
    assert!(eval_bool("'10' < '9'"));
    assert!(eval_bool("'abc' < 'abd'"));
}

#[test]
fn test_nan_comparisons_are_false() {
    assert!(!eval_bool("0 / 0 < 1"));
    assert!(!eval_bool("0 / 0 >= 1"));
    assert!(!eval_bool("'a' < 1"));
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_loose_equality_coerces() {
    assert!(eval_bool("1 == '1'"));
    assert!(eval_bool("null == undefined"));
    assert!(eval_bool("true == 1"));
    assert!(eval_bool("[1] == 1"));
    assert!(!eval_bool("null == 0"));
    assert!(!eval_bool("0 / 0 == 0 / 0"));
}

#[test]
fn test_strict_equality_does_not_coerce() {
    assert!(!eval_bool("1 === '1'"));
    assert!(!eval_bool("null === undefined"));
    assert!(eval_bool("2 === 2"));
    assert!(eval_bool("'x' === 'x'"));
    assert!(eval_bool("1 !== '1'"));
    assert!(!eval_bool("1 != '1'"));
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_global_value_names() {
    assert!(eval("undefined").is_undefined());
    assert!(eval_number("NaN").is_nan());
    assert_eq!(eval_number("Infinity"), f64::INFINITY);
    assert_eq!(eval_number("-Infinity"), f64::NEG_INFINITY);
}

#[test]
fn test_unknown_identifier_is_a_runtime_error() {
    let err = eval_err("missingVariable");
    assert_eq!(err.kind, ErrorKind::RuntimeError);
    assert_eq!(err.message, "'missingVariable' is not defined");
}

// ============================================================================
// Member access
// ============================================================================

#[test]
fn test_string_members() {
    assert_eq!(eval_number("'hello'.length"), 5.0);
    assert_eq!(eval_number("'héllo'.length"), 5.0);
    assert_eq!(eval("'hello'[1]").to_string(), "e");
    assert!(eval("'hello'[10]").is_undefined());
    assert!(eval("'hello'.missing").is_undefined());
}

#[test]
fn test_array_members() {
    assert_eq!(eval_number("[1, 2, 3].length"), 3.0);
    assert_eq!(eval_number("[1, 2, 3][0]"), 1.0);
    assert_eq!(eval_number("[[1, 2], [3]][1][0]"), 3.0);
    assert_eq!(eval_number("[1, 2, 3]['length']"), 3.0);
    assert!(eval("[1, 2][5]").is_undefined());
}

#[test]
fn test_object_members() {
    assert_eq!(eval_number("{a: 1}.a"), 1.0);
    assert_eq!(eval_number("{a: {b: 2}}.a.b"), 2.0);
    assert_eq!(eval_number("{'x y': 3}['x y']"), 3.0);
    assert_eq!(eval_number("{1: 4}[1]"), 4.0);
    assert!(eval("{a: 1}.b").is_undefined());
}

#[test]
fn test_duplicate_object_keys_last_value_wins() {
    assert_eq!(eval_number("{a: 1, a: 2}.a"), 2.0);
}

#[test]
fn test_member_access_on_missing_base_fails() {
    let err = eval_err("null.a");
    assert_eq!(err.kind, ErrorKind::RuntimeError);
    assert_eq!(err.message, "cannot read property 'a' of null");

    let err = eval_err("undefined[0]");
    assert_eq!(err.message, "cannot read property '0' of undefined");
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_last_statement_is_the_program_value() {
    assert_eq!(eval_number("1; 2; 3"), 3.0);
    assert!(eval("").is_undefined());
    assert!(eval(" ; ; ").is_undefined());
}

#[test]
fn test_statements_evaluate_in_order() {
    // An earlier failing statement stops the program.
    let err = eval_err("nope; 2");
    assert_eq!(err.kind, ErrorKind::RuntimeError);
}
