//! Value semantics across the engine boundary
//!
//! Verifies the arithmetic, coercion and identity behaviors embedders
//! observe, both through evaluated source and through the Value API on
//! an engine's heap.

use core_types::Value;
use integration_tests::{eval_bool, eval_number, eval_text, ready_engine};
use memory_manager::Heap;

/// Test: exact double arithmetic reaches the caller unchanged.
#[test]
fn test_numeric_evaluation_is_exact() {
    let engine = ready_engine();
    assert_eq!(eval_number(&engine, "42 + 58"), 100.0);
    assert_eq!(eval_number(&engine, "123 * 456"), 56088.0);
    assert_eq!(eval_number(&engine, "10 / 4"), 2.5);
    assert_eq!(eval_number(&engine, "2 + 3 * 4"), 14.0);
}

/// Test: string literals round-trip byte for byte.
#[test]
fn test_string_round_trip() {
    let engine = ready_engine();
    assert_eq!(eval_text(&engine, "\"Hello World!\""), "Hello World!");
    assert_eq!(eval_text(&engine, "'single quoted'"), "single quoted");
    assert_eq!(
        eval_text(&engine, "'Hello' + ' ' + 'World!'"),
        "Hello World!"
    );
}

/// Test: strict equality is reflexive and symmetric for numbers, and
/// NaN is never strictly equal to itself.
#[test]
fn test_strict_equals_properties() {
    let a = Value::from_number(42.0);
    let b = Value::from_number(42.0);
    assert!(a.strict_equals(&b));
    assert!(b.strict_equals(&a));
    assert!(a.strict_equals(&a));

    let nan = Value::from_number(f64::NAN);
    assert!(!nan.strict_equals(&nan));
}

/// Test: same_value differs from strict_equals exactly on NaN and
/// signed zero.
#[test]
fn test_same_value_vs_strict_equals() {
    let nan = Value::from_number(f64::NAN);
    assert!(nan.same_value(&nan));
    assert!(!nan.strict_equals(&nan));

    let pos = Value::from_number(0.0);
    let neg = Value::from_number(-0.0);
    assert!(pos.strict_equals(&neg));
    assert!(!pos.same_value(&neg));
}

/// Test: loose equality coerces across tags.
#[test]
fn test_equals_coerces_across_tags() {
    let heap = Heap::new();
    let forty_two = Value::from_number(42.0);
    let text = heap.alloc_text("42").unwrap();
    assert!(forty_two.equals(&text));
    assert!(text.equals(&forty_two));

    let engine = ready_engine();
    assert!(eval_bool(&engine, "1 == '1'"));
    assert!(!eval_bool(&engine, "1 === '1'"));
    assert!(eval_bool(&engine, "null == undefined"));
}

/// Test: push then pop returns the pushed value and restores length.
#[test]
fn test_push_pop_round_trip() {
    let heap = Heap::new();
    let array = heap
        .alloc_array(vec![Value::from_number(1.0), Value::from_number(2.0)])
        .unwrap();
    let before = array.get_length().unwrap();

    array.push(Value::from_number(99.0)).unwrap();
    assert_eq!(array.get_length().unwrap(), before + 1);

    let popped = array.pop().unwrap();
    assert!(popped.strict_equals(&Value::from_number(99.0)));
    assert_eq!(array.get_length().unwrap(), before);
}

/// Test: evaluated collections behave like hand-built ones.
#[test]
fn test_evaluated_and_built_collections_agree() {
    let engine = ready_engine();
    let evaluated = engine.evaluate("[1, 2, 3]");

    let values = engine.values().unwrap();
    let built = values
        .create_array_from(vec![
            Value::from_number(1.0),
            Value::from_number(2.0),
            Value::from_number(3.0),
        ])
        .unwrap();

    assert_eq!(evaluated.get_length().unwrap(), built.get_length().unwrap());
    assert_eq!(evaluated.to_string(), built.to_string());
    assert_eq!(evaluated.to_string(), "1,2,3");

    // Loose equality on two collections is identity, not contents.
    assert!(!evaluated.equals(&built));
    assert!(evaluated.equals(&evaluated.clone()));
}

/// Test: type_of matches JavaScript's typeof table.
#[test]
fn test_type_of_table() {
    let engine = ready_engine();
    assert_eq!(Value::undefined().type_of(), "undefined");
    assert_eq!(Value::null().type_of(), "object");
    assert_eq!(Value::from_boolean(true).type_of(), "boolean");
    assert_eq!(Value::from_number(1.0).type_of(), "number");
    assert_eq!(engine.evaluate("'s'").type_of(), "string");
    assert_eq!(engine.evaluate("[]").type_of(), "object");
    assert_eq!(engine.evaluate("{}").type_of(), "object");
}

/// Test: truthiness follows the JavaScript table.
#[test]
fn test_truthiness_table() {
    let engine = ready_engine();
    assert!(!Value::undefined().to_boolean());
    assert!(!Value::null().to_boolean());
    assert!(!Value::from_number(0.0).to_boolean());
    assert!(!Value::from_number(f64::NAN).to_boolean());
    assert!(Value::from_number(1.0).to_boolean());
    assert!(!engine.evaluate("''").to_boolean());
    assert!(engine.evaluate("'x'").to_boolean());
    assert!(engine.evaluate("[]").to_boolean());
}

/// Test: member access semantics hold end to end.
#[test]
fn test_member_access_end_to_end() {
    let engine = ready_engine();
    assert_eq!(eval_number(&engine, "'hello'.length"), 5.0);
    assert_eq!(eval_text(&engine, "'hello'[1]"), "e");
    assert_eq!(eval_number(&engine, "[1, 2, 3].length"), 3.0);
    assert_eq!(eval_number(&engine, "{a: {b: 2}}.a.b"), 2.0);
    assert!(engine.evaluate("{a: 1}.b").is_undefined());
}
