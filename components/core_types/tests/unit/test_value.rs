//! Unit tests for the Value enum, exercised through the crate's public
//! surface the way downstream components use it.

use core_types::{HeapLedger, HeapPayload, HeapRef, PayloadCell, PropertyTable, Value};
use std::sync::Arc;

fn ledger() -> Arc<HeapLedger> {
    HeapLedger::new(64 * 1024 * 1024)
}

fn text_value(ledger: &Arc<HeapLedger>, text: &str) -> Value {
    Value::String(HeapRef::new(PayloadCell::new(
        HeapPayload::Text(text.to_string()),
        ledger,
    )))
}

fn array_value(ledger: &Arc<HeapLedger>, elements: Vec<Value>) -> Value {
    Value::Array(HeapRef::new(PayloadCell::new(
        HeapPayload::Elements(elements),
        ledger,
    )))
}

fn object_value(ledger: &Arc<HeapLedger>, entries: Vec<(String, Value)>) -> Value {
    Value::Object(HeapRef::new(PayloadCell::new(
        HeapPayload::Properties(PropertyTable::from_entries(entries)),
        ledger,
    )))
}

#[cfg(test)]
mod value_construction_tests {
    use super::*;

    #[test]
    fn test_default_is_undefined() {
        assert!(Value::default().is_undefined());
    }

    #[test]
    fn test_from_f64() {
        let val: Value = 2.5f64.into();
        assert!(matches!(val, Value::Number(n) if n == 2.5));
    }

    #[test]
    fn test_from_i32_widens_to_number() {
        let val: Value = 7i32.into();
        assert!(matches!(val, Value::Number(n) if n == 7.0));
    }

    #[test]
    fn test_from_bool() {
        let val: Value = true.into();
        assert!(matches!(val, Value::Boolean(true)));
    }

    #[test]
    fn test_constructors_match_predicates() {
        assert!(Value::undefined().is_undefined());
        assert!(Value::null().is_null());
        assert!(Value::from_boolean(false).is_boolean());
        assert!(Value::from_number(0.0).is_number());
    }

    #[test]
    fn test_primitives_have_no_heap_ref() {
        assert!(Value::undefined().heap_ref().is_none());
        assert!(Value::null().heap_ref().is_none());
        assert!(Value::from_boolean(true).heap_ref().is_none());
        assert!(Value::from_number(1.0).heap_ref().is_none());
    }

    #[test]
    fn test_heap_values_have_a_heap_ref() {
        let l = ledger();
        assert!(text_value(&l, "x").heap_ref().is_some());
        assert!(array_value(&l, vec![]).heap_ref().is_some());
        assert!(object_value(&l, vec![]).heap_ref().is_some());
    }
}

#[cfg(test)]
mod value_equality_operator_tests {
    use super::*;

    #[test]
    fn test_eq_operator_is_strict() {
        let l = ledger();
        // `==` in Rust is `===` in the value domain: no coercion.
        assert_eq!(Value::from_number(42.0), Value::from_number(42.0));
        assert_ne!(Value::from_number(42.0), text_value(&l, "42"));
        assert!(Value::from_number(42.0).equals(&text_value(&l, "42")));
    }

    #[test]
    fn test_eq_operator_nan() {
        let nan = Value::from_number(f64::NAN);
        assert_ne!(nan, nan.clone());
        assert!(nan.same_value(&nan.clone()));
    }

    #[test]
    fn test_eq_operator_on_strings_compares_contents() {
        let l = ledger();
        assert_eq!(text_value(&l, "ab"), text_value(&l, "ab"));
        assert_ne!(text_value(&l, "ab"), text_value(&l, "ba"));
    }

    #[test]
    fn test_eq_operator_on_arrays_compares_identity() {
        let l = ledger();
        let arr = array_value(&l, vec![]);
        assert_eq!(arr, arr.clone());
        assert_ne!(arr, array_value(&l, vec![]));
    }
}

#[cfg(test)]
mod value_debug_format_tests {
    use super::*;

    #[test]
    fn test_debug_shows_the_tag() {
        assert_eq!(format!("{:?}", Value::undefined()), "Undefined");
        assert_eq!(format!("{:?}", Value::null()), "Null");
        assert_eq!(format!("{:?}", Value::from_boolean(true)), "Boolean(true)");
        assert_eq!(format!("{:?}", Value::from_number(42.0)), "Number(42)");
    }

    #[test]
    fn test_debug_shows_string_contents() {
        let l = ledger();
        assert_eq!(format!("{:?}", text_value(&l, "hi")), "String(\"hi\")");
    }

    #[test]
    fn test_debug_shows_collection_shape() {
        let l = ledger();
        let arr = array_value(&l, vec![Value::from_number(1.0)]);
        let rendered = format!("{:?}", arr);
        assert!(rendered.starts_with("Array(len=1"));
    }
}

#[cfg(test)]
mod value_display_tests {
    use super::*;

    #[test]
    fn test_display_of_primitives() {
        assert_eq!(Value::undefined().to_string(), "undefined");
        assert_eq!(Value::null().to_string(), "null");
        assert_eq!(Value::from_boolean(true).to_string(), "true");
        assert_eq!(Value::from_number(-3.5).to_string(), "-3.5");
    }

    #[test]
    fn test_display_of_nested_array() {
        let l = ledger();
        let inner = array_value(&l, vec![Value::from_number(2.0), Value::from_number(3.0)]);
        let outer = array_value(&l, vec![Value::from_number(1.0), inner]);
        assert_eq!(outer.to_string(), "1,2,3");
    }

    #[test]
    fn test_display_of_object_is_opaque() {
        let l = ledger();
        let obj = object_value(&l, vec![("a".to_string(), Value::from_number(1.0))]);
        assert_eq!(obj.to_string(), "[object Object]");
    }
}

#[cfg(test)]
mod value_collection_surface_tests {
    use super::*;

    #[test]
    fn test_object_properties_through_the_public_surface() {
        let l = ledger();
        let obj = object_value(&l, vec![("kind".to_string(), text_value(&l, "node"))]);
        assert!(obj.has_property("kind"));
        assert_eq!(obj.get_property("kind").to_string(), "node");
        assert!(obj.get_property("absent").is_undefined());

        obj.set_property("count", Value::from_number(2.0)).unwrap();
        assert_eq!(obj.get_property("count"), Value::from_number(2.0));
    }

    #[test]
    fn test_array_surface() {
        let l = ledger();
        let arr = array_value(&l, vec![Value::from_number(10.0)]);
        arr.push(Value::from_number(20.0)).unwrap();
        assert_eq!(arr.get_length().unwrap(), 2);
        assert_eq!(arr.get_element(1), Value::from_number(20.0));
        assert_eq!(arr.get_property("length"), Value::from_number(2.0));
        assert_eq!(arr.pop().unwrap(), Value::from_number(20.0));
    }

    #[test]
    fn test_aliases_observe_each_others_writes() {
        let l = ledger();
        let arr = array_value(&l, vec![]);
        let alias = arr.clone();
        arr.push(text_value(&l, "shared")).unwrap();
        assert_eq!(alias.get_length().unwrap(), 1);
        assert_eq!(alias.get_element(0).to_string(), "shared");
    }
}
