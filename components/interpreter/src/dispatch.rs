//! Expression dispatch for the tree-walking evaluator.
//!
//! Handles the JavaScript semantics of each expression form: literal
//! materialization on the heap, operator coercions, and member access.

use core_types::{js_number_to_string, js_string_to_number, EngineError, EngineResult, Value};
use memory_manager::Heap;
use parser::{BinaryOp, Expression, MemberProperty, Program, UnaryOp};

/// Executes statements in order; the last statement's value is the
/// program's value, `Undefined` for an empty program.
pub(crate) fn execute_program(heap: &Heap, program: &Program) -> EngineResult<Value> {
    let mut last = Value::undefined();
    for statement in &program.body {
        last = evaluate_expression(heap, statement)?;
    }
    Ok(last)
}

fn evaluate_expression(heap: &Heap, expr: &Expression) -> EngineResult<Value> {
    match expr {
        Expression::NumberLiteral { value, .. } => Ok(Value::from_number(*value)),
        Expression::StringLiteral { value, .. } => heap.alloc_text(value.clone()),
        Expression::BooleanLiteral { value, .. } => Ok(Value::from_boolean(*value)),
        Expression::NullLiteral { .. } => Ok(Value::null()),
        Expression::Identifier { name, .. } => resolve_identifier(name),
        Expression::ArrayLiteral { elements, .. } => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(evaluate_expression(heap, element)?);
            }
            heap.alloc_array(values)
        }
        Expression::ObjectLiteral { properties, .. } => {
            let mut entries = Vec::with_capacity(properties.len());
            for (key, value) in properties {
                entries.push((key.clone(), evaluate_expression(heap, value)?));
            }
            heap.alloc_object(entries)
        }
        Expression::Unary { op, operand, .. } => {
            let value = evaluate_expression(heap, operand)?;
            Ok(apply_unary(*op, &value))
        }
        Expression::Binary {
            op, left, right, ..
        } => {
            let lhs = evaluate_expression(heap, left)?;
            let rhs = evaluate_expression(heap, right)?;
            apply_binary(heap, *op, &lhs, &rhs)
        }
        Expression::Member {
            object, property, ..
        } => {
            let target = evaluate_expression(heap, object)?;
            match property {
                MemberProperty::Static(name) => read_member(heap, &target, name),
                MemberProperty::Computed(index) => {
                    let key = evaluate_expression(heap, index)?;
                    read_computed_member(heap, &target, &key)
                }
            }
        }
    }
}

/// The evaluated subset has no variable bindings; only the global
/// value-like names resolve.
fn resolve_identifier(name: &str) -> EngineResult<Value> {
    match name {
        "undefined" => Ok(Value::undefined()),
        "NaN" => Ok(Value::from_number(f64::NAN)),
        "Infinity" => Ok(Value::from_number(f64::INFINITY)),
        _ => Err(EngineError::runtime_error(format!(
            "'{}' is not defined",
            name
        ))),
    }
}

fn apply_unary(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Negate => Value::from_number(-value.to_number()),
        UnaryOp::Plus => Value::from_number(value.to_number()),
        UnaryOp::Not => Value::from_boolean(!value.to_boolean()),
    }
}

fn apply_binary(heap: &Heap, op: BinaryOp, lhs: &Value, rhs: &Value) -> EngineResult<Value> {
    match op {
        BinaryOp::Add => add_values(heap, lhs, rhs),
        BinaryOp::Subtract => Ok(Value::from_number(lhs.to_number() - rhs.to_number())),
        BinaryOp::Multiply => Ok(Value::from_number(lhs.to_number() * rhs.to_number())),
        // IEEE-754 division: x/0 is an infinity, 0/0 is NaN.
        BinaryOp::Divide => Ok(Value::from_number(lhs.to_number() / rhs.to_number())),
        BinaryOp::Remainder => Ok(Value::from_number(lhs.to_number() % rhs.to_number())),
        BinaryOp::Equals => Ok(Value::from_boolean(lhs.equals(rhs))),
        BinaryOp::NotEquals => Ok(Value::from_boolean(!lhs.equals(rhs))),
        BinaryOp::StrictEquals => Ok(Value::from_boolean(lhs.strict_equals(rhs))),
        BinaryOp::StrictNotEquals => Ok(Value::from_boolean(!lhs.strict_equals(rhs))),
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            Ok(Value::from_boolean(compare(op, lhs, rhs)))
        }
    }
}

/// JavaScript `+`: concatenation when either operand converts to a string,
/// numeric addition otherwise.
fn add_values(heap: &Heap, lhs: &Value, rhs: &Value) -> EngineResult<Value> {
    if prefers_string(lhs) || prefers_string(rhs) {
        return heap.alloc_text(format!("{}{}", lhs, rhs));
    }
    Ok(Value::from_number(lhs.to_number() + rhs.to_number()))
}

// Arrays and objects convert through their string form, like strings.
fn prefers_string(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Array(_) | Value::Object(_))
}

enum ComparisonOperand {
    Numeric(f64),
    Text(String),
}

fn comparison_operand(value: &Value) -> ComparisonOperand {
    match value {
        Value::String(_) | Value::Array(_) | Value::Object(_) => {
            ComparisonOperand::Text(value.to_string())
        }
        other => ComparisonOperand::Numeric(other.to_number()),
    }
}

/// Relational comparison: two string-like operands sort lexicographically,
/// any other pairing compares numerically (every comparison involving NaN
/// is false).
fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> bool {
    match (comparison_operand(lhs), comparison_operand(rhs)) {
        (ComparisonOperand::Text(a), ComparisonOperand::Text(b)) => match op {
            BinaryOp::Less => a < b,
            BinaryOp::LessEqual => a <= b,
            BinaryOp::Greater => a > b,
            BinaryOp::GreaterEqual => a >= b,
            _ => false,
        },
        (a, b) => {
            let a = operand_number(a);
            let b = operand_number(b);
            match op {
                BinaryOp::Less => a < b,
                BinaryOp::LessEqual => a <= b,
                BinaryOp::Greater => a > b,
                BinaryOp::GreaterEqual => a >= b,
                _ => false,
            }
        }
    }
}

fn operand_number(operand: ComparisonOperand) -> f64 {
    match operand {
        ComparisonOperand::Numeric(n) => n,
        ComparisonOperand::Text(t) => js_string_to_number(&t),
    }
}

fn read_member(heap: &Heap, target: &Value, name: &str) -> EngineResult<Value> {
    match target {
        Value::Undefined | Value::Null => Err(missing_base(target, name)),
        Value::String(_) => {
            if name == "length" {
                Ok(target.get_property("length"))
            } else if let Ok(index) = name.parse::<usize>() {
                string_char_at(heap, target, index)
            } else {
                Ok(Value::undefined())
            }
        }
        _ => Ok(target.get_property(name)),
    }
}

fn read_computed_member(heap: &Heap, target: &Value, key: &Value) -> EngineResult<Value> {
    if matches!(target, Value::Undefined | Value::Null) {
        return Err(missing_base(target, &key.to_string()));
    }
    if let Value::Number(n) = key {
        if n.fract() == 0.0 && *n >= 0.0 && *n < u32::MAX as f64 {
            let index = *n as usize;
            return match target {
                Value::Array(_) => Ok(target.get_element(index)),
                Value::String(_) => string_char_at(heap, target, index),
                _ => Ok(target.get_property(&js_number_to_string(*n))),
            };
        }
    }
    read_member(heap, target, &key.to_string())
}

/// Indexing a string materializes a fresh one-character string.
fn string_char_at(heap: &Heap, target: &Value, index: usize) -> EngineResult<Value> {
    let text = target.to_string();
    match text.chars().nth(index) {
        Some(c) => heap.alloc_text(c.to_string()),
        None => Ok(Value::undefined()),
    }
}

fn missing_base(target: &Value, name: &str) -> EngineError {
    let base = if target.is_null() {
        "null"
    } else {
        "undefined"
    };
    EngineError::runtime_error(format!("cannot read property '{}' of {}", name, base))
}
