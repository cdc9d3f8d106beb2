//! JavaScript value representation.
//!
//! This module provides the engine's universal tagged value type.
//!
//! # Overview
//!
//! - Primitive tags (`Undefined`, `Null`, `Boolean`, `Number`) are
//!   self-contained and copy freely.
//! - `String`/`Array`/`Object` reference heap-owned payload cells; cloning a
//!   value aliases the payload, and the heap's collector decides payload
//!   lifetime.
//! - Coercions (`to_boolean`, `to_number`, `Display`) follow JavaScript's
//!   abstract conversion rules.
//! - The equality family (`strict_equals`, `equals`, `same_value`) implements
//!   the three JavaScript comparison algorithms.

use std::cell::RefCell;
use std::fmt;

use crate::payload::{HeapPayload, HeapRef};
use crate::{EngineError, EngineResult};

/// A JavaScript value.
///
/// Exactly one tag is active at a time. `Number` follows IEEE-754 double
/// semantics including signed zero and NaN.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let n = Value::from_number(42.0);
/// assert!(n.is_number());
/// assert_eq!(n.type_of(), "number");
/// assert_eq!(n.to_string(), "42");
/// ```
#[derive(Clone)]
pub enum Value {
    /// The undefined value
    Undefined,
    /// The null value
    Null,
    /// A boolean
    Boolean(bool),
    /// An IEEE-754 double
    Number(f64),
    /// A reference to a heap-owned string payload
    String(HeapRef),
    /// A reference to a heap-owned array payload
    Array(HeapRef),
    /// A reference to a heap-owned object payload
    Object(HeapRef),
}

impl Value {
    /// The undefined value.
    pub fn undefined() -> Self {
        Value::Undefined
    }

    /// The null value.
    pub fn null() -> Self {
        Value::Null
    }

    /// Builds a boolean value.
    pub fn from_boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Builds a number value.
    pub fn from_number(value: f64) -> Self {
        Value::Number(value)
    }

    /// Returns true for `Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for `Boolean`.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    /// Returns true for `Number`.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns true for `String`.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns true for `Array`.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns true for `Object`.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// The JavaScript `typeof` string for this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Object(_) => "object",
        }
    }

    /// JavaScript ToBoolean.
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(r) => with_text(r, |text| !text.is_empty()),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// JavaScript ToNumber.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(r) => with_text(r, js_string_to_number),
            Value::Array(_) | Value::Object(_) => js_string_to_number(&self.to_string()),
        }
    }

    /// JavaScript strict equality (`===`).
    ///
    /// Same tag and same value, no coercion. `NaN !== NaN`; `+0 === -0`.
    /// Strings compare by contents; arrays and objects by payload identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => string_contents_equal(a, b),
            (Value::Array(a), Value::Array(b)) => a.same_cell(b),
            (Value::Object(a), Value::Object(b)) => a.same_cell(b),
            _ => false,
        }
    }

    /// JavaScript abstract (loose) equality (`==`).
    ///
    /// Coerces across mismatched primitive tags before comparing; `null` and
    /// `undefined` equal each other and nothing else.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined)
            | (Value::Null, Value::Null)
            | (Value::Undefined, Value::Null)
            | (Value::Null, Value::Undefined) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Boolean(_), _) => Value::from_number(self.to_number()).equals(other),
            (_, Value::Boolean(_)) => self.equals(&Value::from_number(other.to_number())),
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => string_contents_equal(a, b),
            (Value::Number(n), Value::String(_)) => *n == other.to_number(),
            (Value::String(_), Value::Number(n)) => self.to_number() == *n,
            (Value::Array(a), Value::Array(b)) => a.same_cell(b),
            (Value::Object(a), Value::Object(b)) => a.same_cell(b),
            (Value::Array(_) | Value::Object(_), _) => heap_equals_primitive(self, other),
            (_, Value::Array(_) | Value::Object(_)) => heap_equals_primitive(other, self),
        }
    }

    /// JavaScript SameValue.
    ///
    /// Like [`strict_equals`](Value::strict_equals), except `NaN` equals
    /// `NaN` and `+0` does not equal `-0`.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a.to_bits() == b.to_bits()
                }
            }
            _ => self.strict_equals(other),
        }
    }

    /// Appends a value to the referenced array payload.
    ///
    /// # Errors
    ///
    /// `RuntimeError` when the value is not an array; `MemoryLimitExceeded`
    /// when growing the backing storage would cross the heap's limit.
    pub fn push(&self, value: Value) -> EngineResult<()> {
        let cell = match self {
            Value::Array(r) => r.cell(),
            _ => {
                return Err(EngineError::runtime_error(format!(
                    "cannot push onto {}",
                    self.type_of()
                )))
            }
        };
        let _gate = cell.ledger().mutation_gate.read();
        let mut data = cell.write();
        match &mut *data {
            HeapPayload::Elements(elements) => {
                if elements.len() == elements.capacity() {
                    let additional = elements.capacity().max(4);
                    let bytes = additional * std::mem::size_of::<Value>();
                    if !cell.ledger().try_reserve(bytes) {
                        return Err(EngineError::memory_limit_exceeded(format!(
                            "array growth of {} bytes denied",
                            bytes
                        )));
                    }
                    elements.reserve_exact(additional);
                    cell.add_bytes(bytes);
                }
                elements.push(value);
                Ok(())
            }
            _ => Err(EngineError::internal_error("array payload mismatch")),
        }
    }

    /// Removes and returns the last element of the referenced array payload.
    ///
    /// # Errors
    ///
    /// `RuntimeError`("pop of empty array") when the array is empty;
    /// `RuntimeError` when the value is not an array.
    pub fn pop(&self) -> EngineResult<Value> {
        let cell = match self {
            Value::Array(r) => r.cell(),
            _ => {
                return Err(EngineError::runtime_error(format!(
                    "cannot pop from {}",
                    self.type_of()
                )))
            }
        };
        let _gate = cell.ledger().mutation_gate.read();
        let mut data = cell.write();
        match &mut *data {
            HeapPayload::Elements(elements) => elements
                .pop()
                .ok_or_else(|| EngineError::runtime_error("pop of empty array")),
            _ => Err(EngineError::internal_error("array payload mismatch")),
        }
    }

    /// Length of an array (element count) or string (character count).
    ///
    /// # Errors
    ///
    /// `RuntimeError` for any other tag.
    pub fn get_length(&self) -> EngineResult<usize> {
        match self {
            Value::Array(r) => match &*r.cell().read() {
                HeapPayload::Elements(elements) => Ok(elements.len()),
                _ => Err(EngineError::internal_error("array payload mismatch")),
            },
            Value::String(r) => Ok(with_text(r, |text| text.chars().count())),
            _ => Err(EngineError::runtime_error(format!(
                "cannot get length of {}",
                self.type_of()
            ))),
        }
    }

    /// Returns true if the value has the named property.
    ///
    /// Objects report own properties; arrays report `length` and in-bounds
    /// indices; strings report `length` and in-bounds indices.
    pub fn has_property(&self, key: &str) -> bool {
        match self {
            Value::Object(r) => match &*r.cell().read() {
                HeapPayload::Properties(table) => table.has(key),
                _ => false,
            },
            Value::Array(r) => {
                if key == "length" {
                    return true;
                }
                match &*r.cell().read() {
                    HeapPayload::Elements(elements) => key
                        .parse::<usize>()
                        .map(|index| index < elements.len())
                        .unwrap_or(false),
                    _ => false,
                }
            }
            Value::String(r) => {
                if key == "length" {
                    return true;
                }
                with_text(r, |text| {
                    key.parse::<usize>()
                        .map(|index| index < text.chars().count())
                        .unwrap_or(false)
                })
            }
            _ => false,
        }
    }

    /// Reads a property, returning `Undefined` for missing keys.
    ///
    /// Never fails: property access on primitives yields `Undefined`.
    pub fn get_property(&self, key: &str) -> Value {
        match self {
            Value::Object(r) => clone_out(r, |data| match data {
                HeapPayload::Properties(table) => {
                    table.get(key).cloned().unwrap_or(Value::Undefined)
                }
                _ => Value::Undefined,
            }),
            Value::Array(r) => clone_out(r, |data| match data {
                HeapPayload::Elements(elements) => {
                    if key == "length" {
                        Value::from_number(elements.len() as f64)
                    } else {
                        key.parse::<usize>()
                            .ok()
                            .and_then(|index| elements.get(index).cloned())
                            .unwrap_or(Value::Undefined)
                    }
                }
                _ => Value::Undefined,
            }),
            Value::String(r) => {
                if key == "length" {
                    Value::from_number(with_text(r, |text| text.chars().count()) as f64)
                } else {
                    Value::Undefined
                }
            }
            _ => Value::Undefined,
        }
    }

    /// Reads an array element, returning `Undefined` out of bounds or for
    /// non-arrays.
    pub fn get_element(&self, index: usize) -> Value {
        match self {
            Value::Array(r) => clone_out(r, |data| match data {
                HeapPayload::Elements(elements) => {
                    elements.get(index).cloned().unwrap_or(Value::Undefined)
                }
                _ => Value::Undefined,
            }),
            _ => Value::Undefined,
        }
    }

    /// Writes a property on the referenced object payload.
    ///
    /// A new key is appended (insertion order preserved); an existing key
    /// keeps its position and gets the new value.
    ///
    /// # Errors
    ///
    /// `RuntimeError` when the value is not an object; `MemoryLimitExceeded`
    /// when growing the property table would cross the heap's limit.
    pub fn set_property(&self, key: impl Into<String>, value: Value) -> EngineResult<()> {
        let cell = match self {
            Value::Object(r) => r.cell(),
            _ => {
                return Err(EngineError::runtime_error(format!(
                    "cannot set property on {}",
                    self.type_of()
                )))
            }
        };
        let key = key.into();
        let _gate = cell.ledger().mutation_gate.read();
        let mut data = cell.write();
        match &mut *data {
            HeapPayload::Properties(table) => {
                if let Some(index) = table.position(&key) {
                    table.replace_at(index, value);
                    return Ok(());
                }
                let mut extra = key.len();
                let growth = if table.len() == table.capacity() {
                    table.capacity().max(4)
                } else {
                    0
                };
                extra += growth * std::mem::size_of::<(String, Value)>();
                if extra > 0 && !cell.ledger().try_reserve(extra) {
                    return Err(EngineError::memory_limit_exceeded(format!(
                        "object growth of {} bytes denied",
                        extra
                    )));
                }
                if growth > 0 {
                    table.reserve_exact(growth);
                }
                table.push_entry(key, value);
                cell.add_bytes(extra);
                Ok(())
            }
            _ => Err(EngineError::internal_error("object payload mismatch")),
        }
    }

    /// The payload reference behind a heap-backed value, or `None` for
    /// primitives.
    pub fn heap_ref(&self) -> Option<&HeapRef> {
        match self {
            Value::String(r) | Value::Array(r) | Value::Object(r) => Some(r),
            _ => None,
        }
    }

    /// The payload's monotonic allocation id, or `None` for primitives.
    pub fn allocation_id(&self) -> Option<u64> {
        self.heap_ref().map(HeapRef::id)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(r) => with_text(r, |text| write!(f, "String({:?})", text)),
            Value::Array(r) => match &*r.cell().read() {
                HeapPayload::Elements(elements) => {
                    write!(f, "Array(len={}, id={})", elements.len(), r.id())
                }
                _ => write!(f, "Array(id={})", r.id()),
            },
            Value::Object(r) => match &*r.cell().read() {
                HeapPayload::Properties(table) => {
                    write!(f, "Object(props={}, id={})", table.len(), r.id())
                }
                _ => write!(f, "Object(id={})", r.id()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", js_number_to_string(*n)),
            Value::String(r) => with_text(r, |text| f.write_str(text)),
            Value::Array(r) => {
                let Some(_guard) = DisplayGuard::enter(r.id()) else {
                    // Cycle back to an array already being rendered.
                    return Ok(());
                };
                let elements = clone_out(r, |data| match data {
                    HeapPayload::Elements(elements) => elements.clone(),
                    _ => Vec::new(),
                });
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    match element {
                        Value::Undefined | Value::Null => {}
                        other => write!(f, "{}", other)?,
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
        }
    }
}

thread_local! {
    static DISPLAY_BUSY: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Marks an array payload as being rendered on this thread, so cyclic
/// payload graphs terminate the way JavaScript's `Array.prototype.join`
/// does (the cycle renders as an empty string).
struct DisplayGuard {
    id: u64,
}

impl DisplayGuard {
    fn enter(id: u64) -> Option<Self> {
        DISPLAY_BUSY.with(|busy| {
            let mut busy = busy.borrow_mut();
            if busy.contains(&id) {
                None
            } else {
                busy.push(id);
                Some(DisplayGuard { id })
            }
        })
    }
}

impl Drop for DisplayGuard {
    fn drop(&mut self) {
        DISPLAY_BUSY.with(|busy| {
            let mut busy = busy.borrow_mut();
            if let Some(index) = busy.iter().rposition(|&id| id == self.id) {
                busy.swap_remove(index);
            }
        });
    }
}

fn with_text<R>(r: &HeapRef, f: impl FnOnce(&str) -> R) -> R {
    match &*r.cell().read() {
        HeapPayload::Text(text) => f(text),
        _ => f(""),
    }
}

// Extraction discipline: cloning values out of a payload holds the ledger's
// mutation gate shared, so a collection pass observes a frozen reference
// graph while it scans for roots. Coercions and comparisons that do not
// extract references stay off the gate.
fn clone_out<R>(r: &HeapRef, f: impl FnOnce(&HeapPayload) -> R) -> R {
    let cell = r.cell();
    let _gate = cell.ledger().mutation_gate.read();
    let data = cell.read();
    f(&data)
}

fn string_contents_equal(a: &HeapRef, b: &HeapRef) -> bool {
    if a.same_cell(b) {
        return true;
    }
    with_text(a, |left| with_text(b, |right| left == right))
}

fn heap_equals_primitive(heap_value: &Value, primitive: &Value) -> bool {
    let text = heap_value.to_string();
    match primitive {
        Value::Number(n) => js_string_to_number(&text) == *n,
        Value::String(r) => with_text(r, |contents| text == contents),
        _ => false,
    }
}

/// JavaScript ToString for numbers.
pub fn js_number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{}", n)
}

/// JavaScript ToNumber for string contents.
pub fn js_string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if digits.is_empty() {
            return f64::NAN;
        }
        let mut acc = 0.0f64;
        for c in digits.chars() {
            match c.to_digit(16) {
                Some(d) => acc = acc * 16.0 + d as f64,
                None => return f64::NAN,
            }
        }
        return acc;
    }
    // Rust's float parser accepts "inf"/"nan" spellings that JavaScript
    // rejects; a decimal numeric literal never contains these letters.
    if trimmed
        .bytes()
        .any(|b| matches!(b, b'i' | b'I' | b'n' | b'N'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
