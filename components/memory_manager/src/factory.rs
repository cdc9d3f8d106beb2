//! Convenience constructors for heap-backed values.

use core_types::{EngineResult, Value};

use crate::heap::Heap;

/// Allocates strings, arrays and objects on a shared heap.
///
/// A thin handle embedders use to build values without touching payload
/// types directly. Cloning the collection shares the heap.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use memory_manager::{Heap, ValueCollection};
///
/// let values = ValueCollection::new(Heap::new());
/// let object = values
///     .create_object([("answer".to_string(), Value::from_number(42.0))])
///     .unwrap();
/// assert_eq!(object.get_property("answer").to_string(), "42");
/// ```
#[derive(Debug, Clone)]
pub struct ValueCollection {
    heap: Heap,
}

impl ValueCollection {
    /// Creates a collection allocating on `heap`.
    pub fn new(heap: Heap) -> Self {
        Self { heap }
    }

    /// The heap this collection allocates on.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Allocates a string value.
    pub fn create_string(&self, text: impl Into<String>) -> EngineResult<Value> {
        self.heap.alloc_text(text)
    }

    /// Allocates an empty array value.
    pub fn create_array(&self) -> EngineResult<Value> {
        self.heap.alloc_array(Vec::new())
    }

    /// Allocates an array value with the given elements.
    pub fn create_array_from(&self, elements: Vec<Value>) -> EngineResult<Value> {
        self.heap.alloc_array(elements)
    }

    /// Allocates an object value from key/value entries.
    ///
    /// Pass an empty mapping for an empty object. Duplicate keys keep
    /// the first position and the last value.
    pub fn create_object(
        &self,
        mapping: impl IntoIterator<Item = (String, Value)>,
    ) -> EngineResult<Value> {
        self.heap.alloc_object(mapping)
    }
}
