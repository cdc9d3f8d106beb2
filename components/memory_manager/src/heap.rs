//! Heap allocation and byte accounting.
//!
//! The heap owns every payload cell behind `String`/`Array`/`Object` values
//! and charges each cell's footprint against a fixed memory limit. When an
//! allocation would cross the limit, the heap runs a collection pass and
//! retries once; if the bytes still do not fit, the allocation fails with
//! `MemoryLimitExceeded`. Reported usage therefore never exceeds the limit.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use core_types::{
    payload_footprint, EngineError, EngineResult, HeapLedger, HeapPayload, HeapRef, PayloadCell,
    PropertyTable, Value,
};

use crate::collector::{self, CollectionOutcome};

/// Point-in-time view of heap accounting.
#[derive(Debug, Clone, Default)]
pub struct HeapStats {
    /// Bytes currently charged against the limit
    pub bytes_in_use: usize,
    /// Configured memory limit in bytes
    pub memory_limit: usize,
    /// Payload cells currently owned by the heap
    pub live_cells: usize,
    /// Completed collection passes
    pub collections: u64,
    /// Cells freed across all passes
    pub cells_freed: u64,
    /// Bytes returned to the ledger across all passes
    pub bytes_freed: u64,
    /// Duration of the most recent pass in microseconds
    pub last_collection_micros: u64,
}

#[derive(Debug)]
pub(crate) struct HeapShared {
    pub(crate) ledger: Arc<HeapLedger>,
    pub(crate) cells: Mutex<HashMap<u64, Arc<PayloadCell>>>,
    pub(crate) collections: AtomicU64,
    pub(crate) cells_freed: AtomicU64,
    pub(crate) bytes_freed: AtomicU64,
    pub(crate) last_collection_micros: AtomicU64,
}

/// A garbage-collected heap with a fixed memory limit.
///
/// Cloning the handle shares the underlying heap. Allocation serializes on
/// the cell table; a collection pass additionally freezes payload mutation
/// and reference extraction for its duration, while coercions and
/// comparisons on existing values proceed unblocked.
///
/// # Examples
///
/// ```
/// use memory_manager::Heap;
///
/// let heap = Heap::with_memory_limit(16 * 1024 * 1024);
/// let text = heap.alloc_text("hello").unwrap();
/// assert_eq!(text.to_string(), "hello");
/// assert!(heap.bytes_in_use() <= heap.memory_limit());
/// ```
#[derive(Clone)]
pub struct Heap {
    shared: Arc<HeapShared>,
}

impl Heap {
    /// Default memory limit: 1 GiB.
    pub const DEFAULT_MEMORY_LIMIT: usize = 1024 * 1024 * 1024;

    /// Creates a heap with the default memory limit.
    pub fn new() -> Self {
        Self::with_memory_limit(Self::DEFAULT_MEMORY_LIMIT)
    }

    /// Creates a heap with the given memory limit in bytes.
    pub fn with_memory_limit(memory_limit: usize) -> Self {
        Self {
            shared: Arc::new(HeapShared {
                ledger: HeapLedger::new(memory_limit),
                cells: Mutex::new(HashMap::new()),
                collections: AtomicU64::new(0),
                cells_freed: AtomicU64::new(0),
                bytes_freed: AtomicU64::new(0),
                last_collection_micros: AtomicU64::new(0),
            }),
        }
    }

    /// The configured memory limit in bytes.
    pub fn memory_limit(&self) -> usize {
        self.shared.ledger.memory_limit()
    }

    /// Bytes currently charged against the limit.
    ///
    /// Never exceeds [`memory_limit`](Heap::memory_limit); non-decreasing
    /// between collection passes and non-increasing across one.
    pub fn bytes_in_use(&self) -> usize {
        self.shared.ledger.bytes_in_use()
    }

    /// Number of payload cells currently owned by the heap.
    pub fn live_cells(&self) -> usize {
        self.shared.cells.lock().len()
    }

    /// Allocates a string payload.
    pub fn alloc_text(&self, text: impl Into<String>) -> EngineResult<Value> {
        self.allocate(HeapPayload::Text(text.into()))
            .map(Value::String)
    }

    /// Allocates an array payload with the given elements.
    pub fn alloc_array(&self, elements: Vec<Value>) -> EngineResult<Value> {
        self.allocate(HeapPayload::Elements(elements))
            .map(Value::Array)
    }

    /// Allocates an object payload from key/value entries.
    ///
    /// Duplicate keys keep the first position and the last value.
    pub fn alloc_object(
        &self,
        entries: impl IntoIterator<Item = (String, Value)>,
    ) -> EngineResult<Value> {
        self.allocate(HeapPayload::Properties(PropertyTable::from_entries(
            entries,
        )))
        .map(Value::Object)
    }

    /// Runs a full mark-and-sweep pass.
    ///
    /// Safe to invoke concurrently with evaluations; allocation and payload
    /// mutation wait for the pass, read-only operations do not. Work is
    /// bounded by the number of live cells.
    pub fn collect_garbage(&self) -> CollectionOutcome {
        let mut cells = self.shared.cells.lock();
        collector::run_locked(&self.shared, &mut cells)
    }

    /// Snapshot of the heap's accounting counters.
    pub fn stats(&self) -> HeapStats {
        HeapStats {
            bytes_in_use: self.bytes_in_use(),
            memory_limit: self.memory_limit(),
            live_cells: self.live_cells(),
            collections: self.shared.collections.load(Ordering::Relaxed),
            cells_freed: self.shared.cells_freed.load(Ordering::Relaxed),
            bytes_freed: self.shared.bytes_freed.load(Ordering::Relaxed),
            last_collection_micros: self.shared.last_collection_micros.load(Ordering::Relaxed),
        }
    }

    fn allocate(&self, payload: HeapPayload) -> EngineResult<HeapRef> {
        let bytes = payload_footprint(&payload);
        let mut cells = self.shared.cells.lock();
        if !self.shared.ledger.try_reserve(bytes) {
            collector::run_locked(&self.shared, &mut cells);
            if !self.shared.ledger.try_reserve(bytes) {
                return Err(EngineError::memory_limit_exceeded(format!(
                    "allocation of {} bytes denied ({} of {} bytes in use)",
                    bytes,
                    self.shared.ledger.bytes_in_use(),
                    self.shared.ledger.memory_limit()
                )));
            }
        }
        let cell = PayloadCell::new(payload, &self.shared.ledger);
        cells.insert(cell.id(), Arc::clone(&cell));
        Ok(HeapRef::new(cell))
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("bytes_in_use", &self.bytes_in_use())
            .field("memory_limit", &self.memory_limit())
            .field("live_cells", &self.live_cells())
            .finish()
    }
}
