//! Heap payload cells shared between values and the collector.
//!
//! Every `String`/`Array`/`Object` value references a [`PayloadCell`] owned
//! by the heap. The cell carries the payload data behind its own lock, the
//! mark color used by the collector, a monotonic allocation id, and its byte
//! footprint. A [`HeapLedger`] is shared by all cells of one heap and tracks
//! aggregate usage against the configured memory limit.
//!
//! Lock discipline: in-place payload mutations, and reads that clone child
//! values out of a payload, hold the ledger's mutation gate shared together
//! with exactly one cell lock; a collection pass holds the gate exclusively,
//! which freezes both the payload graph and the set of externally held
//! references for the duration of its root scan. Coercions, comparisons and
//! length queries take only the cell lock and are never blocked by a
//! collection.

use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Value;

/// Tri-color mark state used by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkColor {
    /// Not yet reached; candidate for sweeping
    White,
    /// Reached but children not yet scanned
    Gray,
    /// Reached and fully scanned
    Black,
}

/// An atomically updated [`MarkColor`].
#[derive(Debug)]
pub struct AtomicMarkColor(AtomicU8);

impl AtomicMarkColor {
    /// Creates a new atomic color starting at white.
    pub fn new() -> Self {
        Self(AtomicU8::new(MarkColor::White as u8))
    }

    /// Loads the current color.
    pub fn load(&self) -> MarkColor {
        match self.0.load(Ordering::Acquire) {
            0 => MarkColor::White,
            1 => MarkColor::Gray,
            _ => MarkColor::Black,
        }
    }

    /// Stores a new color.
    pub fn store(&self, color: MarkColor) {
        self.0.store(color as u8, Ordering::Release);
    }
}

impl Default for AtomicMarkColor {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared accounting state for one heap.
///
/// The ledger enforces the memory limit: every byte a payload occupies must
/// be reserved here first, and a reservation never lets usage cross the
/// limit, including under concurrent growth.
#[derive(Debug)]
pub struct HeapLedger {
    /// Serializes payload mutations and reference extraction (shared side)
    /// against collection passes (exclusive side). Reads that do not clone a
    /// reference out of a payload stay off this gate.
    pub mutation_gate: RwLock<()>,
    bytes_in_use: AtomicUsize,
    memory_limit: usize,
    next_allocation_id: AtomicU64,
}

impl HeapLedger {
    /// Creates a ledger with the given memory limit in bytes.
    pub fn new(memory_limit: usize) -> Arc<Self> {
        Arc::new(Self {
            mutation_gate: RwLock::new(()),
            bytes_in_use: AtomicUsize::new(0),
            memory_limit,
            next_allocation_id: AtomicU64::new(1),
        })
    }

    /// The configured memory limit in bytes.
    pub fn memory_limit(&self) -> usize {
        self.memory_limit
    }

    /// Aggregate bytes currently reserved by live payloads.
    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use.load(Ordering::Acquire)
    }

    /// Reserves `bytes` against the limit.
    ///
    /// Returns false without reserving anything if the reservation would
    /// push usage past the limit.
    pub fn try_reserve(&self, bytes: usize) -> bool {
        let mut current = self.bytes_in_use.load(Ordering::Relaxed);
        loop {
            let requested = match current.checked_add(bytes) {
                Some(total) if total <= self.memory_limit => total,
                _ => return false,
            };
            match self.bytes_in_use.compare_exchange_weak(
                current,
                requested,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Returns previously reserved bytes to the ledger.
    pub fn release(&self, bytes: usize) {
        self.bytes_in_use.fetch_sub(bytes, Ordering::AcqRel);
    }

    /// Hands out the next monotonic allocation id.
    pub fn next_allocation_id(&self) -> u64 {
        self.next_allocation_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// An insertion-ordered string-keyed property table.
///
/// Keys keep the position of their first insertion; overwriting a value does
/// not move the key.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    entries: Vec<(String, Value)>,
}

impl PropertyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from entries, last value winning for duplicate keys
    /// while the first occurrence keeps its position.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut table = Self::new();
        for (key, value) in entries {
            if let Some(index) = table.position(&key) {
                table.entries[index].1 = value;
            } else {
                table.entries.push((key, value));
            }
        }
        table
    }

    /// Index of `key`, if present.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Looks up a property value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Returns true if `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Replaces the value at a known index.
    pub fn replace_at(&mut self, index: usize, value: Value) {
        self.entries[index].1 = value;
    }

    /// Appends a new entry. The caller is responsible for capacity and byte
    /// accounting.
    pub fn push_entry(&mut self, key: String, value: Value) {
        self.entries.push((key, value));
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry capacity of the backing storage.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Grows the backing storage by exactly `additional` entry slots.
    pub fn reserve_exact(&mut self, additional: usize) {
        self.entries.reserve_exact(additional);
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// The backing data of one heap payload.
#[derive(Debug, Clone)]
pub enum HeapPayload {
    /// String contents
    Text(String),
    /// Array elements
    Elements(Vec<Value>),
    /// Object properties
    Properties(PropertyTable),
}

impl HeapPayload {
    /// Bytes occupied by the payload contents (excluding the cell itself).
    pub fn content_bytes(&self) -> usize {
        match self {
            HeapPayload::Text(text) => text.capacity(),
            HeapPayload::Elements(elements) => {
                elements.capacity() * std::mem::size_of::<Value>()
            }
            HeapPayload::Properties(table) => {
                let slots = table.capacity() * std::mem::size_of::<(String, Value)>();
                let keys: usize = table.iter().map(|(k, _)| k.len()).sum();
                slots + keys
            }
        }
    }

    /// Short kind name used in debug output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            HeapPayload::Text(_) => "string",
            HeapPayload::Elements(_) => "array",
            HeapPayload::Properties(_) => "object",
        }
    }
}

/// A heap-owned payload cell.
///
/// Cells are created by the heap, shared by reference from values, and freed
/// by the collector. The cell's byte footprint is kept in sync with the
/// ledger: the creator reserves the initial footprint, mutations reserve
/// their growth, and [`PayloadCell::clear_payload`] releases everything.
#[derive(Debug)]
pub struct PayloadCell {
    data: RwLock<HeapPayload>,
    mark: AtomicMarkColor,
    id: u64,
    bytes: AtomicUsize,
    ledger: Arc<HeapLedger>,
}

/// Base footprint of one cell, charged on top of payload contents.
pub fn cell_base_bytes() -> usize {
    std::mem::size_of::<PayloadCell>()
}

/// Full footprint a payload will occupy once wrapped in a cell.
pub fn payload_footprint(payload: &HeapPayload) -> usize {
    cell_base_bytes() + payload.content_bytes()
}

impl PayloadCell {
    /// Wraps a payload in a new cell.
    ///
    /// The footprint returned by [`payload_footprint`] must already be
    /// reserved with the ledger; the cell takes ownership of that
    /// reservation and releases it when cleared.
    pub fn new(payload: HeapPayload, ledger: &Arc<HeapLedger>) -> Arc<Self> {
        let bytes = payload_footprint(&payload);
        Arc::new(Self {
            data: RwLock::new(payload),
            mark: AtomicMarkColor::new(),
            id: ledger.next_allocation_id(),
            bytes: AtomicUsize::new(bytes),
            ledger: Arc::clone(ledger),
        })
    }

    /// Monotonic allocation id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Bytes this cell currently accounts for.
    pub fn footprint(&self) -> usize {
        self.bytes.load(Ordering::Acquire)
    }

    /// Current mark color.
    pub fn color(&self) -> MarkColor {
        self.mark.load()
    }

    /// Sets the mark color.
    pub fn set_color(&self, color: MarkColor) {
        self.mark.store(color);
    }

    /// Read access to the payload.
    pub fn read(&self) -> RwLockReadGuard<'_, HeapPayload> {
        self.data.read()
    }

    /// Calls `visit` for every child value the payload references.
    ///
    /// Used by the collector's mark phase.
    pub fn for_each_child(&self, mut visit: impl FnMut(&Value)) {
        match &*self.data.read() {
            HeapPayload::Text(_) => {}
            HeapPayload::Elements(elements) => {
                for value in elements {
                    visit(value);
                }
            }
            HeapPayload::Properties(table) => {
                for (_, value) in table.iter() {
                    visit(value);
                }
            }
        }
    }

    /// Drops the payload contents and returns the released byte count.
    ///
    /// Called by the sweep phase on unreachable cells; dropping the contents
    /// breaks reference cycles between payloads. The released bytes are
    /// returned to the ledger here.
    pub fn clear_payload(&self) -> usize {
        let mut data = self.data.write();
        *data = HeapPayload::Text(String::new());
        let released = self.bytes.swap(0, Ordering::AcqRel);
        self.ledger.release(released);
        released
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, HeapPayload> {
        self.data.write()
    }

    pub(crate) fn ledger(&self) -> &HeapLedger {
        &self.ledger
    }

    pub(crate) fn add_bytes(&self, bytes: usize) {
        self.bytes.fetch_add(bytes, Ordering::AcqRel);
    }
}

/// A shared reference to a heap payload cell.
///
/// Cloning a `HeapRef` aliases the payload; the clone count doubles as the
/// collector's root information (a cell referenced from outside any payload
/// is a root).
#[derive(Debug, Clone)]
pub struct HeapRef {
    cell: Arc<PayloadCell>,
}

impl HeapRef {
    /// Wraps a cell.
    pub fn new(cell: Arc<PayloadCell>) -> Self {
        Self { cell }
    }

    /// The referenced cell.
    pub fn cell(&self) -> &Arc<PayloadCell> {
        &self.cell
    }

    /// Allocation id of the referenced cell.
    pub fn id(&self) -> u64 {
        self.cell.id()
    }

    /// Returns true if both references alias the same cell.
    pub fn same_cell(&self, other: &HeapRef) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}
