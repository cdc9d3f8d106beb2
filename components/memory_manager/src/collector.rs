//! Mark-and-sweep collection over payload cells.
//!
//! A pass holds the ledger's mutation gate exclusively, which freezes the
//! payload reference graph and prevents new references from being cloned out
//! of payloads while roots are identified. Root detection compares each
//! cell's owner count with what the heap can account for internally: the
//! cell table holds one reference and payload children hold the rest, so any
//! surplus owner is a reference held outside the heap. That covers values
//! held by callers, values on in-flight evaluation stacks, and pending
//! asynchronous results alike.
//!
//! Sweeping clears the contents of unreachable cells rather than merely
//! dropping table entries, which breaks reference cycles between payloads.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use core_types::{MarkColor, PayloadCell};

use crate::heap::HeapShared;

/// Result of one collection pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionOutcome {
    /// Cells freed by the sweep
    pub cells_freed: usize,
    /// Bytes returned to the ledger
    pub bytes_freed: usize,
    /// Wall-clock duration of the pass
    pub duration: Duration,
}

/// Runs a full pass over `cells`. The caller holds the heap's cell table
/// lock, so no allocation can interleave with the pass.
pub(crate) fn run_locked(
    shared: &HeapShared,
    cells: &mut HashMap<u64, Arc<PayloadCell>>,
) -> CollectionOutcome {
    let started = Instant::now();
    let _gate = shared.ledger.mutation_gate.write();

    // Count in-payload references per cell. The gate keeps these exact.
    let mut internal: HashMap<u64, usize> = HashMap::with_capacity(cells.len());
    for cell in cells.values() {
        cell.set_color(MarkColor::White);
        cell.for_each_child(|child| {
            if let Some(id) = child.allocation_id() {
                *internal.entry(id).or_insert(0) += 1;
            }
        });
    }

    // Roots: cells with more owners than the table entry plus in-payload
    // children account for.
    let mut worklist: Vec<Arc<PayloadCell>> = Vec::new();
    for cell in cells.values() {
        let accounted = 1 + internal.get(&cell.id()).copied().unwrap_or(0);
        if Arc::strong_count(cell) > accounted {
            cell.set_color(MarkColor::Gray);
            worklist.push(Arc::clone(cell));
        }
    }

    // Mark everything reachable from the roots.
    while let Some(cell) = worklist.pop() {
        cell.for_each_child(|child| {
            if let Some(r) = child.heap_ref() {
                let target = r.cell();
                if target.color() == MarkColor::White {
                    target.set_color(MarkColor::Gray);
                    worklist.push(Arc::clone(target));
                }
            }
        });
        cell.set_color(MarkColor::Black);
    }

    // Sweep unmarked cells and reset survivors for the next pass.
    let mut cells_freed = 0usize;
    let mut bytes_freed = 0usize;
    cells.retain(|_, cell| {
        if cell.color() == MarkColor::Black {
            cell.set_color(MarkColor::White);
            true
        } else {
            cells_freed += 1;
            bytes_freed += cell.clear_payload();
            false
        }
    });

    let duration = started.elapsed();
    shared.collections.fetch_add(1, Ordering::Relaxed);
    shared.cells_freed.fetch_add(cells_freed as u64, Ordering::Relaxed);
    shared
        .bytes_freed
        .fetch_add(bytes_freed as u64, Ordering::Relaxed);
    shared
        .last_collection_micros
        .store(duration.as_micros() as u64, Ordering::Relaxed);

    CollectionOutcome {
        cells_freed,
        bytes_freed,
        duration,
    }
}
