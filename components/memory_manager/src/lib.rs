//! Memory management for the Ferrite JavaScript engine.
//!
//! # Overview
//!
//! - [`Heap`]: owns every payload cell, charges footprints against a fixed
//!   memory limit, and runs collection before failing an allocation
//! - Mark-and-sweep collection: owner-count root detection, tri-color
//!   marking, cycle-breaking sweep (see [`CollectionOutcome`])
//! - [`ValueCollection`]: embedder-facing constructors for heap-backed
//!   values
//!
//! Reported usage never exceeds the configured limit, and a collection pass
//! stops the world for allocation, payload mutation and reference extraction
//! only; coercions and comparisons on existing values proceed unblocked.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod collector;
pub mod factory;
pub mod heap;

pub use collector::CollectionOutcome;
pub use factory::ValueCollection;
pub use heap::{Heap, HeapStats};
