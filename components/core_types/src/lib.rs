//! Core types shared by every component of the Ferrite JavaScript engine.
//!
//! # Overview
//!
//! This crate defines the vocabulary the rest of the engine speaks:
//!
//! - [`Value`]: the tagged JavaScript value with its coercions and the
//!   strict/loose/SameValue equality family
//! - [`PayloadCell`] and [`HeapRef`]: heap-owned string/array/object
//!   payloads and the references values hold into them
//! - [`HeapLedger`]: the byte accounting and mutation gate the collector
//!   and mutators coordinate through
//! - [`EngineError`] and [`EngineResult`]: the error taxonomy every
//!   fallible operation reports through
//! - [`SourcePosition`]: line/column positions for diagnostics
//!
//! Higher layers (the allocator, parser, evaluator, and engine facade)
//! build on these types without adding their own value representations.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
pub mod payload;
pub mod source;
pub mod value;

pub use error::{EngineError, EngineResult, ErrorKind};
pub use payload::{
    cell_base_bytes, payload_footprint, AtomicMarkColor, HeapLedger, HeapPayload, HeapRef,
    MarkColor, PayloadCell, PropertyTable,
};
pub use source::SourcePosition;
pub use value::{js_number_to_string, js_string_to_number, Value};
