//! Profile-driven compilation tier
//!
//! This crate decides when a script graduates from interpretation to a
//! cached, constant-folded program:
//! - Per-script execution profiles keyed by source fingerprint
//! - Constant folding that mirrors the evaluator's coercion rules
//! - A compiled-program cache guarded against fingerprint collisions
//! - Silent fallback to interpretation when promotion fails

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiled;
pub mod folding;
pub mod tier;

pub use compiled::CompiledProgram;
pub use folding::fold_program;
pub use tier::{script_fingerprint, TierController, TierStats, DEFAULT_COMPILE_THRESHOLD};
