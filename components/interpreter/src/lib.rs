//! Tree-walking evaluator for the JavaScript expression subset
//!
//! This crate turns source text into values:
//! - Pipeline phases: lexing, parsing, executing, with the terminal state
//!   and failing phase reported per run
//! - JavaScript operator semantics: `+` overloading, IEEE-754 arithmetic,
//!   loose/strict equality, lexicographic-or-numeric comparison
//! - Member access over strings, arrays and objects
//! - Literals materialize on a shared garbage-collected heap
//!
//! # Example
//!
//! ```
//! use interpreter::Evaluator;
//! use memory_manager::Heap;
//!
//! let evaluator = Evaluator::new(Heap::new());
//! let value = evaluator.evaluate("'Hello' + ' ' + 'World!'").unwrap();
//! assert_eq!(value.to_string(), "Hello World!");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod dispatch;
pub mod evaluator;

pub use evaluator::{EvalPhase, Evaluation, Evaluator};
