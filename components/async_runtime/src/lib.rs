//! Background evaluation support
//!
//! This crate runs scripts off the caller's thread:
//! - `EvalJob` pairs a script with a one-shot reply channel
//! - `EvalHandle` observes exactly one result, with blocking and
//!   timed waits
//! - `WorkerPool` drains a shared FIFO queue on named worker threads
//!   and finishes queued work before shutting down

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod handle;
pub mod job;
pub mod pool;

pub use handle::EvalHandle;
pub use job::EvalJob;
pub use pool::{EvalRunner, WorkerPool};
