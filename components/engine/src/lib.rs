//! Embeddable evaluation engine
//!
//! The facade over the component crates:
//! - `Engine` with explicit initialization and shutdown lifecycle
//! - Sentinel evaluation: failures record into a per-engine error slot
//!   and return `undefined`
//! - Transparent tier promotion for hot scripts
//! - Asynchronous evaluation on a worker pool with one-shot handles
//! - Atomic statistics with a textual report

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error_slot;
pub mod stats;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error_slot::{ErrorHandler, ErrorSlot};
pub use stats::EngineStatsSnapshot;
