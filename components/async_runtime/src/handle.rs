//! Handles to in-flight evaluations

use std::time::Duration;

use core_types::Value;
use crossbeam::channel::{self, Receiver, RecvTimeoutError};

/// Observer for the result of one background evaluation.
///
/// A handle resolves exactly once. The blocking accessors take the
/// handle by value, so a result cannot be consumed twice. If the job
/// side goes away without delivering a value, the handle resolves to
/// `undefined` rather than blocking forever.
#[derive(Debug)]
pub struct EvalHandle {
    receiver: Receiver<Value>,
}

impl EvalHandle {
    pub(crate) fn new(receiver: Receiver<Value>) -> Self {
        Self { receiver }
    }

    /// A handle that is already resolved to `value`.
    ///
    /// Used for submissions that can be answered without running
    /// anything, such as evaluation against an engine that never
    /// initialized.
    pub fn pre_resolved(value: Value) -> Self {
        let (sender, receiver) = channel::bounded(1);
        let _ = sender.send(value);
        Self { receiver }
    }

    /// Whether a result value has already arrived.
    pub fn is_ready(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Block until the evaluation resolves.
    pub fn wait(self) -> Value {
        self.receiver.recv().unwrap_or(Value::Undefined)
    }

    /// Block until the evaluation resolves or `timeout` elapses.
    ///
    /// On timeout the handle is returned so the caller can keep
    /// waiting; the pending result is not lost.
    pub fn wait_timeout(self, timeout: Duration) -> Result<Value, EvalHandle> {
        match self.receiver.recv_timeout(timeout) {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Disconnected) => Ok(Value::Undefined),
            Err(RecvTimeoutError::Timeout) => Err(self),
        }
    }
}
