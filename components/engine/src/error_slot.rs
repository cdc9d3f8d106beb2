//! The engine's current-error slot

use core_types::{EngineError, ErrorKind};
use parking_lot::Mutex;

/// A registered failure observer.
pub type ErrorHandler = Box<dyn Fn(ErrorKind, &str) + Send + Sync>;

struct SlotInner {
    current: EngineError,
    handler: Option<ErrorHandler>,
}

/// One engine-wide slot holding the most recent evaluation error.
///
/// The slot is last-writer-wins: when evaluations fail concurrently,
/// the retained error is whichever recorded last, not a merge of both.
/// The registered handler runs synchronously on the failing thread
/// while the slot lock is held, so a handler must not call back into
/// the error API of the same engine.
pub struct ErrorSlot {
    inner: Mutex<SlotInner>,
}

impl ErrorSlot {
    /// Creates an empty slot with no handler.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SlotInner {
                current: EngineError::none(),
                handler: None,
            }),
        }
    }

    /// Stores `error` and notifies the handler, if one is registered.
    pub fn record(&self, error: EngineError) {
        let inner = &mut *self.inner.lock();
        inner.current = error;
        if let Some(handler) = &inner.handler {
            handler(inner.current.kind, &inner.current.message);
        }
    }

    /// Registers `handler`, replacing any previous one.
    pub fn set_handler(&self, handler: ErrorHandler) {
        self.inner.lock().handler = Some(handler);
    }

    /// The most recent error; kind `None` when the slot is clear.
    pub fn current(&self) -> EngineError {
        self.inner.lock().current.clone()
    }

    /// Message of the most recent error; empty when the slot is clear.
    pub fn current_message(&self) -> String {
        self.inner.lock().current.message.clone()
    }

    /// Resets the slot to its no-error state. Idempotent.
    pub fn clear(&self) {
        self.inner.lock().current = EngineError::none();
    }
}

impl Default for ErrorSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ErrorSlot")
            .field("current", &inner.current)
            .field("handler", &inner.handler.is_some())
            .finish()
    }
}
