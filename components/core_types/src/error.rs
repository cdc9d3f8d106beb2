//! Engine error types and error handling.
//!
//! This module provides the error type shared by every engine component,
//! along with the kind taxonomy exposed through the engine's error slot.

use crate::SourcePosition;

/// The kind of engine error.
///
/// `None` is the resting state of the engine's current-error slot; it never
/// appears inside an `Err` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No error has been recorded
    None,
    /// Lexing or parsing failure
    SyntaxError,
    /// Execution-time failure (e.g. an invalid operation on a value)
    RuntimeError,
    /// Allocation denied after a collection attempt
    MemoryLimitExceeded,
    /// Invariant violation inside the engine
    InternalError,
}

impl ErrorKind {
    /// Returns the kind name as it appears in error messages and reports.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::None => "None",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::RuntimeError => "RuntimeError",
            ErrorKind::MemoryLimitExceeded => "MemoryLimitExceeded",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

/// An engine error with a kind, message, and optional source position.
///
/// Evaluation failures are normalized into this type: syntax errors carry the
/// position the lexer or parser reached, runtime and memory errors usually
/// carry only a message.
///
/// # Examples
///
/// ```
/// use core_types::{EngineError, ErrorKind};
///
/// let error = EngineError::runtime_error("pop of empty array");
/// assert_eq!(error.kind, ErrorKind::RuntimeError);
/// assert_eq!(error.message, "pop of empty array");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineError {
    /// The kind of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Source position where the error occurred, when known
    pub position: Option<SourcePosition>,
}

impl EngineError {
    /// Creates the resting "no error" state used by the error slot.
    pub fn none() -> Self {
        Self {
            kind: ErrorKind::None,
            message: String::new(),
            position: None,
        }
    }

    /// Creates a syntax error without position information.
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::SyntaxError,
            message: message.into(),
            position: None,
        }
    }

    /// Creates a syntax error pointing at a source position.
    pub fn syntax_error_at(message: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            kind: ErrorKind::SyntaxError,
            message: message.into(),
            position: Some(position),
        }
    }

    /// Creates a runtime error.
    pub fn runtime_error(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::RuntimeError,
            message: message.into(),
            position: None,
        }
    }

    /// Creates a memory-limit error.
    pub fn memory_limit_exceeded(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::MemoryLimitExceeded,
            message: message.into(),
            position: None,
        }
    }

    /// Creates an internal error.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InternalError,
            message: message.into(),
            position: None,
        }
    }

    /// Returns true if this is the resting "no error" state.
    pub fn is_none(&self) -> bool {
        self.kind == ErrorKind::None
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.position) {
            (ErrorKind::None, _) => write!(f, "no error"),
            (kind, Some(pos)) => write!(
                f,
                "{}: {} (line {}, column {})",
                kind.name(),
                self.message,
                pos.line,
                pos.column
            ),
            (kind, None) => write!(f, "{}: {}", kind.name(), self.message),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type used throughout the engine components.
pub type EngineResult<T> = Result<T, EngineError>;
