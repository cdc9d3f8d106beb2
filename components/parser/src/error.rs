//! Parser error types and helpers

use core_types::{EngineError, SourcePosition};

/// Create a syntax error at a given position
pub fn syntax_error(message: impl Into<String>, position: Option<SourcePosition>) -> EngineError {
    match position {
        Some(position) => EngineError::syntax_error_at(message, position),
        None => EngineError::syntax_error(message),
    }
}

/// Create an unexpected token error
pub fn unexpected_token(expected: &str, got: &str, position: Option<SourcePosition>) -> EngineError {
    syntax_error(format!("Expected {}, got {}", expected, got), position)
}

/// Create an unexpected end of input error
pub fn unexpected_eof(position: Option<SourcePosition>) -> EngineError {
    syntax_error("Unexpected end of input", position)
}
