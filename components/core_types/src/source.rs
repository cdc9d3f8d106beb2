//! Source position tracking for error reporting.

/// Represents a position in source code.
///
/// Carried by tokens and syntax errors to indicate where an issue occurred.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition {
///     line: 10,
///     column: 5,
///     offset: 150,
/// };
///
/// assert_eq!(pos.line, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number, 1-based
    pub line: u32,
    /// Column number, 1-based
    pub column: u32,
    /// Byte offset from the start of the source text
    pub offset: usize,
}

impl SourcePosition {
    /// Position of the first character of a source text.
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}
