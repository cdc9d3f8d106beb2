//! JavaScript parser component
//!
//! Provides the lexer, recursive descent parser and AST for the evaluated
//! expression subset: literals (numbers, strings, booleans, `null`, arrays,
//! objects), unary and binary arithmetic, the comparison and equality
//! operator families, and member access.
//!
//! # Overview
//!
//! - [`Lexer`] / [`tokenize`] - Tokenizes source code into positioned tokens
//! - [`Token`] - Token types including literals, identifiers and punctuators
//! - [`Parser`] / [`parse`] - Recursive descent parser producing the AST
//! - [`Program`] / [`Expression`] - AST node types
//!
//! # Example
//!
//! ```
//! use parser::parse;
//!
//! let program = parse("123 * 456").unwrap();
//! assert_eq!(program.body.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expression, MemberProperty, Program, UnaryOp};
pub use lexer::{tokenize, Keyword, Lexer, Punctuator, Token, TokenKind};
pub use parser::{parse, Parser};
