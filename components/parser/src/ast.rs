//! Abstract Syntax Tree node definitions

use core_types::SourcePosition;

/// A parsed program: a sequence of expression statements evaluated in
/// order, whose last expression produces the program's value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Expression statements in source order
    pub body: Vec<Expression>,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `+x`
    Plus,
    /// `!x`
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+` (numeric addition or string concatenation)
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Remainder,
    /// `==`
    Equals,
    /// `!=`
    NotEquals,
    /// `===`
    StrictEquals,
    /// `!==`
    StrictNotEquals,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
}

/// The property part of a member expression
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    /// `object.name`
    Static(String),
    /// `object[expression]`
    Computed(Box<Expression>),
}

/// JavaScript expressions (the evaluated subset)
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Number literal
    NumberLiteral {
        /// Literal value
        value: f64,
        /// Source location
        position: SourcePosition,
    },

    /// String literal
    StringLiteral {
        /// Literal contents with escapes resolved
        value: String,
        /// Source location
        position: SourcePosition,
    },

    /// Boolean literal
    BooleanLiteral {
        /// Literal value
        value: bool,
        /// Source location
        position: SourcePosition,
    },

    /// `null`
    NullLiteral {
        /// Source location
        position: SourcePosition,
    },

    /// Identifier reference
    Identifier {
        /// Referenced name
        name: String,
        /// Source location
        position: SourcePosition,
    },

    /// Array literal
    ArrayLiteral {
        /// Element expressions in order
        elements: Vec<Expression>,
        /// Source location
        position: SourcePosition,
    },

    /// Object literal
    ObjectLiteral {
        /// Key/value pairs in source order; duplicate keys resolve to the
        /// last value at evaluation time
        properties: Vec<(String, Expression)>,
        /// Source location
        position: SourcePosition,
    },

    /// Unary expression
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expression>,
        /// Source location
        position: SourcePosition,
    },

    /// Binary expression
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
        /// Source location
        position: SourcePosition,
    },

    /// Member access
    Member {
        /// The accessed value
        object: Box<Expression>,
        /// Static or computed property
        property: MemberProperty,
        /// Source location
        position: SourcePosition,
    },
}

impl Expression {
    /// Source location of the expression's first token.
    pub fn position(&self) -> SourcePosition {
        match self {
            Expression::NumberLiteral { position, .. }
            | Expression::StringLiteral { position, .. }
            | Expression::BooleanLiteral { position, .. }
            | Expression::NullLiteral { position }
            | Expression::Identifier { position, .. }
            | Expression::ArrayLiteral { position, .. }
            | Expression::ObjectLiteral { position, .. }
            | Expression::Unary { position, .. }
            | Expression::Binary { position, .. }
            | Expression::Member { position, .. } => *position,
        }
    }
}
