//! Recursive descent parser producing the expression AST.
//!
//! Grammar, lowest precedence first: equality, relational, additive,
//! multiplicative, unary, member access, primary. Statements are
//! expressions separated by semicolons; separators are optional at the end
//! of the program and stray semicolons are tolerated.

use core_types::{js_number_to_string, EngineResult, SourcePosition};

use crate::ast::{BinaryOp, Expression, MemberProperty, Program, UnaryOp};
use crate::error;
use crate::lexer::{self, Keyword, Punctuator, Token, TokenKind};

/// Tokenizes and parses a source text into a [`Program`].
pub fn parse(source: &str) -> EngineResult<Program> {
    let tokens = lexer::tokenize(source)?;
    Parser::new(tokens).parse_program()
}

/// Recursive descent parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Creates a parser over tokens produced by [`lexer::tokenize`].
    ///
    /// A missing trailing `Eof` token is supplied, so any token list is
    /// safe to parse.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let position = tokens
                .last()
                .map(|t| t.position)
                .unwrap_or_else(SourcePosition::start);
            tokens.push(Token {
                kind: TokenKind::Eof,
                position,
            });
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the whole token stream as a program.
    pub fn parse_program(mut self) -> EngineResult<Program> {
        let mut body = Vec::new();
        loop {
            while self.match_punct(Punctuator::Semicolon) {}
            if self.at_eof() {
                break;
            }
            body.push(self.parse_expression()?);
            if !self.match_punct(Punctuator::Semicolon) && !self.at_eof() {
                let token = self.peek();
                return Err(error::unexpected_token(
                    "';'",
                    &describe(&token.kind),
                    Some(token.position),
                ));
            }
        }
        Ok(Program { body })
    }

    /// Parses a single expression.
    pub fn parse_expression(&mut self) -> EngineResult<Expression> {
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> EngineResult<Expression> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_punct() {
                Some(Punctuator::EqEq) => BinaryOp::Equals,
                Some(Punctuator::NotEq) => BinaryOp::NotEquals,
                Some(Punctuator::EqEqEq) => BinaryOp::StrictEquals,
                Some(Punctuator::NotEqEq) => BinaryOp::StrictNotEquals,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
    }

    fn parse_relational(&mut self) -> EngineResult<Expression> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_punct() {
                Some(Punctuator::Less) => BinaryOp::Less,
                Some(Punctuator::LessEq) => BinaryOp::LessEqual,
                Some(Punctuator::Greater) => BinaryOp::Greater,
                Some(Punctuator::GreaterEq) => BinaryOp::GreaterEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> EngineResult<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_punct() {
                Some(Punctuator::Plus) => BinaryOp::Add,
                Some(Punctuator::Minus) => BinaryOp::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> EngineResult<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_punct() {
                Some(Punctuator::Star) => BinaryOp::Multiply,
                Some(Punctuator::Slash) => BinaryOp::Divide,
                Some(Punctuator::Percent) => BinaryOp::Remainder,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> EngineResult<Expression> {
        let op = match self.peek_punct() {
            Some(Punctuator::Minus) => Some(UnaryOp::Negate),
            Some(Punctuator::Plus) => Some(UnaryOp::Plus),
            Some(Punctuator::Bang) => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let position = self.peek().position;
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::Unary {
                op,
                operand: Box::new(operand),
                position,
            });
        }
        self.parse_member()
    }

    fn parse_member(&mut self) -> EngineResult<Expression> {
        let mut object = self.parse_primary()?;
        loop {
            if self.match_punct(Punctuator::Dot) {
                let token = self.advance_token();
                let name = match token.kind {
                    TokenKind::Identifier(name) => name,
                    // Reserved words are ordinary property names after a dot.
                    TokenKind::Keyword(Keyword::True) => "true".to_string(),
                    TokenKind::Keyword(Keyword::False) => "false".to_string(),
                    TokenKind::Keyword(Keyword::Null) => "null".to_string(),
                    other => {
                        return Err(error::unexpected_token(
                            "property name",
                            &describe(&other),
                            Some(token.position),
                        ))
                    }
                };
                let position = object.position();
                object = Expression::Member {
                    object: Box::new(object),
                    property: MemberProperty::Static(name),
                    position,
                };
            } else if self.match_punct(Punctuator::LeftBracket) {
                let index = self.parse_expression()?;
                self.expect_punct(Punctuator::RightBracket)?;
                let position = object.position();
                object = Expression::Member {
                    object: Box::new(object),
                    property: MemberProperty::Computed(Box::new(index)),
                    position,
                };
            } else {
                return Ok(object);
            }
        }
    }

    fn parse_primary(&mut self) -> EngineResult<Expression> {
        let token = self.advance_token();
        let position = token.position;
        match token.kind {
            TokenKind::Number(value) => Ok(Expression::NumberLiteral { value, position }),
            TokenKind::String(value) => Ok(Expression::StringLiteral { value, position }),
            TokenKind::Keyword(Keyword::True) => Ok(Expression::BooleanLiteral {
                value: true,
                position,
            }),
            TokenKind::Keyword(Keyword::False) => Ok(Expression::BooleanLiteral {
                value: false,
                position,
            }),
            TokenKind::Keyword(Keyword::Null) => Ok(Expression::NullLiteral { position }),
            TokenKind::Identifier(name) => Ok(Expression::Identifier { name, position }),
            TokenKind::Punctuator(Punctuator::LeftParen) => {
                let inner = self.parse_expression()?;
                self.expect_punct(Punctuator::RightParen)?;
                Ok(inner)
            }
            TokenKind::Punctuator(Punctuator::LeftBracket) => self.parse_array_literal(position),
            TokenKind::Punctuator(Punctuator::LeftBrace) => self.parse_object_literal(position),
            TokenKind::Eof => Err(error::unexpected_eof(Some(position))),
            other => Err(error::unexpected_token(
                "expression",
                &describe(&other),
                Some(position),
            )),
        }
    }

    fn parse_array_literal(&mut self, position: SourcePosition) -> EngineResult<Expression> {
        let mut elements = Vec::new();
        if !self.match_punct(Punctuator::RightBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if self.match_punct(Punctuator::Comma) {
                    if self.match_punct(Punctuator::RightBracket) {
                        break;
                    }
                    continue;
                }
                self.expect_punct(Punctuator::RightBracket)?;
                break;
            }
        }
        Ok(Expression::ArrayLiteral { elements, position })
    }

    fn parse_object_literal(&mut self, position: SourcePosition) -> EngineResult<Expression> {
        let mut properties = Vec::new();
        if !self.match_punct(Punctuator::RightBrace) {
            loop {
                let key = self.parse_property_key()?;
                self.expect_punct(Punctuator::Colon)?;
                let value = self.parse_expression()?;
                properties.push((key, value));
                if self.match_punct(Punctuator::Comma) {
                    if self.match_punct(Punctuator::RightBrace) {
                        break;
                    }
                    continue;
                }
                self.expect_punct(Punctuator::RightBrace)?;
                break;
            }
        }
        Ok(Expression::ObjectLiteral {
            properties,
            position,
        })
    }

    fn parse_property_key(&mut self) -> EngineResult<String> {
        let token = self.advance_token();
        match token.kind {
            TokenKind::Identifier(name) => Ok(name),
            TokenKind::String(value) => Ok(value),
            // Numeric keys are their canonical string form: `{1.5: x}` and
            // `{"1.5": x}` name the same property.
            TokenKind::Number(value) => Ok(js_number_to_string(value)),
            TokenKind::Keyword(Keyword::True) => Ok("true".to_string()),
            TokenKind::Keyword(Keyword::False) => Ok("false".to_string()),
            TokenKind::Keyword(Keyword::Null) => Ok("null".to_string()),
            other => Err(error::unexpected_token(
                "property key",
                &describe(&other),
                Some(token.position),
            )),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_punct(&self) -> Option<Punctuator> {
        match &self.peek().kind {
            TokenKind::Punctuator(p) => Some(*p),
            _ => None,
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn advance_token(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        self.advance();
        token
    }

    fn match_punct(&mut self, expected: Punctuator) -> bool {
        if self.peek_punct() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, expected: Punctuator) -> EngineResult<()> {
        if self.match_punct(expected) {
            return Ok(());
        }
        let token = self.peek();
        if matches!(token.kind, TokenKind::Eof) {
            return Err(error::unexpected_eof(Some(token.position)));
        }
        Err(error::unexpected_token(
            &format!("'{}'", expected.as_str()),
            &describe(&token.kind),
            Some(token.position),
        ))
    }
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    let position = left.position();
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        position,
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(value) => format!("number '{}'", js_number_to_string(*value)),
        TokenKind::String(_) => "string literal".to_string(),
        TokenKind::Identifier(name) => format!("identifier '{}'", name),
        TokenKind::Keyword(Keyword::True) => "'true'".to_string(),
        TokenKind::Keyword(Keyword::False) => "'false'".to_string(),
        TokenKind::Keyword(Keyword::Null) => "'null'".to_string(),
        TokenKind::Punctuator(p) => format!("'{}'", p.as_str()),
        TokenKind::Eof => "end of input".to_string(),
    }
}
