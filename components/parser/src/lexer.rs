//! Lexer for the evaluated JavaScript subset.
//!
//! Produces positioned tokens for numbers, strings, identifiers, keywords
//! and punctuators. Whitespace and both comment forms are skipped as trivia.

use core_types::{EngineResult, SourcePosition};

use crate::error;

/// Keywords recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
}

/// Punctuators and operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuator {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `;`
    Semicolon,
    /// `!`
    Bang,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `===`
    EqEqEq,
    /// `!==`
    NotEqEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
}

impl Punctuator {
    /// Source spelling of the punctuator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Punctuator::Plus => "+",
            Punctuator::Minus => "-",
            Punctuator::Star => "*",
            Punctuator::Slash => "/",
            Punctuator::Percent => "%",
            Punctuator::LeftParen => "(",
            Punctuator::RightParen => ")",
            Punctuator::LeftBracket => "[",
            Punctuator::RightBracket => "]",
            Punctuator::LeftBrace => "{",
            Punctuator::RightBrace => "}",
            Punctuator::Comma => ",",
            Punctuator::Colon => ":",
            Punctuator::Dot => ".",
            Punctuator::Semicolon => ";",
            Punctuator::Bang => "!",
            Punctuator::EqEq => "==",
            Punctuator::NotEq => "!=",
            Punctuator::EqEqEq => "===",
            Punctuator::NotEqEq => "!==",
            Punctuator::Less => "<",
            Punctuator::LessEq => "<=",
            Punctuator::Greater => ">",
            Punctuator::GreaterEq => ">=",
        }
    }
}

/// Token kinds produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Number literal
    Number(f64),
    /// String literal with escape sequences resolved
    String(String),
    /// Identifier
    Identifier(String),
    /// Keyword
    Keyword(Keyword),
    /// Punctuator or operator
    Punctuator(Punctuator),
    /// End of input
    Eof,
}

/// A token with the position of its first character
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was scanned
    pub kind: TokenKind,
    /// Where it started
    pub position: SourcePosition,
}

/// Tokenizes a whole source text, ending with an `Eof` token.
pub fn tokenize(source: &str) -> EngineResult<Vec<Token>> {
    Lexer::new(source).tokenize()
}

/// Lexer over a source text.
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    offset: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    /// Creates a lexer for the given source code.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scans all tokens up to and including `Eof`.
    pub fn tokenize(mut self) -> EngineResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> EngineResult<Token> {
        self.skip_trivia()?;
        let position = self.current_position();
        if self.is_at_end() {
            return Ok(Token {
                kind: TokenKind::Eof,
                position,
            });
        }
        let c = self.peek();
        if c.is_ascii_digit() || (c == '.' && self.peek_next().is_some_and(|n| n.is_ascii_digit()))
        {
            return self.scan_number(position);
        }
        if c == '"' || c == '\'' {
            return self.scan_string(position);
        }
        if is_identifier_start(c) {
            return Ok(self.scan_identifier(position));
        }
        self.scan_punctuator(position)
    }

    fn skip_trivia(&mut self) -> EngineResult<()> {
        loop {
            if self.is_at_end() {
                return Ok(());
            }
            let c = self.peek();
            if c.is_whitespace() {
                self.advance();
                continue;
            }
            if c == '/' {
                match self.peek_next() {
                    Some('/') => {
                        while !self.is_at_end() && self.peek() != '\n' {
                            self.advance();
                        }
                        continue;
                    }
                    Some('*') => {
                        let opened_at = self.current_position();
                        self.advance();
                        self.advance();
                        loop {
                            if self.is_at_end() {
                                return Err(error::syntax_error(
                                    "unterminated comment",
                                    Some(opened_at),
                                ));
                            }
                            if self.peek() == '*' && self.peek_next() == Some('/') {
                                self.advance();
                                self.advance();
                                break;
                            }
                            self.advance();
                        }
                        continue;
                    }
                    _ => return Ok(()),
                }
            }
            return Ok(());
        }
    }

    fn scan_number(&mut self, position: SourcePosition) -> EngineResult<Token> {
        if self.peek() == '0' && matches!(self.peek_next(), Some('x') | Some('X')) {
            self.advance();
            self.advance();
            let mut value = 0.0f64;
            let mut digits = 0;
            while !self.is_at_end() {
                match self.peek().to_digit(16) {
                    Some(d) => {
                        value = value * 16.0 + d as f64;
                        digits += 1;
                        self.advance();
                    }
                    None => break,
                }
            }
            if digits == 0 {
                return Err(error::syntax_error(
                    "missing hexadecimal digits",
                    Some(position),
                ));
            }
            return Ok(Token {
                kind: TokenKind::Number(value),
                position,
            });
        }

        let mut text = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            text.push(self.advance());
        }
        if !self.is_at_end() && self.peek() == '.' {
            text.push(self.advance());
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }
        if !self.is_at_end() && matches!(self.peek(), 'e' | 'E') {
            text.push(self.advance());
            if !self.is_at_end() && matches!(self.peek(), '+' | '-') {
                text.push(self.advance());
            }
            let mut digits = 0;
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                text.push(self.advance());
                digits += 1;
            }
            if digits == 0 {
                return Err(error::syntax_error(
                    "missing exponent digits",
                    Some(position),
                ));
            }
        }
        match text.parse::<f64>() {
            Ok(value) => Ok(Token {
                kind: TokenKind::Number(value),
                position,
            }),
            Err(_) => Err(error::syntax_error(
                format!("malformed number literal '{}'", text),
                Some(position),
            )),
        }
    }

    fn scan_string(&mut self, position: SourcePosition) -> EngineResult<Token> {
        let quote = self.advance();
        let mut value = String::new();
        loop {
            if self.is_at_end() {
                return Err(error::syntax_error(
                    "unterminated string literal",
                    Some(position),
                ));
            }
            let c = self.advance();
            if c == quote {
                break;
            }
            if c == '\n' || c == '\r' {
                return Err(error::syntax_error(
                    "unterminated string literal",
                    Some(position),
                ));
            }
            if c != '\\' {
                value.push(c);
                continue;
            }
            if self.is_at_end() {
                return Err(error::syntax_error(
                    "unterminated string literal",
                    Some(position),
                ));
            }
            let escape_at = self.current_position();
            match self.advance() {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                'b' => value.push('\u{0008}'),
                'f' => value.push('\u{000C}'),
                'v' => value.push('\u{000B}'),
                '0' => value.push('\0'),
                'x' => {
                    let hi = self.expect_hex_digit(escape_at)?;
                    let lo = self.expect_hex_digit(escape_at)?;
                    match char::from_u32(hi * 16 + lo) {
                        Some(decoded) => value.push(decoded),
                        None => {
                            return Err(error::syntax_error(
                                "invalid escape sequence",
                                Some(escape_at),
                            ))
                        }
                    }
                }
                'u' => {
                    let mut code = 0u32;
                    for _ in 0..4 {
                        code = code * 16 + self.expect_hex_digit(escape_at)?;
                    }
                    match char::from_u32(code) {
                        Some(decoded) => value.push(decoded),
                        None => {
                            return Err(error::syntax_error(
                                "invalid escape sequence",
                                Some(escape_at),
                            ))
                        }
                    }
                }
                // Line continuation: an escaped terminator contributes nothing.
                '\n' => {}
                '\r' => {
                    if !self.is_at_end() && self.peek() == '\n' {
                        self.advance();
                    }
                }
                other => value.push(other),
            }
        }
        Ok(Token {
            kind: TokenKind::String(value),
            position,
        })
    }

    fn scan_identifier(&mut self, position: SourcePosition) -> Token {
        let mut name = String::new();
        while !self.is_at_end() && is_identifier_part(self.peek()) {
            name.push(self.advance());
        }
        let kind = match name.as_str() {
            "true" => TokenKind::Keyword(Keyword::True),
            "false" => TokenKind::Keyword(Keyword::False),
            "null" => TokenKind::Keyword(Keyword::Null),
            _ => TokenKind::Identifier(name),
        };
        Token { kind, position }
    }

    fn scan_punctuator(&mut self, position: SourcePosition) -> EngineResult<Token> {
        let c = self.advance();
        let punct = match c {
            '+' => Punctuator::Plus,
            '-' => Punctuator::Minus,
            '*' => Punctuator::Star,
            '/' => Punctuator::Slash,
            '%' => Punctuator::Percent,
            '(' => Punctuator::LeftParen,
            ')' => Punctuator::RightParen,
            '[' => Punctuator::LeftBracket,
            ']' => Punctuator::RightBracket,
            '{' => Punctuator::LeftBrace,
            '}' => Punctuator::RightBrace,
            ',' => Punctuator::Comma,
            ':' => Punctuator::Colon,
            '.' => Punctuator::Dot,
            ';' => Punctuator::Semicolon,
            '!' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Punctuator::NotEqEq
                    } else {
                        Punctuator::NotEq
                    }
                } else {
                    Punctuator::Bang
                }
            }
            '=' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Punctuator::EqEqEq
                    } else {
                        Punctuator::EqEq
                    }
                } else {
                    return Err(error::syntax_error(
                        "unexpected character '='",
                        Some(position),
                    ));
                }
            }
            '<' => {
                if self.match_char('=') {
                    Punctuator::LessEq
                } else {
                    Punctuator::Less
                }
            }
            '>' => {
                if self.match_char('=') {
                    Punctuator::GreaterEq
                } else {
                    Punctuator::Greater
                }
            }
            other => {
                return Err(error::syntax_error(
                    format!("unexpected character '{}'", other),
                    Some(position),
                ));
            }
        };
        Ok(Token {
            kind: TokenKind::Punctuator(punct),
            position,
        })
    }

    fn expect_hex_digit(&mut self, at: SourcePosition) -> EngineResult<u32> {
        if self.is_at_end() {
            return Err(error::syntax_error("invalid escape sequence", Some(at)));
        }
        self.advance()
            .to_digit(16)
            .ok_or_else(|| error::syntax_error("invalid escape sequence", Some(at)))
    }

    fn current_position(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.chars[self.position]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.position];
        self.position += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
