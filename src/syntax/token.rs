//! Tokens consumed by the grammar parser.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{CharSet, Span};
use crate::errors::{MageError, MageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rustfmt::skip]
pub enum TokenKind {
    // Modifier keywords
    Pub, Extern, Token,

    // Punctuation
    Equals, VBar, LParen, RParen, Plus, Star, Question,
    Excl, Amp, Slash, Percent, Tilde, LBrace, RBrace,
    Comma, Colon, At, RArrow,

    // Literals
    Str, CharSet, Integer, Ident,

    EndOfFile,
}

impl TokenKind {
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Pub => "'pub' keyword",
            TokenKind::Extern => "'extern' keyword",
            TokenKind::Token => "'token' keyword",
            TokenKind::Equals => "'='",
            TokenKind::VBar => "'|'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Plus => "'+'",
            TokenKind::Star => "'*'",
            TokenKind::Question => "'?'",
            TokenKind::Excl => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Tilde => "'~'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::At => "'@'",
            TokenKind::RArrow => "'->'",
            TokenKind::Str => "string literal",
            TokenKind::CharSet => "character set",
            TokenKind::Integer => "integer",
            TokenKind::Ident => "identifier",
            TokenKind::EndOfFile => "end of file",
        }
    }

    /// True for the keywords that may open a rule.
    pub fn is_modifier(self) -> bool {
        matches!(self, TokenKind::Pub | TokenKind::Extern | TokenKind::Token)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Payload carried by literal tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Text(String),
    Integer(u64),
    CharSet(CharSet),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub span: Span,
    /// Comment lines written directly above this token.
    pub comment: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            value: TokenValue::None,
            span,
            comment: None,
        }
    }

    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = value;
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Text of an identifier or string literal.
    pub fn text(&self) -> MageResult<&str> {
        match &self.value {
            TokenValue::Text(text) => Ok(text),
            _ => Err(self.missing_payload("text")),
        }
    }

    pub fn integer(&self) -> MageResult<u64> {
        match self.value {
            TokenValue::Integer(n) => Ok(n),
            _ => Err(self.missing_payload("integer")),
        }
    }

    pub fn into_charset(self) -> MageResult<CharSet> {
        match self.value {
            TokenValue::CharSet(set) => Ok(set),
            _ => Err(self.missing_payload("character set")),
        }
    }

    fn missing_payload(&self, what: &str) -> MageError {
        MageError::internal(format!(
            "{} token at {} carries no {what} value",
            self.kind, self.span.start
        ))
    }
}
