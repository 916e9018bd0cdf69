//! Scanner for Magelang grammar text.
//!
//! Tokenization is handled by logos. This module adds what the parser needs
//! on top: line and column positions, leading comments attached to the token
//! they describe, and an endless stream of `EndOfFile` once input runs out.

use log::trace;
use logos::Logos;

use crate::ast::{CharSet, CharSetElement, Position, Span};
use crate::errors::{MageError, MageResult};
use crate::syntax::cursor::TokenSource;
use crate::syntax::token::{Token, TokenKind, TokenValue};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Lexeme {
    #[regex(r"#[^\n]*", |lex| lex.slice()[1..].trim().to_owned())]
    Comment(String),

    #[token("pub")]
    Pub,
    #[token("extern")]
    Extern,
    #[token("token")]
    Token,

    #[token("=")]
    Equals,
    #[token("|")]
    VBar,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("+")]
    Plus,
    #[token("*")]
    Star,
    #[token("?")]
    Question,
    #[token("!")]
    Excl,
    #[token("&")]
    Amp,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("~")]
    Tilde,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("@")]
    At,
    #[token("->")]
    RArrow,

    #[regex(r"'([^'\\]|\\.)*'", |lex| unescape_literal(lex.slice()))]
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape_literal(lex.slice()))]
    Str(String),

    // A trailing `i` marks the set case-insensitive.
    #[regex(r"\[([^\]\\]|\\.)*\]i?", |lex| parse_charset(lex.slice()))]
    CharSet(CharSet),

    #[regex("[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    Integer(u64),

    #[regex("[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Ident(String),
}

impl Lexeme {
    /// `None` for comments, which are not tokens of their own.
    fn into_token(self, span: Span) -> Option<Token> {
        let (kind, value) = match self {
            Lexeme::Pub => (TokenKind::Pub, TokenValue::None),
            Lexeme::Extern => (TokenKind::Extern, TokenValue::None),
            Lexeme::Token => (TokenKind::Token, TokenValue::None),
            Lexeme::Equals => (TokenKind::Equals, TokenValue::None),
            Lexeme::VBar => (TokenKind::VBar, TokenValue::None),
            Lexeme::LParen => (TokenKind::LParen, TokenValue::None),
            Lexeme::RParen => (TokenKind::RParen, TokenValue::None),
            Lexeme::Plus => (TokenKind::Plus, TokenValue::None),
            Lexeme::Star => (TokenKind::Star, TokenValue::None),
            Lexeme::Question => (TokenKind::Question, TokenValue::None),
            Lexeme::Excl => (TokenKind::Excl, TokenValue::None),
            Lexeme::Amp => (TokenKind::Amp, TokenValue::None),
            Lexeme::Slash => (TokenKind::Slash, TokenValue::None),
            Lexeme::Percent => (TokenKind::Percent, TokenValue::None),
            Lexeme::Tilde => (TokenKind::Tilde, TokenValue::None),
            Lexeme::LBrace => (TokenKind::LBrace, TokenValue::None),
            Lexeme::RBrace => (TokenKind::RBrace, TokenValue::None),
            Lexeme::Comma => (TokenKind::Comma, TokenValue::None),
            Lexeme::Colon => (TokenKind::Colon, TokenValue::None),
            Lexeme::At => (TokenKind::At, TokenValue::None),
            Lexeme::RArrow => (TokenKind::RArrow, TokenValue::None),
            Lexeme::Str(text) => (TokenKind::Str, TokenValue::Text(text)),
            Lexeme::CharSet(set) => (TokenKind::CharSet, TokenValue::CharSet(set)),
            Lexeme::Integer(n) => (TokenKind::Integer, TokenValue::Integer(n)),
            Lexeme::Ident(name) => (TokenKind::Ident, TokenValue::Text(name)),
            Lexeme::Comment(_) => return None,
        };
        Some(Token::new(kind, span).with_value(value))
    }
}

// ============================================================================
// LITERAL DECODING
// ============================================================================

fn unescape_char(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\\' | '\'' | '"' | '[' | ']' | '-' | '^' => Some(ch),
        _ => None,
    }
}

fn unescape_literal(slice: &str) -> Option<String> {
    let inner = &slice[1..slice.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            result.push(unescape_char(chars.next()?)?);
        } else {
            result.push(ch);
        }
    }
    Some(result)
}

fn parse_charset(slice: &str) -> Option<CharSet> {
    let (body, case_insensitive) = match slice.strip_suffix('i') {
        Some(rest) => (rest, true),
        None => (slice, false),
    };
    let body = body.strip_prefix('[')?.strip_suffix(']')?;

    // (char, was_escaped); an escaped '-' never forms a range.
    let mut decoded = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            decoded.push((unescape_char(chars.next()?)?, true));
        } else {
            decoded.push((ch, false));
        }
    }

    let mut elements = Vec::new();
    let mut i = 0;
    while i < decoded.len() {
        let (low, _) = decoded[i];
        if i + 2 < decoded.len() && decoded[i + 1] == ('-', false) {
            let (high, _) = decoded[i + 2];
            if high < low {
                return None;
            }
            elements.push(CharSetElement::Range(low, high));
            i += 3;
        } else {
            elements.push(CharSetElement::Char(low));
            i += 1;
        }
    }

    Some(CharSet {
        elements,
        case_insensitive,
        invert: false,
    })
}

// ============================================================================
// SCANNER
// ============================================================================

pub struct Scanner<'src> {
    lexer: logos::Lexer<'src, Lexeme>,
    line_starts: Vec<usize>,
    /// Line on which the previously emitted token ended.
    last_line: Option<usize>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            lexer: Lexeme::lexer(source),
            line_starts,
            last_line: None,
        }
    }

    fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let column = self.lexer.source()[line_start..offset].chars().count() + 1;
        Position {
            offset,
            line: line + 1,
            column,
        }
    }

    fn span_of(&self, range: std::ops::Range<usize>) -> Span {
        Span::new(self.position(range.start), self.position(range.end))
    }
}

fn join_comment(lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

impl TokenSource for Scanner<'_> {
    fn next_token(&mut self) -> MageResult<Token> {
        let mut comment = Vec::new();
        loop {
            let Some(result) = self.lexer.next() else {
                let end = self.position(self.lexer.source().len());
                return Ok(Token::new(TokenKind::EndOfFile, Span::new(end, end))
                    .with_comment(join_comment(comment)));
            };
            let span = self.span_of(self.lexer.span());
            let lexeme = result.map_err(|()| MageError::invalid_token(self.lexer.slice(), span))?;

            if let Lexeme::Comment(text) = lexeme {
                // Trailing comments belong to the line they end, not the next token.
                if self.last_line != Some(span.start.line) {
                    comment.push(text);
                }
                continue;
            }

            let Some(token) = lexeme.into_token(span) else {
                continue;
            };
            self.last_line = Some(span.end.line);
            let token = token.with_comment(join_comment(comment));
            trace!("scanned {} at {}", token.kind, token.span.start);
            return Ok(token);
        }
    }
}

/// Scans all of `source`, including the final `EndOfFile` token.
pub fn tokenize(source: &str) -> MageResult<Vec<Token>> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token()?;
        let done = token.kind == TokenKind::EndOfFile;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
