//! Buffered lookahead over a token stream.

use std::collections::VecDeque;

use log::trace;

use crate::errors::{MageError, MageResult};
use crate::syntax::token::{Token, TokenKind};

/// Anything that yields tokens one at a time.
///
/// Once input is exhausted a source must keep returning `EndOfFile`.
pub trait TokenSource {
    fn next_token(&mut self) -> MageResult<Token>;
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
    fn next_token(&mut self) -> MageResult<Token> {
        (**self).next_token()
    }
}

/// Arbitrary lookahead over a [`TokenSource`]. Tokens are pulled lazily, only
/// as far as the furthest `peek` requires.
pub struct TokenCursor<S> {
    source: S,
    buffer: VecDeque<Token>,
}

impl<S: TokenSource> TokenCursor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: VecDeque::new(),
        }
    }

    fn fill(&mut self, len: usize) -> MageResult<()> {
        while self.buffer.len() < len {
            let token = self.source.next_token()?;
            trace!("pulled {} at {}", token.kind, token.span.start);
            self.buffer.push_back(token);
        }
        Ok(())
    }

    /// The token `offset` places ahead, without consuming anything.
    pub fn peek(&mut self, offset: usize) -> MageResult<&Token> {
        self.fill(offset + 1)?;
        self.buffer
            .get(offset)
            .ok_or_else(|| MageError::internal("token buffer shorter than requested lookahead"))
    }

    pub fn peek_kind(&mut self, offset: usize) -> MageResult<TokenKind> {
        Ok(self.peek(offset)?.kind)
    }

    /// Consumes and returns the next token.
    pub fn take(&mut self) -> MageResult<Token> {
        self.fill(1)?;
        self.buffer
            .pop_front()
            .ok_or_else(|| MageError::internal("token buffer empty after fill"))
    }

    /// Consumes the next token if it has the given kind, otherwise fails
    /// without consuming.
    pub fn expect(&mut self, kind: TokenKind) -> MageResult<Token> {
        let token = self.peek(0)?;
        if token.kind != kind {
            return Err(MageError::unexpected(token.clone(), vec![kind]));
        }
        self.take()
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::syntax::scanner::Scanner;
    use crate::syntax::token::TokenValue;

    /// Replays fixed kinds and counts how often it was asked.
    struct Counting {
        kinds: Vec<TokenKind>,
        pulls: usize,
    }

    impl TokenSource for Counting {
        fn next_token(&mut self) -> MageResult<Token> {
            let kind = self
                .kinds
                .get(self.pulls)
                .copied()
                .unwrap_or(TokenKind::EndOfFile);
            self.pulls += 1;
            Ok(Token::new(kind, Span::default()).with_value(TokenValue::None))
        }
    }

    fn counting(kinds: &[TokenKind]) -> TokenCursor<Counting> {
        TokenCursor::new(Counting {
            kinds: kinds.to_vec(),
            pulls: 0,
        })
    }

    #[test]
    fn test_peek_never_consumes() {
        let mut cursor = counting(&[TokenKind::Ident, TokenKind::Equals]);
        assert_eq!(cursor.peek_kind(1).unwrap(), TokenKind::Equals);
        assert_eq!(cursor.peek_kind(0).unwrap(), TokenKind::Ident);
        assert_eq!(cursor.take().unwrap().kind, TokenKind::Ident);
        assert_eq!(cursor.take().unwrap().kind, TokenKind::Equals);
        assert_eq!(cursor.into_inner().pulls, 2);
    }

    #[test]
    fn test_pulls_lazily() {
        let mut cursor = counting(&[TokenKind::Pub, TokenKind::Ident, TokenKind::Equals]);
        cursor.peek(0).unwrap();
        cursor.peek(0).unwrap();
        assert_eq!(cursor.source.pulls, 1);
        cursor.peek(2).unwrap();
        assert_eq!(cursor.source.pulls, 3);
    }

    #[test]
    fn test_expect_mismatch_does_not_consume() {
        let mut cursor = counting(&[TokenKind::Ident]);
        let err = cursor.expect(TokenKind::Equals).unwrap_err();
        assert!(matches!(
            err,
            MageError::UnexpectedToken { found: TokenKind::Ident, .. }
        ));
        assert_eq!(cursor.expect(TokenKind::Ident).unwrap().kind, TokenKind::Ident);
    }

    #[test]
    fn test_end_of_file_is_sticky() {
        let mut scanner = Scanner::new("x");
        let mut cursor = TokenCursor::new(&mut scanner);
        cursor.take().unwrap();
        assert_eq!(cursor.peek_kind(5).unwrap(), TokenKind::EndOfFile);
        assert_eq!(cursor.take().unwrap().kind, TokenKind::EndOfFile);
        assert_eq!(cursor.take().unwrap().kind, TokenKind::EndOfFile);
    }
}
