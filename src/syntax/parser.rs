//! Magelang grammar parser.
//!
//! Recursive descent over a [`TokenCursor`]. Expressions follow a fixed
//! precedence hierarchy, tightest first:
//!
//! 1. primary: `[set]`, `~[set]`, `'lit'`, `name`, `( expr )`
//! 2. list suffix: `primary %... primary`
//! 3. prefixes: `!`, `&`, `/`
//! 4. postfix quantifiers: `+`, `*`, `?`, `{m}`, `{m,}`, `{m,n}`
//! 5. sequence
//! 6. choice: `seq | seq`
//!
//! Rules have no terminator. A sequence ends where the next rule begins,
//! which the parser detects with up to two tokens of lookahead.

use log::{debug, trace};

use crate::ast::{
    Decorator, Expr, ExprKind, Grammar, Rule, RuleFlags, Span, DEFAULT_TYPE_NAME,
};
use crate::errors::{MageError, MageResult};
use crate::syntax::cursor::{TokenCursor, TokenSource};
use crate::syntax::scanner::Scanner;
use crate::syntax::token::TokenKind;

// ============================================================================
// OPERATORS
// ============================================================================

/// Operators written before an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    /// `!e`: succeeds where `e` fails, consumes nothing.
    NotFollowedBy,
    /// `&e`: succeeds where `e` succeeds, consumes nothing.
    FollowedBy,
    /// `/e`: matches `e` but drops it from the result.
    Hide,
}

impl PrefixOp {
    pub fn from_kind(kind: TokenKind) -> Option<PrefixOp> {
        match kind {
            TokenKind::Excl => Some(PrefixOp::NotFollowedBy),
            TokenKind::Amp => Some(PrefixOp::FollowedBy),
            TokenKind::Slash => Some(PrefixOp::Hide),
            _ => None,
        }
    }

    fn apply(self, inner: Expr, op_span: Span) -> Expr {
        let span = op_span.to(inner.span);
        let kind = match self {
            PrefixOp::NotFollowedBy => ExprKind::Lookahead {
                expr: Box::new(inner),
                negated: true,
            },
            PrefixOp::FollowedBy => ExprKind::Lookahead {
                expr: Box::new(inner),
                negated: false,
            },
            PrefixOp::Hide => ExprKind::Hide(Box::new(inner)),
        };
        Expr::new(kind, span)
    }
}

/// Quantifiers written after an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    OneOrMore,
    ZeroOrMore,
    Optional,
    /// `{m}`, `{m,}` or `{m,n}`
    Counted,
}

impl PostfixOp {
    pub fn from_kind(kind: TokenKind) -> Option<PostfixOp> {
        match kind {
            TokenKind::Plus => Some(PostfixOp::OneOrMore),
            TokenKind::Star => Some(PostfixOp::ZeroOrMore),
            TokenKind::Question => Some(PostfixOp::Optional),
            TokenKind::LBrace => Some(PostfixOp::Counted),
            _ => None,
        }
    }
}

const PRIMARY_START: [TokenKind; 5] = [
    TokenKind::Tilde,
    TokenKind::CharSet,
    TokenKind::LParen,
    TokenKind::Ident,
    TokenKind::Str,
];

fn repeat(expr: Expr, min: u64, max: Option<u64>, end: Span) -> Expr {
    let span = expr.span.to(end);
    Expr::new(
        ExprKind::Repeat {
            expr: Box::new(expr),
            min,
            max,
        },
        span,
    )
}

/// Wraps `items` unless there is exactly one, which is returned as is.
fn collapse(items: Vec<Expr>, wrap: fn(Vec<Expr>) -> ExprKind) -> Expr {
    match <[Expr; 1]>::try_from(items) {
        Ok([only]) => only,
        Err(items) => {
            let span = items
                .iter()
                .map(|item| item.span)
                .reduce(Span::to)
                .unwrap_or_default();
            Expr::new(wrap(items), span)
        }
    }
}

// ============================================================================
// PARSER
// ============================================================================

pub struct Parser<S> {
    cursor: TokenCursor<S>,
}

impl<'src> Parser<Scanner<'src>> {
    /// A parser reading grammar text directly.
    pub fn from_source(source: &'src str) -> Self {
        Parser::new(Scanner::new(source))
    }
}

impl<S: TokenSource> Parser<S> {
    pub fn new(source: S) -> Self {
        Self {
            cursor: TokenCursor::new(source),
        }
    }

    /// Parses rules until end of input.
    pub fn parse_grammar(&mut self) -> MageResult<Grammar> {
        let mut rules = Vec::new();
        while self.cursor.peek_kind(0)? != TokenKind::EndOfFile {
            rules.push(self.parse_rule()?);
        }
        debug!("parsed grammar with {} rules", rules.len());
        Ok(Grammar::new(rules))
    }

    pub fn parse_rule(&mut self) -> MageResult<Rule> {
        let head = self.cursor.peek(0)?;
        let comment = head.comment.clone();
        let start = head.span;

        let mut decorators = Vec::new();
        while self.cursor.peek_kind(0)? == TokenKind::At {
            let at = self.cursor.take()?;
            let name = self.cursor.expect(TokenKind::Ident)?;
            decorators.push(Decorator {
                name: name.text()?.to_string(),
                span: at.span.to(name.span),
            });
        }

        let mut flags = RuleFlags::empty();
        for (keyword, flag) in [
            (TokenKind::Pub, RuleFlags::PUBLIC),
            (TokenKind::Extern, RuleFlags::EXTERN),
            (TokenKind::Token, RuleFlags::FORCE_TOKEN),
        ] {
            if self.cursor.peek_kind(0)? == keyword {
                self.cursor.take()?;
                flags.insert(flag);
            }
        }

        let name_token = self.cursor.expect(TokenKind::Ident)?;
        let name = name_token.text()?.to_string();
        let mut end = name_token.span;

        let mut type_name = DEFAULT_TYPE_NAME.to_string();
        if self.cursor.peek_kind(0)? == TokenKind::RArrow {
            self.cursor.take()?;
            let type_token = self.cursor.expect(TokenKind::Ident)?;
            type_name = type_token.text()?.to_string();
            end = type_token.span;
        }

        let expr = if flags.contains(RuleFlags::EXTERN) {
            None
        } else {
            self.cursor.expect(TokenKind::Equals)?;
            let expr = self.parse_expr()?;
            end = expr.span;
            Some(expr)
        };

        trace!("parsed rule `{name}` ending at {}", end.end);
        Ok(Rule {
            name,
            expr,
            flags,
            type_name,
            decorators,
            comment,
            span: start.to(end),
        })
    }

    /// Parses a choice, the loosest level of the hierarchy.
    pub fn parse_expr(&mut self) -> MageResult<Expr> {
        let mut alternatives = vec![self.parse_sequence()?];
        while self.cursor.peek_kind(0)? == TokenKind::VBar {
            self.cursor.take()?;
            alternatives.push(self.parse_sequence()?);
        }
        Ok(collapse(alternatives, ExprKind::Choice))
    }

    fn parse_sequence(&mut self) -> MageResult<Expr> {
        let mut items = vec![self.parse_quantified()?];
        while !self.at_sequence_end()? {
            items.push(self.parse_quantified()?);
        }
        Ok(collapse(items, ExprKind::Seq))
    }

    /// True before a token that closes the current sequence or opens the
    /// next rule.
    fn at_sequence_end(&mut self) -> MageResult<bool> {
        let kind = self.cursor.peek_kind(0)?;
        Ok(match kind {
            TokenKind::EndOfFile | TokenKind::VBar | TokenKind::RParen | TokenKind::At => true,
            TokenKind::Ident => matches!(
                self.cursor.peek_kind(1)?,
                TokenKind::Equals | TokenKind::RArrow
            ),
            kind => kind.is_modifier(),
        })
    }

    fn parse_quantified(&mut self) -> MageResult<Expr> {
        let label = self.parse_label()?;
        let mut expr = self.parse_prefixed()?;
        while let Some(op) = PostfixOp::from_kind(self.cursor.peek_kind(0)?) {
            let token = self.cursor.take()?;
            expr = match op {
                PostfixOp::OneOrMore => repeat(expr, 1, None, token.span),
                PostfixOp::ZeroOrMore => repeat(expr, 0, None, token.span),
                PostfixOp::Optional => repeat(expr, 0, Some(1), token.span),
                PostfixOp::Counted => {
                    let (min, max, close) = self.parse_bounds()?;
                    repeat(expr, min, max, close)
                }
            };
        }
        if label.is_some() {
            expr.label = label;
        }
        Ok(expr)
    }

    /// The inside of `{...}` after the opening brace, up to and including
    /// the closing one.
    fn parse_bounds(&mut self) -> MageResult<(u64, Option<u64>, Span)> {
        let min = self.cursor.expect(TokenKind::Integer)?.integer()?;
        let next = self.cursor.take()?;
        let (max, close) = match next.kind {
            TokenKind::RBrace => (Some(min), next.span),
            TokenKind::Comma => {
                let token = self.cursor.take()?;
                match token.kind {
                    TokenKind::RBrace => (None, token.span),
                    TokenKind::Integer => {
                        let max = token.integer()?;
                        (Some(max), self.cursor.expect(TokenKind::RBrace)?.span)
                    }
                    _ => {
                        return Err(MageError::unexpected(
                            token,
                            [TokenKind::Integer, TokenKind::RBrace],
                        ))
                    }
                }
            }
            _ => {
                return Err(MageError::unexpected(
                    next,
                    [TokenKind::Comma, TokenKind::RBrace],
                ))
            }
        };
        if let Some(max) = max {
            if max < min {
                return Err(MageError::invalid_bounds(min, max, close));
            }
        }
        Ok((min, max, close))
    }

    fn parse_prefixed(&mut self) -> MageResult<Expr> {
        let mut ops = Vec::new();
        while let Some(op) = PrefixOp::from_kind(self.cursor.peek_kind(0)?) {
            ops.push((op, self.cursor.take()?.span));
        }
        let mut expr = self.parse_list()?;
        // The leftmost prefix ends up outermost.
        for (op, span) in ops.into_iter().rev() {
            expr = op.apply(expr, span);
        }
        Ok(expr)
    }

    fn parse_list(&mut self) -> MageResult<Expr> {
        let element = self.parse_primary()?;
        let mut markers = 0u64;
        while self.cursor.peek_kind(0)? == TokenKind::Percent {
            self.cursor.take()?;
            markers += 1;
        }
        if markers == 0 {
            return Ok(element);
        }
        let separator = self.parse_primary()?;
        let span = element.span.to(separator.span);
        Ok(Expr::new(
            ExprKind::List {
                element: Box::new(element),
                separator: Some(Box::new(separator)),
                min_count: markers - 1,
            },
            span,
        ))
    }

    /// `name:` ahead of an expression.
    fn parse_label(&mut self) -> MageResult<Option<String>> {
        if self.cursor.peek_kind(1)? != TokenKind::Colon {
            return Ok(None);
        }
        let name = self.cursor.expect(TokenKind::Ident)?;
        self.cursor.take()?;
        Ok(Some(name.text()?.to_string()))
    }

    fn parse_primary(&mut self) -> MageResult<Expr> {
        let label = self.parse_label()?;
        let token = self.cursor.take()?;
        let mut expr = match token.kind {
            TokenKind::Tilde => {
                let mut invert = true;
                let mut start = token.span;
                while self.cursor.peek_kind(0)? == TokenKind::Tilde {
                    start = start.to(self.cursor.take()?.span);
                    invert = !invert;
                }
                let set_token = self.cursor.expect(TokenKind::CharSet)?;
                let span = start.to(set_token.span);
                let mut set = set_token.into_charset()?;
                set.invert = invert;
                Expr::new(ExprKind::CharSet(set), span)
            }
            TokenKind::CharSet => {
                let span = token.span;
                Expr::new(ExprKind::CharSet(token.into_charset()?), span)
            }
            TokenKind::Str => Expr::new(ExprKind::Lit(token.text()?.to_string()), token.span),
            TokenKind::Ident => Expr::new(ExprKind::Ref(token.text()?.to_string()), token.span),
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                self.cursor.expect(TokenKind::RParen)?;
                inner
            }
            _ => return Err(MageError::unexpected(token, PRIMARY_START)),
        };
        if label.is_some() {
            expr.label = label;
        }
        Ok(expr)
    }
}
