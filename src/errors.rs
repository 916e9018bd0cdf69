//! Magelang error handling.
//!
//! Every failure the front end can produce is a [`MageError`]. Variants fall
//! into three families, reported by [`MageError::error_type`]:
//!
//! - **Syntax** errors come from the scanner and the parser and always carry
//!   the line and column of the offending token.
//! - **Semantic** errors come from the analysis passes over a parsed grammar.
//! - **Internal** errors mean the AST or a token broke an invariant the
//!   front end itself is responsible for. They are bugs, not user mistakes.
//!
//! Errors do not own the source text. Use [`SourceContext::report`] to attach
//! it when rendering a diagnostic with `miette`.

use std::fmt;

use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

use crate::ast::{Position, Span};
use crate::syntax::token::{Token, TokenKind};

pub type MageResult<T> = Result<T, MageError>;

// ============================================================================
// ERROR CLASSIFICATION
// ============================================================================

/// Coarse classification of a [`MageError`], used by callers and tests that
/// only care about which stage rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed grammar text: unexpected tokens, bad literals.
    Syntax,
    /// Well-formed grammar that fails a pass, such as an undefined rule.
    Semantic,
    /// A broken invariant inside magelang itself.
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Syntax => "Syntax",
            ErrorType::Semantic => "Semantic",
            ErrorType::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The token kinds a parser would have accepted at the point of failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedKinds(pub Vec<TokenKind>);

impl fmt::Display for ExpectedKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "nothing"),
            [only] => write!(f, "{only}"),
            [init @ .., last] => {
                for (i, kind) in init.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                write!(f, " or {last}")
            }
        }
    }
}

// ============================================================================
// THE ERROR TYPE
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum MageError {
    #[error("{position}: got an unexpected {found}, expected {expected}")]
    #[diagnostic(code(magelang::syntax::unexpected_token))]
    UnexpectedToken {
        found: TokenKind,
        actual: Token,
        expected: ExpectedKinds,
        position: Position,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("{position}: invalid token {text:?}")]
    #[diagnostic(
        code(magelang::syntax::invalid_token),
        help("check for unterminated literals, unknown escapes or reversed character ranges")
    )]
    InvalidToken {
        text: String,
        position: Position,
        #[label("not a valid token")]
        span: SourceSpan,
    },

    #[error("{position}: repetition upper bound {max} is smaller than lower bound {min}")]
    #[diagnostic(code(magelang::syntax::invalid_bounds))]
    InvalidBounds {
        min: u64,
        max: u64,
        position: Position,
        #[label("invalid bounds")]
        span: SourceSpan,
    },

    #[error("Undefined rule referenced: {name}")]
    #[diagnostic(
        code(magelang::semantic::undefined_rule),
        help("define a rule with this name or declare it with `extern`")
    )]
    UndefinedRule {
        name: String,
        #[label("no rule with this name")]
        span: Option<SourceSpan>,
    },

    #[error("internal error: {message}")]
    #[diagnostic(
        code(magelang::internal),
        help("this is a bug in magelang, please report it")
    )]
    Internal { message: String },
}

impl MageError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            MageError::UnexpectedToken { .. }
            | MageError::InvalidToken { .. }
            | MageError::InvalidBounds { .. } => ErrorType::Syntax,
            MageError::UndefinedRule { .. } => ErrorType::Semantic,
            MageError::Internal { .. } => ErrorType::Internal,
        }
    }

    /// The parser met `actual` where only `expected` would do.
    pub fn unexpected(actual: Token, expected: impl Into<Vec<TokenKind>>) -> Self {
        MageError::UnexpectedToken {
            found: actual.kind,
            position: actual.span.start,
            span: to_source_span(actual.span),
            expected: ExpectedKinds(expected.into()),
            actual,
        }
    }

    pub fn invalid_token(text: impl Into<String>, span: Span) -> Self {
        MageError::InvalidToken {
            text: text.into(),
            position: span.start,
            span: to_source_span(span),
        }
    }

    pub fn invalid_bounds(min: u64, max: u64, span: Span) -> Self {
        MageError::InvalidBounds {
            min,
            max,
            position: span.start,
            span: to_source_span(span),
        }
    }

    pub fn undefined_rule(name: impl Into<String>, span: Option<Span>) -> Self {
        MageError::UndefinedRule {
            name: name.into(),
            span: span.map(to_source_span),
        }
    }

    /// Creates an internal error. These indicate magelang bugs, never bad input.
    pub fn internal(message: impl Into<String>) -> Self {
        MageError::Internal {
            message: message.into(),
        }
    }

    /// Line and column of the fault, when the error is tied to the source.
    pub fn position(&self) -> Option<Position> {
        match self {
            MageError::UnexpectedToken { position, .. }
            | MageError::InvalidToken { position, .. }
            | MageError::InvalidBounds { position, .. } => Some(*position),
            MageError::UndefinedRule { .. } | MageError::Internal { .. } => None,
        }
    }
}

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// A named piece of grammar text, used to render diagnostics with snippets.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.clone())
    }

    /// Wraps `error` in a report that renders against this source.
    pub fn report(&self, error: MageError) -> Report {
        Report::new(error).with_source_code(self.to_named_source())
    }
}

/// Converts an AST span into the byte range miette labels expect.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start.offset..span.end.offset)
}
