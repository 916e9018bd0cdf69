//! Grammar text to AST.
//!
//! [`scanner`] turns text into tokens, [`cursor`] buffers them for lookahead
//! and [`parser`] builds the [`crate::ast::Grammar`].

pub mod cursor;
pub mod parser;
pub mod scanner;
pub mod token;

pub use cursor::{TokenCursor, TokenSource};
pub use parser::{Parser, PostfixOp, PrefixOp};
pub use scanner::{tokenize, Scanner};
pub use token::{Token, TokenKind, TokenValue};
