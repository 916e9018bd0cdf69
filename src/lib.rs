//! Magelang grammar front end.
//!
//! Parses PEG-style grammar text into an AST and checks it before code
//! generation:
//!
//! ```text
//! text -> Scanner -> TokenCursor -> Parser -> Grammar -> passes
//! ```
//!
//! [`pipeline::compile`] runs the whole chain.

pub mod ast;
pub mod cli;
pub mod errors;
pub mod passes;
pub mod pipeline;
pub mod syntax;

pub use ast::{Expr, ExprKind, Grammar, Rule, RuleFlags};
pub use errors::{ErrorType, MageError, MageResult, SourceContext};
pub use passes::{check_undefined, classify, classify_all};
pub use pipeline::{compile, parse_source};
