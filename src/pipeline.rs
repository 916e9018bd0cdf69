//! Source text to validated grammar.

use crate::ast::Grammar;
use crate::errors::MageResult;
use crate::passes::{check_undefined, pipe, Pass};
use crate::syntax::Parser;

/// Passes every grammar goes through before it is handed on.
pub const CHECKS: &[Pass] = &[check_undefined];

/// Scans and parses `source` without running any pass.
pub fn parse_source(source: &str) -> MageResult<Grammar> {
    Parser::from_source(source).parse_grammar()
}

/// Parses `source` and runs [`CHECKS`] over the result.
pub fn compile(source: &str) -> MageResult<Grammar> {
    pipe(parse_source(source)?, CHECKS)
}
