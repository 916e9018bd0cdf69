//! Analysis passes over a parsed [`Grammar`].
//!
//! Passes never modify the grammar. Checking passes take it by value and
//! hand it back on success so they can be chained with [`pipe`]. Run
//! [`check_undefined`] before [`classify`], which expects every reference to
//! resolve.

pub mod check_undefined;
pub mod classify;

pub use check_undefined::check_undefined;
pub use classify::{classify, classify_all, Classifier};

use crate::ast::Grammar;
use crate::errors::MageResult;

/// A checking pass: the grammar back on success, the first error otherwise.
pub type Pass = fn(Grammar) -> MageResult<Grammar>;

/// Threads `grammar` through `passes` in order, stopping at the first error.
pub fn pipe(grammar: Grammar, passes: &[Pass]) -> MageResult<Grammar> {
    passes.iter().try_fold(grammar, |grammar, pass| pass(grammar))
}
