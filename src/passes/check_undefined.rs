//! Undefined rule reference checking.

use log::debug;

use crate::ast::{Expr, ExprKind, Grammar, Span};
use crate::errors::{MageError, MageResult};

/// Fails with [`MageError::UndefinedRule`] on the first reference, in source
/// order, that names no rule. Returns the grammar untouched otherwise.
pub fn check_undefined(grammar: Grammar) -> MageResult<Grammar> {
    for rule in grammar.rules() {
        let Some(body) = rule.body()? else {
            continue;
        };
        let mut refs = Vec::new();
        collect_refs(body, &mut refs)?;
        for (name, span) in refs {
            if grammar.lookup(name).is_none() {
                return Err(MageError::undefined_rule(name, Some(span)));
            }
        }
    }
    debug!("all references resolve in {} rules", grammar.len());
    Ok(grammar)
}

/// Pushes the name and span of every `Ref` under `expr`, left to right.
fn collect_refs<'a>(expr: &'a Expr, out: &mut Vec<(&'a str, Span)>) -> MageResult<()> {
    match &expr.kind {
        ExprKind::Ref(name) => out.push((name.as_str(), expr.span)),
        ExprKind::Seq(items) | ExprKind::Choice(items) if items.is_empty() => {
            return Err(MageError::internal(format!(
                "{} node without children",
                expr.kind_name()
            )));
        }
        _ => {}
    }
    for child in expr.children() {
        collect_refs(child, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Rule, RuleFlags, Span};
    use crate::errors::ErrorType;

    #[test]
    fn test_extern_targets_resolve() {
        let grammar = Grammar::new(vec![
            Rule::new("start", Expr::reference("ident"), RuleFlags::PUBLIC),
            Rule::external("ident", RuleFlags::empty()),
        ]);
        let checked = check_undefined(grammar.clone()).unwrap();
        assert_eq!(checked, grammar);
    }

    #[test]
    fn test_first_unresolved_name_is_reported() {
        let body = Expr::new(
            ExprKind::Seq(vec![Expr::reference("first"), Expr::reference("second")]),
            Span::default(),
        );
        let grammar = Grammar::new(vec![Rule::new("start", body, RuleFlags::PUBLIC)]);
        let err = check_undefined(grammar).unwrap_err();
        assert_eq!(err.to_string(), "Undefined rule referenced: first");
        assert_eq!(err.error_type(), ErrorType::Semantic);
    }

    #[test]
    fn test_refs_are_collected_with_their_spans() {
        let grammar = crate::pipeline::parse_source("start = 'a' % sep | !other").unwrap();
        let mut refs = Vec::new();
        collect_refs(grammar.rules()[0].body().unwrap().unwrap(), &mut refs).unwrap();
        let found: Vec<_> = refs.iter().map(|(name, span)| (*name, span.start.offset)).collect();
        assert_eq!(found, vec![("sep", 14), ("other", 21)]);
    }

    #[test]
    fn test_empty_choice_is_internal() {
        let body = Expr::new(ExprKind::Choice(Vec::new()), Span::default());
        let grammar = Grammar::new(vec![Rule::new("start", body, RuleFlags::empty())]);
        let err = check_undefined(grammar).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Internal);
    }
}
