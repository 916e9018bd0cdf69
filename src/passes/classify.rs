//! Token rule / parse rule classification.
//!
//! A rule is a *parse rule* when its body can reach a `pub` rule, and a
//! *token rule* when everything it reaches is lexical: literals, character
//! sets, extern rules and other token rules. Reaching a `pub` rule stops the
//! search, as does reaching an extern rule. Other references are followed
//! into the referenced rule's body.
//!
//! Rule references may form cycles. While a rule is being classified it is
//! kept in a resolving set, and a reference back into that set counts as
//! lexical. Any other reachable `pub` rule still makes the result `true`.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::ast::{Expr, ExprKind, Grammar, Rule};
use crate::errors::{MageError, MageResult};

/// Rules are told apart by address, so duplicates sharing a name keep
/// separate entries.
type RuleId = *const Rule;

/// Classifies rules of one grammar, remembering results between calls.
pub struct Classifier<'g> {
    grammar: &'g Grammar,
    cache: HashMap<RuleId, bool>,
    resolving: HashSet<RuleId>,
    /// Number of times a reference into `resolving` was cut short.
    cycle_cuts: usize,
}

impl<'g> Classifier<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            cache: HashMap::new(),
            resolving: HashSet::new(),
            cycle_cuts: 0,
        }
    }

    /// `true` for a parse rule, `false` for a token rule. Extern rules are
    /// always `false`.
    pub fn classify(&mut self, rule: &'g Rule) -> MageResult<bool> {
        let is_parse_rule = self.classify_rule(rule)?;
        debug!(
            "rule `{}` is a {} rule",
            rule.name,
            if is_parse_rule { "parse" } else { "token" }
        );
        Ok(is_parse_rule)
    }

    fn classify_rule(&mut self, rule: &'g Rule) -> MageResult<bool> {
        let id: RuleId = rule;
        if let Some(&cached) = self.cache.get(&id) {
            return Ok(cached);
        }

        let Some(body) = rule.body()? else {
            return Ok(false);
        };

        if !self.resolving.insert(id) {
            trace!("cycle through `{}` resolves to token", rule.name);
            self.cycle_cuts += 1;
            return Ok(false);
        }
        let cuts_before = self.cycle_cuts;
        let result = self.classify_expr(body);
        self.resolving.remove(&id);
        let result = result?;

        // A `false` computed under a cut cycle may depend on a rule still
        // being resolved further up, so it is only final at the top.
        let settled = result || self.cycle_cuts == cuts_before || self.resolving.is_empty();
        if settled {
            self.cache.insert(id, result);
        }
        Ok(result)
    }

    fn classify_expr(&mut self, expr: &'g Expr) -> MageResult<bool> {
        match &expr.kind {
            ExprKind::Ref(name) => {
                let target = self
                    .grammar
                    .lookup(name)
                    .ok_or_else(|| MageError::undefined_rule(name.as_str(), Some(expr.span)))?;
                if target.is_public() {
                    Ok(true)
                } else if target.is_extern() {
                    Ok(false)
                } else {
                    self.classify_rule(target)
                }
            }
            ExprKind::Lit(_) | ExprKind::CharSet(_) => Ok(false),
            ExprKind::Seq(items) | ExprKind::Choice(items) => {
                if items.is_empty() {
                    return Err(MageError::internal(format!(
                        "{} node without children",
                        expr.kind_name()
                    )));
                }
                for item in items {
                    if self.classify_expr(item)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ExprKind::List {
                element, separator, ..
            } => {
                if self.classify_expr(element)? {
                    return Ok(true);
                }
                match separator {
                    Some(separator) => self.classify_expr(separator),
                    None => Ok(false),
                }
            }
            ExprKind::Repeat { expr: inner, .. }
            | ExprKind::Lookahead { expr: inner, .. }
            | ExprKind::Hide(inner) => self.classify_expr(inner),
        }
    }
}

/// Classifies a single rule of `grammar`.
pub fn classify<'g>(grammar: &'g Grammar, rule: &'g Rule) -> MageResult<bool> {
    Classifier::new(grammar).classify(rule)
}

/// Classifies every rule in source order with one shared cache.
pub fn classify_all(grammar: &Grammar) -> MageResult<Vec<(&Rule, bool)>> {
    let mut classifier = Classifier::new(grammar);
    let mut results = Vec::with_capacity(grammar.len());
    for rule in grammar.rules() {
        results.push((rule, classifier.classify(rule)?));
    }
    Ok(results)
}
