//! Canonical grammar text for the AST.
//!
//! The output is accepted by the parser again. Parentheses are only written
//! where the precedence hierarchy needs them, and a labelled node that does
//! not start a sequence item is wrapped so its label cannot bind elsewhere.

use std::fmt::{self, Display, Formatter, Write};

use super::{CharSet, CharSetElement, Expr, ExprKind, Grammar, Rule, DEFAULT_TYPE_NAME};

/// Binding strength of an expression position, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Choice,
    Seq,
    Repeat,
    Prefixed,
    List,
    Atom,
}

fn precedence(kind: &ExprKind) -> Prec {
    match kind {
        ExprKind::Choice(_) => Prec::Choice,
        ExprKind::Seq(_) => Prec::Seq,
        ExprKind::Repeat { .. } => Prec::Repeat,
        ExprKind::Lookahead { .. } | ExprKind::Hide(_) => Prec::Prefixed,
        ExprKind::List { .. } => Prec::List,
        ExprKind::Ref(_) | ExprKind::Lit(_) | ExprKind::CharSet(_) => Prec::Atom,
    }
}

/// `item_start` is true where the parser looks for a sequence-item label.
fn write_expr(f: &mut Formatter<'_>, expr: &Expr, min: Prec, item_start: bool) -> fmt::Result {
    match &expr.label {
        Some(_) if !item_start => {
            f.write_char('(')?;
            write_expr(f, expr, Prec::Choice, true)?;
            f.write_char(')')
        }
        Some(label) => {
            write!(f, "{label}:")?;
            write_body(f, expr, min.max(Prec::Repeat))
        }
        None => write_body(f, expr, min),
    }
}

fn write_body(f: &mut Formatter<'_>, expr: &Expr, min: Prec) -> fmt::Result {
    if precedence(&expr.kind) < min {
        f.write_char('(')?;
        write_body(f, expr, Prec::Choice)?;
        return f.write_char(')');
    }
    match &expr.kind {
        ExprKind::Ref(name) => f.write_str(name),
        ExprKind::Lit(text) => write_literal(f, text),
        ExprKind::CharSet(set) => write_charset(f, set),
        ExprKind::Seq(items) => write_joined(f, items, " ", Prec::Repeat),
        ExprKind::Choice(alternatives) => write_joined(f, alternatives, " | ", Prec::Seq),
        ExprKind::List {
            element,
            separator,
            min_count,
        } => {
            write_expr(f, element, Prec::Atom, false)?;
            f.write_char(' ')?;
            for _ in 0..=*min_count {
                f.write_char('%')?;
            }
            if let Some(separator) = separator {
                f.write_char(' ')?;
                write_expr(f, separator, Prec::Atom, false)?;
            }
            Ok(())
        }
        ExprKind::Repeat { expr, min, max } => {
            write_expr(f, expr, Prec::Repeat, false)?;
            match (*min, *max) {
                (0, None) => f.write_char('*'),
                (1, None) => f.write_char('+'),
                (0, Some(1)) => f.write_char('?'),
                (min, None) => write!(f, "{{{min},}}"),
                (min, Some(max)) if min == max => write!(f, "{{{min}}}"),
                (min, Some(max)) => write!(f, "{{{min},{max}}}"),
            }
        }
        ExprKind::Lookahead { expr, negated } => {
            f.write_char(if *negated { '!' } else { '&' })?;
            write_expr(f, expr, Prec::Prefixed, false)
        }
        ExprKind::Hide(expr) => {
            f.write_char('/')?;
            write_expr(f, expr, Prec::Prefixed, false)
        }
    }
}

fn write_joined(f: &mut Formatter<'_>, items: &[Expr], sep: &str, min: Prec) -> fmt::Result {
    if items.is_empty() {
        return f.write_str("()");
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write_expr(f, item, min, true)?;
    }
    Ok(())
}

fn write_literal(f: &mut Formatter<'_>, text: &str) -> fmt::Result {
    f.write_char('\'')?;
    for ch in text.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            ch => f.write_char(ch)?,
        }
    }
    f.write_char('\'')
}

fn write_set_char(f: &mut Formatter<'_>, ch: char) -> fmt::Result {
    match ch {
        '[' | ']' | '\\' | '-' | '^' => write!(f, "\\{ch}"),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        ch => f.write_char(ch),
    }
}

fn write_charset(f: &mut Formatter<'_>, set: &CharSet) -> fmt::Result {
    if set.invert {
        f.write_char('~')?;
    }
    f.write_char('[')?;
    for element in &set.elements {
        match *element {
            CharSetElement::Char(ch) => write_set_char(f, ch)?,
            CharSetElement::Range(low, high) => {
                write_set_char(f, low)?;
                f.write_char('-')?;
                write_set_char(f, high)?;
            }
        }
    }
    f.write_char(']')?;
    if set.case_insensitive {
        f.write_char('i')?;
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_expr(f, self, Prec::Choice, true)
    }
}

impl Display for CharSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_charset(f, self)
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(comment) = &self.comment {
            for line in comment.lines() {
                writeln!(f, "# {line}")?;
            }
        }
        for decorator in &self.decorators {
            writeln!(f, "@{}", decorator.name)?;
        }
        if self.is_public() {
            f.write_str("pub ")?;
        }
        if self.is_extern() {
            f.write_str("extern ")?;
        }
        if self.is_force_token() {
            f.write_str("token ")?;
        }
        f.write_str(&self.name)?;
        if self.type_name != DEFAULT_TYPE_NAME {
            write!(f, " -> {}", self.type_name)?;
        }
        if let Some(expr) = &self.expr {
            write!(f, " = {expr}")?;
        }
        Ok(())
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for rule in self.rules() {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{RuleFlags, Span};
    use super::*;

    fn node(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::default())
    }

    fn repeat(expr: Expr, min: u64, max: Option<u64>) -> Expr {
        node(ExprKind::Repeat {
            expr: Box::new(expr),
            min,
            max,
        })
    }

    #[test]
    fn test_quantifier_suffixes() {
        let a = || Expr::reference("a");
        assert_eq!(repeat(a(), 1, None).to_string(), "a+");
        assert_eq!(repeat(a(), 0, None).to_string(), "a*");
        assert_eq!(repeat(a(), 0, Some(1)).to_string(), "a?");
        assert_eq!(repeat(a(), 4, Some(4)).to_string(), "a{4}");
        assert_eq!(repeat(a(), 3, None).to_string(), "a{3,}");
        assert_eq!(repeat(a(), 2, Some(5)).to_string(), "a{2,5}");
    }

    #[test]
    fn test_parenthesizes_only_when_needed() {
        let choice = node(ExprKind::Choice(vec![
            Expr::reference("a"),
            Expr::reference("b"),
        ]));
        let seq = node(ExprKind::Seq(vec![choice.clone(), Expr::literal("c")]));
        assert_eq!(seq.to_string(), "(a | b) 'c'");
        assert_eq!(repeat(choice, 1, None).to_string(), "(a | b)+");

        let not_repeat = node(ExprKind::Lookahead {
            expr: Box::new(repeat(Expr::reference("a"), 0, None)),
            negated: true,
        });
        assert_eq!(not_repeat.to_string(), "!(a*)");

        let repeat_not = repeat(
            node(ExprKind::Hide(Box::new(Expr::reference("a")))),
            0,
            None,
        );
        assert_eq!(repeat_not.to_string(), "/a*");
    }

    #[test]
    fn test_labels_wrap_outside_item_start() {
        let labelled = repeat(Expr::reference("a"), 1, None).with_label("xs");
        assert_eq!(labelled.to_string(), "xs:a+");

        let inner = repeat(Expr::reference("a").with_label("x"), 1, None);
        assert_eq!(inner.to_string(), "(x:a)+");

        let seq = node(ExprKind::Seq(vec![Expr::reference("a"), Expr::reference("b")]))
            .with_label("pair");
        assert_eq!(seq.to_string(), "pair:(a b)");
    }

    #[test]
    fn test_literal_and_charset_escapes() {
        assert_eq!(Expr::literal("it's\n").to_string(), r"'it\'s\n'");
        let set = CharSet {
            elements: vec![
                CharSetElement::Range('a', 'z'),
                CharSetElement::Char('-'),
                CharSetElement::Char(']'),
            ],
            case_insensitive: true,
            invert: true,
        };
        assert_eq!(set.to_string(), r"~[a-z\-\]]i");
    }

    #[test]
    fn test_rule_display() {
        let mut rule = Rule::new(
            "expr",
            node(ExprKind::List {
                element: Box::new(Expr::reference("item")),
                separator: Some(Box::new(Expr::literal(","))),
                min_count: 1,
            }),
            RuleFlags::PUBLIC | RuleFlags::FORCE_TOKEN,
        );
        rule.type_name = "Node".to_string();
        rule.comment = Some("a list".to_string());
        assert_eq!(rule.to_string(), "# a list\npub token expr -> Node = item %% ','");

        let ext = Rule::external("ident", RuleFlags::empty());
        assert_eq!(ext.to_string(), "extern ident");
    }
}
