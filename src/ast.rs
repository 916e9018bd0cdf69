//! Grammar AST for Magelang.
//!
//! A [`Grammar`] is a flat, owned list of [`Rule`]s. Rules refer to each other
//! only by name through [`ExprKind::Ref`], so the expression trees stay strictly
//! owned and acyclic even though the rule graph they describe is not. Names are
//! resolved with [`Grammar::lookup`], which is built once when the grammar is
//! constructed.

mod display;

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::errors::{MageError, MageResult};

// ============================================================================
// SOURCE LOCATIONS
// ============================================================================

/// A point in the source text. `line` and `column` are 1-based, `column`
/// counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

// ============================================================================
// GRAMMAR AND RULES
// ============================================================================

/// An ordered collection of rules with a name index.
///
/// Duplicate names are allowed; [`Grammar::lookup`] resolves to the first rule
/// with a given name in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Rule>", into = "Vec<Rule>")]
pub struct Grammar {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl Grammar {
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut index = HashMap::with_capacity(rules.len());
        for (i, rule) in rules.iter().enumerate() {
            index.entry(rule.name.clone()).or_insert(i);
        }
        Self { rules, index }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn lookup(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl From<Vec<Rule>> for Grammar {
    fn from(rules: Vec<Rule>) -> Self {
        Grammar::new(rules)
    }
}

impl From<Grammar> for Vec<Rule> {
    fn from(grammar: Grammar) -> Self {
        grammar.rules
    }
}

/// Modifier bits set by the `pub`, `extern` and `token` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RuleFlags(u8);

impl RuleFlags {
    pub const PUBLIC: RuleFlags = RuleFlags(1 << 0);
    pub const EXTERN: RuleFlags = RuleFlags(1 << 1);
    pub const FORCE_TOKEN: RuleFlags = RuleFlags(1 << 2);

    pub const fn empty() -> Self {
        RuleFlags(0)
    }

    pub const fn contains(self, other: RuleFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: RuleFlags) {
        self.0 |= other.0;
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for RuleFlags {
    type Output = RuleFlags;

    fn bitor(self, rhs: RuleFlags) -> RuleFlags {
        RuleFlags(self.0 | rhs.0)
    }
}

pub const DEFAULT_TYPE_NAME: &str = "string";

/// A named production. Extern rules have no body, every other rule has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub expr: Option<Expr>,
    pub flags: RuleFlags,
    pub type_name: String,
    pub decorators: Vec<Decorator>,
    pub comment: Option<String>,
    pub span: Span,
}

impl Rule {
    /// A rule with a body, default type and no decorators.
    pub fn new(name: impl Into<String>, expr: Expr, flags: RuleFlags) -> Self {
        Self {
            name: name.into(),
            expr: Some(expr),
            flags,
            type_name: DEFAULT_TYPE_NAME.to_string(),
            decorators: Vec::new(),
            comment: None,
            span: Span::default(),
        }
    }

    /// A rule implemented outside the grammar.
    pub fn external(name: impl Into<String>, flags: RuleFlags) -> Self {
        Self {
            name: name.into(),
            expr: None,
            flags: flags | RuleFlags::EXTERN,
            type_name: DEFAULT_TYPE_NAME.to_string(),
            decorators: Vec::new(),
            comment: None,
            span: Span::default(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.flags.contains(RuleFlags::PUBLIC)
    }

    pub fn is_extern(&self) -> bool {
        self.flags.contains(RuleFlags::EXTERN)
    }

    pub fn is_force_token(&self) -> bool {
        self.flags.contains(RuleFlags::FORCE_TOKEN)
    }

    /// The rule body, checked against the extern invariant.
    pub fn body(&self) -> MageResult<Option<&Expr>> {
        match (self.is_extern(), &self.expr) {
            (true, None) => Ok(None),
            (false, Some(expr)) => Ok(Some(expr)),
            (true, Some(_)) => Err(MageError::internal(format!(
                "extern rule `{}` has a body",
                self.name
            ))),
            (false, None) => Err(MageError::internal(format!(
                "rule `{}` has no body",
                self.name
            ))),
        }
    }
}

/// `@name` metadata attached to a rule. Carried through, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decorator {
    pub name: String,
    pub span: Span,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// A grammar expression node. `label` names the node's result for code
/// generation and has no effect on what the expression matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub label: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Reference to another rule by name.
    Ref(String),
    Lit(String),
    CharSet(CharSet),
    Seq(Vec<Expr>),
    /// Ordered alternatives, first match wins.
    Choice(Vec<Expr>),
    List {
        element: Box<Expr>,
        separator: Option<Box<Expr>>,
        min_count: u64,
    },
    /// `max` of `None` means unbounded.
    Repeat {
        expr: Box<Expr>,
        min: u64,
        max: Option<u64>,
    },
    Lookahead {
        expr: Box<Expr>,
        negated: bool,
    },
    Hide(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSet {
    pub elements: Vec<CharSetElement>,
    pub case_insensitive: bool,
    pub invert: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharSetElement {
    Char(char),
    /// Inclusive on both ends.
    Range(char, char),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            label: None,
            span,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Ref(name.into()), Span::default())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Expr::new(ExprKind::Lit(text.into()), Span::default())
    }

    /// The variant name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Ref(_) => "Ref",
            ExprKind::Lit(_) => "Lit",
            ExprKind::CharSet(_) => "CharSet",
            ExprKind::Seq(_) => "Seq",
            ExprKind::Choice(_) => "Choice",
            ExprKind::List { .. } => "List",
            ExprKind::Repeat { .. } => "Repeat",
            ExprKind::Lookahead { .. } => "Lookahead",
            ExprKind::Hide(_) => "Hide",
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Ref(_) | ExprKind::Lit(_) | ExprKind::CharSet(_) => Vec::new(),
            ExprKind::Seq(items) | ExprKind::Choice(items) => items.iter().collect(),
            ExprKind::List {
                element, separator, ..
            } => std::iter::once(element.as_ref())
                .chain(separator.as_deref())
                .collect(),
            ExprKind::Repeat { expr, .. }
            | ExprKind::Lookahead { expr, .. }
            | ExprKind::Hide(expr) => vec![expr.as_ref()],
        }
    }
}
