// tests/parser_tests.rs

use magelang::ast::{CharSetElement, Expr, ExprKind, Grammar, RuleFlags};
use magelang::errors::{ErrorType, MageError};
use magelang::syntax::Parser;
use rstest::rstest;

fn parse_expr(source: &str) -> Expr {
    Parser::from_source(source).parse_expr().unwrap()
}

fn parse_grammar(source: &str) -> Grammar {
    Parser::from_source(source).parse_grammar().unwrap()
}

fn ref_name(expr: &Expr) -> &str {
    match &expr.kind {
        ExprKind::Ref(name) => name,
        _ => panic!("expected a reference, got {}", expr.kind_name()),
    }
}

fn syntax_error(source: &str) -> MageError {
    let err = Parser::from_source(source).parse_grammar().unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Syntax);
    err
}

// ---
// Quantifiers and lists
// ---

#[rstest]
#[case("a+", 1, None)]
#[case("a*", 0, None)]
#[case("a?", 0, Some(1))]
#[case("a{4}", 4, Some(4))]
#[case("a{3,}", 3, None)]
#[case("a{2,5}", 2, Some(5))]
#[case("a{0,0}", 0, Some(0))]
fn test_quantifiers(#[case] source: &str, #[case] min: u64, #[case] max: Option<u64>) {
    let parsed = parse_expr(source);
    let ExprKind::Repeat {
        expr,
        min: got_min,
        max: got_max,
    } = &parsed.kind
    else {
        panic!("expected a repeat for {source}");
    };
    assert_eq!(ref_name(expr), "a");
    assert_eq!((*got_min, *got_max), (min, max));
}

#[test]
fn test_quantifiers_stack() {
    let parsed = parse_expr("a+?");
    let ExprKind::Repeat { expr: outer, min: 0, max: Some(1) } = &parsed.kind else {
        panic!("expected an optional outside");
    };
    assert!(matches!(
        outer.kind,
        ExprKind::Repeat { min: 1, max: None, .. }
    ));
}

#[rstest]
#[case("a%b", 0)]
#[case("a%%b", 1)]
#[case("a %%% b", 2)]
fn test_lists(#[case] source: &str, #[case] min_count: u64) {
    let parsed = parse_expr(source);
    let ExprKind::List {
        element,
        separator: Some(separator),
        min_count: got,
    } = &parsed.kind
    else {
        panic!("expected a list for {source}");
    };
    assert_eq!(ref_name(element), "a");
    assert_eq!(ref_name(separator), "b");
    assert_eq!(*got, min_count);
}

#[test]
fn test_list_binds_tighter_than_quantifier() {
    let parsed = parse_expr("a % ',' +");
    let ExprKind::Repeat { expr, .. } = &parsed.kind else {
        panic!("expected a repeat outside");
    };
    assert!(matches!(expr.kind, ExprKind::List { .. }));
}

// ---
// Sequences, choices and collapsing
// ---

#[rstest]
#[case("a")]
#[case("(a)")]
#[case("((a))")]
fn test_singletons_collapse(#[case] source: &str) {
    assert_eq!(ref_name(&parse_expr(source)), "a");
}

#[test]
fn test_choice_of_sequences() {
    let parsed = parse_expr("a b | c");
    let ExprKind::Choice(alternatives) = &parsed.kind else {
        panic!("expected a choice");
    };
    assert_eq!(alternatives.len(), 2);
    assert!(matches!(&alternatives[0].kind, ExprKind::Seq(items) if items.len() == 2));
    assert_eq!(ref_name(&alternatives[1]), "c");
}

#[rstest]
#[case("a = b c\nd = e")]
#[case("a = b c\npub d = e")]
#[case("a = b c\ntoken d = e")]
#[case("a = b c\nextern d")]
#[case("a = b c\n@inline\nd = e")]
#[case("a = b c\nd -> Node = e")]
fn test_sequence_stops_at_next_rule(#[case] source: &str) {
    let grammar = parse_grammar(source);
    assert_eq!(grammar.len(), 2);
    let first = grammar.rules()[0].expr.as_ref().unwrap();
    assert!(matches!(&first.kind, ExprKind::Seq(items) if items.len() == 2));
    assert_eq!(grammar.rules()[1].name, "d");
}

// ---
// Prefixes, labels and character sets
// ---

#[test]
fn test_prefixes_wrap_right_to_left() {
    let parsed = parse_expr("&!/a");
    let ExprKind::Lookahead { expr: not, negated: false } = &parsed.kind else {
        panic!("expected positive lookahead outside");
    };
    let ExprKind::Lookahead { expr: hide, negated: true } = &not.kind else {
        panic!("expected negative lookahead in the middle");
    };
    let ExprKind::Hide(inner) = &hide.kind else {
        panic!("expected hide inside");
    };
    assert_eq!(ref_name(inner), "a");
}

#[test]
fn test_prefix_binds_tighter_than_quantifier() {
    let parsed = parse_expr("!a*");
    assert!(matches!(parsed.kind, ExprKind::Repeat { .. }));
}

#[test]
fn test_label_on_quantified_expression() {
    let parsed = parse_expr("xs:a+");
    assert_eq!(parsed.label.as_deref(), Some("xs"));
    let ExprKind::Repeat { expr, .. } = &parsed.kind else {
        panic!("expected a repeat");
    };
    assert_eq!(expr.label, None);
}

#[test]
fn test_label_after_prefix_attaches_to_primary() {
    let parsed = parse_expr("!x:a");
    assert_eq!(parsed.label, None);
    let ExprKind::Lookahead { expr, .. } = &parsed.kind else {
        panic!("expected a lookahead");
    };
    assert_eq!(expr.label.as_deref(), Some("x"));
}

#[test]
fn test_labels_in_sequence() {
    let parsed = parse_expr("lhs:a op:'+' rhs:b");
    let ExprKind::Seq(items) = &parsed.kind else {
        panic!("expected a sequence");
    };
    let labels: Vec<_> = items.iter().map(|item| item.label.as_deref()).collect();
    assert_eq!(labels, vec![Some("lhs"), Some("op"), Some("rhs")]);
}

#[test]
fn test_inverted_case_insensitive_charset() {
    let ExprKind::CharSet(set) = parse_expr("~[a-f0-9_]i").kind else {
        panic!("expected a character set");
    };
    assert!(set.invert);
    assert!(set.case_insensitive);
    assert_eq!(
        set.elements,
        vec![
            CharSetElement::Range('a', 'f'),
            CharSetElement::Range('0', '9'),
            CharSetElement::Char('_'),
        ]
    );
}

// ---
// Rules
// ---

#[test]
fn test_rule_head() {
    let grammar = parse_grammar("# An integer.\n@inline @memo\npub token int -> Int = [0-9]+");
    let rule = &grammar.rules()[0];
    assert_eq!(rule.name, "int");
    assert_eq!(rule.type_name, "Int");
    assert_eq!(rule.comment.as_deref(), Some("An integer."));
    let decorators: Vec<_> = rule.decorators.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(decorators, vec!["inline", "memo"]);
    assert!(rule.flags.contains(RuleFlags::PUBLIC | RuleFlags::FORCE_TOKEN));
    assert!(!rule.is_extern());
}

#[test]
fn test_extern_rule_has_no_body() {
    let grammar = parse_grammar("pub extern ident -> Ident\nstart = ident");
    let rule = grammar.lookup("ident").unwrap();
    assert!(rule.is_public() && rule.is_extern());
    assert!(rule.expr.is_none());
    assert_eq!(rule.type_name, "Ident");
    assert_eq!(grammar.len(), 2);
}

#[test]
fn test_default_type_name() {
    let grammar = parse_grammar("a = 'a'");
    assert_eq!(grammar.rules()[0].type_name, "string");
}

#[test]
fn test_duplicate_names_are_kept_and_first_wins() {
    let grammar = parse_grammar("a = 'one'\na = 'two'");
    assert_eq!(grammar.len(), 2);
    let found = grammar.lookup("a").unwrap().expr.as_ref().unwrap();
    assert!(matches!(&found.kind, ExprKind::Lit(text) if text == "one"));
}

#[test]
fn test_empty_grammar() {
    assert!(parse_grammar("# nothing here\n").is_empty());
}

// ---
// Errors
// ---

#[test]
fn test_error_position_and_expectations() {
    let err = syntax_error("a = b\n  c = )");
    assert_eq!(
        err.to_string(),
        "2:7: got an unexpected ')', expected '~', character set, '(', identifier or string literal"
    );
}

#[test]
fn test_unclosed_paren() {
    let err = syntax_error("a = (b c");
    assert_eq!(
        err.to_string(),
        "1:9: got an unexpected end of file, expected ')'"
    );
}

#[test]
fn test_missing_equals() {
    let err = syntax_error("a 'x'");
    assert_eq!(err.to_string(), "1:3: got an unexpected string literal, expected '='");
}

#[test]
fn test_modifier_out_of_order_is_read_as_name() {
    let err = syntax_error("extern pub x");
    assert_eq!(
        err.to_string(),
        "1:8: got an unexpected 'pub' keyword, expected identifier"
    );
}

#[test]
fn test_reversed_bounds() {
    let err = syntax_error("a = b{5,2}");
    assert!(matches!(err, MageError::InvalidBounds { min: 5, max: 2, .. }));
    assert_eq!(err.position().unwrap().column, 10);
}

#[test]
fn test_bounds_need_an_integer() {
    let err = syntax_error("a = b{,2}");
    assert_eq!(err.to_string(), "1:7: got an unexpected ',', expected integer");
}

// ---
// Canonical printing
// ---

const SAMPLE: &str = r#"
# Arithmetic
@inline
pub token number -> Int = [0-9]+
extern ident
pub expr = term (('+' | "-") term)*
term = lhs:factor ops:(op:'*' rhs:factor)*
factor = !'(' number | '(' expr ')' | ~[a-z\-]i{2,5}
args = expr %% ','
ws = /[ \t]* &ident
"#;

#[rstest]
#[case(SAMPLE)]
#[case("a = (x:b)+ c:(d | e)?")]
#[case("a = !(b c) /d* e{3,}")]
#[case("a = (b % c)+ ((d))")]
#[case("a = 'it\\'s' \"q\\\"\" [\\]\\-]")]
fn test_print_then_parse_is_idempotent(#[case] source: &str) {
    let first = parse_grammar(source).to_string();
    let second = parse_grammar(&first).to_string();
    assert_eq!(first, second);
}

#[test]
fn test_canonical_text() {
    let printed = parse_grammar(SAMPLE).to_string();
    let expected = "\
# Arithmetic
@inline
pub token number -> Int = [0-9]+
extern ident
pub expr = term (('+' | '-') term)*
term = lhs:factor ops:(op:'*' rhs:factor)*
factor = !'(' number | '(' expr ')' | ~[a-z\\-]i{2,5}
args = expr %% ','
ws = /[ \\t]* &ident
";
    assert_eq!(printed, expected);
}
