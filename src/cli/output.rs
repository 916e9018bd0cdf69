//! User-facing output for the CLI: diagnostics, rule tables and diffs.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::Rule;
use crate::errors::{MageError, SourceContext};

/// Renders `error` against `source` through miette.
pub fn print_error(source: &SourceContext, error: MageError) {
    let report = source.report(error);
    eprintln!("{report:?}");
}

pub fn print_ok(name: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = write!(stdout, "ok");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {name}");
}

/// One `<rule>: token|parse|extern` line per rule.
pub fn print_classification(results: &[(&Rule, bool)]) {
    for (rule, is_parse_rule) in results {
        let kind = if rule.is_extern() {
            "extern"
        } else if *is_parse_rule {
            "parse"
        } else {
            "token"
        };
        println!("{}: {kind}", rule.name);
    }
}

/// Line diff from `before` to `after`, added lines green, removed lines red.
pub fn print_diff(before: &str, after: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let changeset = Changeset::new(before, after, "\n");
    for diff in &changeset.diffs {
        let (marker, text, color) = match diff {
            Difference::Same(text) => (' ', text, None),
            Difference::Add(text) => ('+', text, Some(Color::Green)),
            Difference::Rem(text) => ('-', text, Some(Color::Red)),
        };
        let _ = stdout.set_color(ColorSpec::new().set_fg(color));
        for line in text.lines() {
            let _ = writeln!(stdout, "{marker}{line}");
        }
    }
    let _ = stdout.reset();
}
