//! The `magelang` command-line driver.
//!
//! Reads grammar files, runs them through [`crate::pipeline`] and prints the
//! result. Every failing command exits with status 1.

pub mod args;
pub mod output;

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use log::{debug, LevelFilter};
use walkdir::WalkDir;

use crate::{
    errors::SourceContext,
    passes::classify_all,
    pipeline::{compile, parse_source},
};

pub use args::{Command, MageArgs};

/// File extension of grammar files picked up when walking directories.
pub const GRAMMAR_EXTENSION: &str = "mage";

/// Environment variable read for the log level when no `-v` is given.
pub const LOG_ENV: &str = "MAGELANG_LOG";

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

pub fn run() {
    let args = MageArgs::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Check { paths } => {
            if !check_paths(&paths) {
                process::exit(1);
            }
        }

        Command::Ast { file, json } => {
            let source = read_file_or_exit(&file);
            let grammar = parse_source(&source.content).unwrap_or_else(|e| {
                output::print_error(&source, e);
                process::exit(1);
            });
            if json {
                match serde_json::to_string_pretty(&grammar) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("error: cannot serialize grammar: {e}");
                        process::exit(1);
                    }
                }
            } else {
                print!("{grammar}");
            }
        }

        Command::Classify { file } => {
            let source = read_file_or_exit(&file);
            let grammar = compile(&source.content).unwrap_or_else(|e| {
                output::print_error(&source, e);
                process::exit(1);
            });
            match classify_all(&grammar) {
                Ok(results) => output::print_classification(&results),
                Err(e) => {
                    output::print_error(&source, e);
                    process::exit(1);
                }
            }
        }

        Command::Fmt { file, diff } => {
            let source = read_file_or_exit(&file);
            let grammar = parse_source(&source.content).unwrap_or_else(|e| {
                output::print_error(&source, e);
                process::exit(1);
            });
            let formatted = grammar.to_string();
            if diff {
                output::print_diff(&source.content, &formatted);
            } else {
                print!("{formatted}");
            }
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => std::env::var(LOG_ENV)
            .ok()
            .and_then(|level| level.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // A logger may already be installed when embedded; keep that one.
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}

fn read_file_or_exit(path: &Path) -> SourceContext {
    match fs::read_to_string(path) {
        Ok(content) => SourceContext::from_file(path.display().to_string(), content),
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", path.display());
            process::exit(1);
        }
    }
}

/// Files named by `paths`, with directories expanded to the grammar files
/// under them in sorted order.
fn collect_grammar_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().is_some_and(|ext| ext == GRAMMAR_EXTENSION) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

/// Compiles every grammar file, reporting each failure. True if all passed.
fn check_paths(paths: &[PathBuf]) -> bool {
    let files = match collect_grammar_files(paths) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("error: cannot walk directory: {e}");
            return false;
        }
    };
    debug!("checking {} grammar files", files.len());

    let mut all_ok = true;
    for file in files {
        let content = match fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("error: cannot read {}: {e}", file.display());
                all_ok = false;
                continue;
            }
        };
        let source = SourceContext::from_file(file.display().to_string(), content);
        match compile(&source.content) {
            Ok(_) => output::print_ok(&source.name),
            Err(e) => {
                output::print_error(&source, e);
                all_ok = false;
            }
        }
    }
    all_ok
}
