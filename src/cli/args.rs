//! Command-line arguments for the `magelang` binary, declared with clap's
//! derive API.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "magelang",
    version,
    about = "Parse and check Magelang grammars."
)]
pub struct MageArgs {
    /// Log more. Pass twice for trace output.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse grammars and check that every rule reference resolves.
    Check {
        /// Grammar files, or directories to search for `.mage` files.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the parsed grammar.
    Ast {
        #[arg(required = true)]
        file: PathBuf,
        /// Print JSON instead of grammar text.
        #[arg(long)]
        json: bool,
    },
    /// Report whether each rule is a token rule or a parse rule.
    Classify {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Print a grammar in canonical form.
    Fmt {
        #[arg(required = true)]
        file: PathBuf,
        /// Show a diff against the input instead.
        #[arg(long)]
        diff: bool,
    },
}
