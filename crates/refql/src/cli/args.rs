//! Clap argument definitions for the `refql` CLI.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use refql_query::ReferenceMode;

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "refql")]
#[command(about = "Parse, inspect and expand refql queries")]
pub struct Cli {
    /// Log more detail to stderr (-v for debug, -vv for trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// How `#N` references are resolved, as a command-line value.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// Parse references as sub-queries
    Structural,
    /// Substitute reference text before parsing
    Textual,
}

impl From<ModeArg> for ReferenceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Structural => Self::Structural,
            ModeArg::Textual => Self::Textual,
        }
    }
}

/// Flags shared by commands that resolve references.
#[derive(Args, Debug, Clone, Default)]
pub struct ReferenceArgs {
    /// Earlier query that #N refers to; repeat in order (#1, #2, ...)
    #[arg(short = 'r', long = "ref", value_name = "QUERY")]
    pub refs: Vec<String>,

    /// Reference resolution mode [default: from config]
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Arguments for `refql parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query to parse
    pub query: String,

    #[command(flatten)]
    /// Reference flags.
    pub references: ReferenceArgs,

    /// Field for terms without an explicit field [default: from config]
    #[arg(short = 'f', long)]
    pub field: Option<String>,

    /// Print the query tree and provenance stores
    #[arg(long, conflicts_with = "json")]
    pub tree: bool,

    /// Print the query tree and provenance stores as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `refql tokens`.
#[derive(Args, Debug, Clone)]
pub struct TokensCommand {
    /// Query to tokenize
    pub query: String,
}

/// Arguments for `refql expand`.
#[derive(Args, Debug, Clone)]
pub struct ExpandCommand {
    /// Query whose #N markers are replaced
    pub query: String,

    /// Earlier query that #N refers to; repeat in order (#1, #2, ...)
    #[arg(short = 'r', long = "ref", value_name = "QUERY")]
    pub refs: Vec<String>,
}

/// Arguments for `refql init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.refql.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `refql` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a query and print its normalized form
    #[command(after_help = "\
QUERY SYNTAX:
  term              Term in the default field
  term1 term2       Either term (default operator OR)
  a AND b OR c      OR separates AND-runs: (a AND b) OR c
  \"phrase\"~2        Phrase with optional slop
  +term -term       Required / prohibited (also !term, NOT term)
  field:term        Field query (also field=term)
  pre* te?t /re/    Prefix, wildcard and regexp queries
  roam~1            Fuzzy query
  [a TO z}          Range, inclusive or exclusive bounds
  term^2            Boost
  #2                The second query passed with --ref

EXAMPLES:
  refql parse 'title:guide (rust OR golang)'
  refql parse '#1 AND -deprecated' --ref 'ti=rust'
  refql parse --tree '\"error handling\"~2'")]
    Parse(ParseCommand),

    /// Show the lexer's tokens for a query
    Tokens(TokensCommand),

    /// Replace #N markers with the text of earlier queries
    Expand(ExpandCommand),

    /// Initialize refql configuration in current directory
    Init(InitCommand),

    /// Show effective configuration settings
    Config,

    /// Validate configuration and diagnose issues
    Check,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_collects_refs_in_order() {
        let cli = Cli::try_parse_from([
            "refql", "parse", "#2 #1", "--ref", "a", "-r", "b", "--mode", "textual",
        ])
        .unwrap();
        let Commands::Parse(cmd) = cli.command else {
            panic!("expected parse command");
        };
        assert_eq!(cmd.references.refs, vec!["a", "b"]);
        assert!(matches!(cmd.references.mode, Some(ModeArg::Textual)));
    }

    #[test]
    fn tree_and_json_conflict() {
        let result = Cli::try_parse_from(["refql", "parse", "a", "--tree", "--json"]);
        assert!(result.is_err());
    }
}
