//! Implementation of `refql expand`.

use std::process::ExitCode;

use refql_query::ReferenceProvider;

use crate::cli::{args::ExpandCommand, context::CommandContext};

/// Prints the query with every resolvable `#N` replaced by `(text of query N)`.
pub fn run(ctx: &CommandContext, cmd: &ExpandCommand) -> ExitCode {
    let references = ReferenceProvider::new(cmd.refs.iter().cloned());
    match references.expand(&cmd.query, ctx.config.parser.max_reference_depth) {
        Ok(expanded) => {
            println!("{expanded}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
