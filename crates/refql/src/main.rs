//! Command-line interface for the `refql` query parser.

mod cli;

use std::{io, process::ExitCode};

use clap::Parser;
use cli::{
    CommandContext,
    args::{Cli, Commands},
    commands,
};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the log filter.
const LOG_ENV: &str = "REFQL_LOG";

/// Parses arguments, loads configuration and runs the selected command.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = match cli.command {
        Commands::Init(_) => CommandContext::load_cwd_only(),
        _ => CommandContext::load(),
    };
    let ctx = match ctx {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    commands::run(&cli.command, &ctx)
}

/// Installs the stderr log subscriber.
///
/// `REFQL_LOG` wins over `RUST_LOG`; without either, `-v` picks the level.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            EnvFilter::new(match verbose {
                0 => "warn",
                1 => "debug",
                _ => "trace",
            })
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
