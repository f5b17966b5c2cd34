//! Implementation of `refql check`.

use std::process::ExitCode;

use refql_config::ConfigWarning;

use crate::cli::{
    context::CommandContext,
    output::{dim, header, subheader, warning},
};

/// Exit codes for `refql check`.
mod exit_codes {
    use std::process::ExitCode;

    /// Configuration is valid with no warnings.
    pub const OK: ExitCode = ExitCode::SUCCESS;
    /// Configuration has warnings but is usable.
    pub const WARNINGS: ExitCode = ExitCode::FAILURE;
}

/// Lists config files, validates the merged configuration and prints hints.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;

    println!("{}", header("Checking configuration..."));
    println!();

    if config.sources.is_empty() {
        println!("{}", dim("No configuration files found."));
        println!();
        println!("Run {} to create a configuration file.", subheader("refql init"));
        return exit_codes::OK;
    }

    println!("{}", subheader("Config files (highest precedence first):"));
    for path in &config.sources {
        println!("  {}", path.display());
    }
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return exit_codes::OK;
    }

    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("  - {}", warning(&w.to_string()));
    }
    println!();

    print_hints(&warnings);

    exit_codes::WARNINGS
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|warning| match warning {
            ConfigWarning::UnknownLanguage { .. } => {
                "Set [analysis] language to a supported stemmer language, e.g. \"english\"."
            }
            ConfigWarning::EmptyWhitelist => {
                "Add fields to [fields] whitelist, or set check = false."
            }
            ConfigWarning::DefaultFieldNotWhitelisted { .. }
            | ConfigWarning::AliasTargetNotWhitelisted { .. } => {
                "Add the canonical field name to [fields] whitelist."
            }
            ConfigWarning::AliasChain { .. } => {
                "Point every alias directly at a canonical field name."
            }
            ConfigWarning::ZeroReferenceDepth => {
                "Raise [parser] max_reference_depth to allow #N references."
            }
        })
        .collect();

    hints.sort_unstable();
    hints.dedup();

    println!("{}", subheader("Hints:"));
    for hint in hints {
        println!("  - {hint}");
    }
}
