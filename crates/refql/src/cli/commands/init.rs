//! Implementation of `refql init`.

use std::{fs, path::PathBuf, process::ExitCode};

use refql_config::{CONFIG_FILENAME, global_config_path, global_template, local_template};

use crate::cli::{
    args::InitCommand,
    context::CommandContext,
    output::{dim, indent, subheader},
};

/// Writes a starter `.refql.toml` into the working directory, or `~/.refql.toml`.
///
/// Running it from the home directory writes the global file.
pub fn run(ctx: &CommandContext, cmd: &InitCommand) -> ExitCode {
    let Some((path, template)) = target(ctx, cmd.global) else {
        eprintln!("error: could not determine home directory");
        return ExitCode::FAILURE;
    };

    if path.exists() && !cmd.force {
        eprintln!("error: configuration file already exists: {}", path.display());
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    if let Err(e) = fs::write(&path, &template) {
        eprintln!("error: failed to write {}: {e}", path.display());
        return ExitCode::FAILURE;
    }

    println!("Created {}", path.display());
    println!();
    println!("{}", subheader("Contents:"));
    print!("{}", indent(&template, "  "));
    println!();
    println!(
        "{}",
        dim("Every setting starts commented out. Enable what you need, then run `refql check`.")
    );
    ExitCode::SUCCESS
}

/// The file to write and its contents.
fn target(ctx: &CommandContext, global: bool) -> Option<(PathBuf, String)> {
    let global_path = global_config_path();
    let in_home = global_path
        .as_deref()
        .and_then(|p| p.parent())
        .is_some_and(|home| home == ctx.cwd);

    if global || in_home {
        global_path.map(|path| (path, global_template()))
    } else {
        Some((ctx.cwd.join(CONFIG_FILENAME), local_template()))
    }
}
