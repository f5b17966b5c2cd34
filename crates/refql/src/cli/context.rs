//! What every command starts from: the working directory and the merged configuration.

use std::{env, path::PathBuf, process::ExitCode};

use refql_config::{Config, ConfiguredAnalyzer};
use refql_query::{FieldResolver, ParserConfig, ReferenceMode};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Merged configuration, or the defaults when no file applies.
    pub config: Config,
}

impl CommandContext {
    /// Reads the working directory and loads the configuration that applies to it.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = working_dir()?;
        let config = Config::load(&cwd)
            .map_err(|e| fail(&format!("failed to load configuration: {e}")))?;
        Ok(Self { cwd, config })
    }

    /// Like [`Self::load`] but with default settings, for `init` to run over a broken file.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        Ok(Self {
            cwd: working_dir()?,
            config: Config::default(),
        })
    }

    /// `[parser]` settings with command-line overrides applied.
    pub fn parser_config(
        &self,
        default_field: Option<&str>,
        mode: Option<ReferenceMode>,
    ) -> ParserConfig {
        let mut config = self.config.parser.clone();
        if let Some(field) = default_field {
            field.clone_into(&mut config.default_field);
        }
        if let Some(mode) = mode {
            config.reference_mode = mode;
        }
        config
    }

    /// The `[analysis]` analyzer. Invalid settings are reported here.
    pub fn analyzer(&self) -> Result<ConfiguredAnalyzer, ExitCode> {
        self.config.analyzer().map_err(|e| fail(&e.to_string()))
    }

    /// Aliases and whitelist from `[fields]`.
    pub fn field_resolver(&self) -> FieldResolver {
        self.config.field_resolver()
    }
}

/// The process working directory.
fn working_dir() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| fail(&format!("could not determine current directory: {e}")))
}

/// Prints `error: {message}` and returns the failure exit code.
fn fail(message: &str) -> ExitCode {
    eprintln!("error: {message}");
    ExitCode::FAILURE
}
