//! Locating `.refql.toml` files.
//!
//! Every ancestor of the working directory may hold one. The file in `$HOME` is the global
//! config and always has the lowest precedence.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".refql.toml";

/// Lists the config files that apply to `cwd`, most specific first.
///
/// A file with `root = true` ends the list: its ancestors and the global file are ignored.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    for dir in cwd.ancestors() {
        let path = dir.join(CONFIG_FILENAME);
        if !path.is_file() {
            continue;
        }
        let root = is_root_config(&path);
        configs.push(path);
        if root {
            return configs;
        }
    }

    if let Some(global) = global_config_path().filter(|p| p.is_file() && !configs.contains(p)) {
        configs.push(global);
    }
    configs
}

/// `~/.refql.toml`, or `None` without a home directory.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Whether `path` is the global config file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}
