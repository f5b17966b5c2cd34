//! Configuration file parsing.
//!
//! Parses individual `.refql.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{collections::HashMap, fs, path::Path};

use refql_query::{DateResolution, Operator, ReferenceMode, RewriteMethod};
use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Parser settings section.
    pub parser: Option<RawParserSettings>,
    /// Analysis settings section.
    pub analysis: Option<RawAnalysisSettings>,
    /// Field aliasing and whitelisting section.
    pub fields: Option<RawFieldSettings>,
}

/// Raw parser settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawParserSettings {
    /// Field used for terms without an explicit field.
    pub default_field: Option<String>,
    /// Occur for clauses without a modifier.
    pub default_operator: Option<Operator>,
    /// Allow leading `*` or `?` in wildcard terms.
    pub allow_leading_wildcard: Option<bool>,
    /// Honor analyzer position gaps in phrases.
    pub enable_position_increments: Option<bool>,
    /// Pass range bounds through the analyzer.
    pub analyze_range_terms: Option<bool>,
    /// Treat multi-token unquoted text as a phrase.
    pub auto_generate_phrase_queries: Option<bool>,
    /// Lowercase multi-term query text.
    pub lowercase_expanded_terms: Option<bool>,
    /// Default phrase slop.
    pub phrase_slop: Option<u32>,
    /// Similarity for `term~` without a number.
    pub fuzzy_min_sim: Option<f32>,
    /// Exact-match prefix length for fuzzy queries.
    pub fuzzy_prefix_length: Option<u32>,
    /// Maximum number of clauses in a boolean query.
    pub max_clause_count: Option<usize>,
    /// Rewrite method for multi-term queries.
    pub rewrite: Option<RewriteMethod>,
    /// Date resolution for fields without their own entry.
    pub date_resolution: Option<DateResolution>,
    /// Per-field date resolution.
    pub field_date_resolution: Option<HashMap<String, DateResolution>>,
    /// Maximum nesting of backreference resolution.
    pub max_reference_depth: Option<usize>,
    /// How backreference markers are resolved.
    pub reference_mode: Option<ReferenceMode>,
}

/// Raw analysis settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawAnalysisSettings {
    /// Language for stemming and built-in stop words.
    pub language: Option<String>,
    /// Apply the stemmer.
    pub stemming: Option<bool>,
    /// Remove the language's built-in stop words.
    pub builtin_stop_words: Option<bool>,
    /// Additional stop words.
    pub stop_words: Option<Vec<String>>,
    /// Fields analyzed as a single keyword token.
    pub keyword_fields: Option<Vec<String>>,
    /// Word to synonyms. Each value is a single string or an array of strings.
    #[serde_as(as = "Option<HashMap<_, OneOrMany<_>>>")]
    pub synonyms: Option<HashMap<String, Vec<String>>>,
}

/// Raw field settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawFieldSettings {
    /// Reject explicit fields missing from the whitelist.
    pub check: Option<bool>,
    /// Canonical field names allowed in queries.
    pub whitelist: Option<Vec<String>>,
    /// Alias to canonical field name.
    pub aliases: Option<HashMap<String, String>>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
///
/// Useful for validating template content (tests only).
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
