//! Configuration system for refql.
//!
//! refql uses TOML configuration files named `.refql.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.refql.toml` files found, then loading `~/.refql.toml` as the global config with lowest
//! precedence.
//!
//! The merged [`Config`] builds everything a [`refql_query::QueryParser`] needs: the
//! [`ParserConfig`], a [`FieldResolver`] and an analyzer.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawAnalysisSettings, RawConfig, RawFieldSettings, RawParserSettings, parse_config_file,
    parse_config_str,
};
use refql_analysis::{AnalyzerOptions, SynonymAnalyzer, TantivyAnalyzer, parse_language};
use refql_query::{FieldResolver, ParserConfig};
use serde::{Deserialize, Serialize};
use toml::Value;
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// The analyzer built from `[analysis]` settings.
pub type ConfiguredAnalyzer = SynonymAnalyzer<TantivyAnalyzer>;

/// Top-level merged configuration for refql.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.refql.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Query parser settings.
    pub parser: ParserConfig,
    /// Text analysis settings.
    pub analysis: AnalysisSettings,
    /// Field aliasing and whitelisting.
    pub fields: FieldSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
    /// Files the configuration was merged from, highest precedence first.
    pub sources: Vec<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.refql.toml` files.
    ///
    /// This is the main entry point for loading configuration. It:
    /// 1. Discovers all `.refql.toml` files from `cwd` up to the filesystem root
    /// 2. Appends `~/.refql.toml` if it exists
    /// 3. Parses each file
    /// 4. Merges them according to precedence rules (closest to `cwd` wins)
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Builds the field resolver described by `[fields]`.
    pub fn field_resolver(&self) -> FieldResolver {
        FieldResolver::new()
            .with_aliases(self.fields.aliases.clone())
            .with_whitelist(self.fields.whitelist.clone())
            .enforce(self.fields.check)
    }

    /// Converts `[analysis]` into analyzer options.
    pub fn analyzer_options(&self) -> Result<AnalyzerOptions, ConfigError> {
        Ok(AnalyzerOptions {
            language: parse_language(&self.analysis.language)?,
            stemming: self.analysis.stemming,
            builtin_stop_words: self.analysis.builtin_stop_words,
            stop_words: self.analysis.stop_words.clone(),
        })
    }

    /// Builds the analyzer described by `[analysis]`.
    ///
    /// Keyword fields are named by their canonical field name.
    pub fn analyzer(&self) -> Result<ConfiguredAnalyzer, ConfigError> {
        let base = TantivyAnalyzer::from_options(&self.analyzer_options()?)
            .with_keyword_fields(self.analysis.keyword_fields.iter().cloned());
        Ok(SynonymAnalyzer::new(base).with_synonyms(&self.analysis.synonyms))
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output uses the same layout as a `.refql.toml` file, with keys in sorted order.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            parser: Value::try_from(&self.parser)?,
            analysis: &self.analysis,
            fields: &self.fields,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Text analysis settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Language for stemming and built-in stop words.
    pub language: String,
    /// Apply the stemmer.
    pub stemming: bool,
    /// Remove the language's built-in stop words.
    pub builtin_stop_words: bool,
    /// Additional stop words.
    pub stop_words: Vec<String>,
    /// Fields analyzed as one lowercased keyword token.
    pub keyword_fields: Vec<String>,
    /// Word to synonyms.
    pub synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            language: String::from("english"),
            stemming: true,
            builtin_stop_words: false,
            stop_words: Vec::new(),
            keyword_fields: Vec::new(),
            synonyms: BTreeMap::new(),
        }
    }
}

/// Field aliasing and whitelisting settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Reject explicit fields missing from the whitelist.
    pub check: bool,
    /// Canonical field names allowed in queries.
    pub whitelist: Vec<String>,
    /// Alias to canonical field name.
    pub aliases: BTreeMap<String, String>,
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Parser settings as a sorted table.
    parser: Value,
    /// Analysis settings.
    analysis: &'a AnalysisSettings,
    /// Field settings.
    fields: &'a FieldSettings,
}

#[cfg(test)]
mod tests {
    use refql_query::{Analyzer, QueryErrorKind, QueryParser};

    use super::*;

    #[test]
    fn test_analysis_settings_defaults() {
        let analysis = AnalysisSettings::default();
        assert_eq!(analysis.language, "english");
        assert!(analysis.stemming);
        assert!(!analysis.builtin_stop_words);
        assert!(analysis.synonyms.is_empty());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.parser.default_field, "text");
        assert!(!config.fields.check);
        assert!(config.config_root.is_none());
    }

    #[test]
    fn test_field_resolver_honors_check() {
        let mut config = Config::default();
        config.fields.whitelist = vec!["ti".into()];
        config.fields.aliases.insert("名称".into(), "ti".into());

        let resolver = config.field_resolver();
        assert_eq!(resolver.resolve("名称", None).unwrap(), "ti");
        assert_eq!(resolver.resolve("other", None).unwrap(), "other");

        config.fields.check = true;
        let err = config.field_resolver().resolve("other", None).unwrap_err();
        assert!(matches!(err.kind, QueryErrorKind::FieldValidation { .. }));
    }

    #[test]
    fn test_analyzer_from_settings() {
        let mut config = Config::default();
        config.analysis.stemming = false;
        config.analysis.stop_words = vec!["the".into()];
        config.analysis.keyword_fields = vec!["country".into()];
        config
            .analysis
            .synonyms
            .insert("tv".into(), vec!["television".into()]);

        let analyzer = config.analyzer().unwrap();
        let texts: Vec<String> = analyzer
            .analyze("body", "The TV")
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["tv", "television"]);
        assert_eq!(analyzer.analyze("country", "New Zealand").len(), 1);
    }

    #[test]
    fn test_analyzer_rejects_unknown_language() {
        let mut config = Config::default();
        config.analysis.language = "klingon".into();
        assert!(matches!(
            config.analyzer(),
            Err(ConfigError::Analysis(_))
        ));
    }

    #[test]
    fn test_parser_from_config() {
        let mut config = Config::default();
        config.parser.default_field = "全部".into();
        config.fields.aliases.insert("全部".into(), "all".into());
        config.fields.aliases.insert("名称".into(), "ti".into());

        let analyzer = config.analyzer().unwrap();
        let fields = config.field_resolver();
        let parser = QueryParser::new(&config.parser, &analyzer).with_fields(&fields);
        let query = parser.parse("名称=Rust guides").unwrap().query;
        assert_eq!(query.to_query_string("all"), "ti:rust guid");
    }

    #[test]
    fn test_settings_to_toml() {
        let config = Config::default();
        let toml = config.settings_to_toml().unwrap();

        assert!(toml.contains("[parser]"));
        assert!(toml.contains("[analysis]"));
        assert!(toml.contains("[fields]"));
        assert!(toml.contains("default_field = \"text\""));
        assert!(toml.contains("language = \"english\""));

        // The output is itself a valid config file
        let parsed = parse_config_str(&toml, Path::new("effective.toml")).unwrap();
        let merged = merge_configs(&[ParsedConfig {
            path: PathBuf::from("/effective.toml"),
            config: parsed,
        }]);
        assert_eq!(merged.parser, config.parser);
        assert_eq!(merged.analysis, config.analysis);
    }
}
