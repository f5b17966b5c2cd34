//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying precedence
//! rules.

use std::path::{Path, PathBuf};

use refql_query::ParserConfig;

use crate::{
    AnalysisSettings, Config, FieldSettings,
    parse::{RawAnalysisSettings, RawConfig, RawFieldSettings, RawParserSettings},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins (highest precedence)
/// - Lists (stop words, keyword fields, whitelist): first definition wins completely
/// - Tables (synonyms, aliases, per-field date resolution): merged, first definition for each
///   key wins
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    let mut result = Config::default();

    // Lowest precedence first so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref parser) = parsed.config.parser {
            apply_raw_parser(&mut result.parser, parser);
        }
        if let Some(ref analysis) = parsed.config.analysis {
            apply_raw_analysis(&mut result.analysis, analysis);
        }
        if let Some(ref fields) = parsed.config.fields {
            apply_raw_fields(&mut result.fields, fields);
        }
    }

    result.config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);
    result.sources = configs.iter().map(|c| c.path.clone()).collect();
    result
}

/// Applies raw parser settings, overwriting any present values.
fn apply_raw_parser(result: &mut ParserConfig, raw: &RawParserSettings) {
    if let Some(ref v) = raw.default_field {
        result.default_field = v.clone();
    }
    if let Some(v) = raw.default_operator {
        result.default_operator = v;
    }
    if let Some(v) = raw.allow_leading_wildcard {
        result.allow_leading_wildcard = v;
    }
    if let Some(v) = raw.enable_position_increments {
        result.enable_position_increments = v;
    }
    if let Some(v) = raw.analyze_range_terms {
        result.analyze_range_terms = v;
    }
    if let Some(v) = raw.auto_generate_phrase_queries {
        result.auto_generate_phrase_queries = v;
    }
    if let Some(v) = raw.lowercase_expanded_terms {
        result.lowercase_expanded_terms = v;
    }
    if let Some(v) = raw.phrase_slop {
        result.phrase_slop = v;
    }
    if let Some(v) = raw.fuzzy_min_sim {
        result.fuzzy_min_sim = v;
    }
    if let Some(v) = raw.fuzzy_prefix_length {
        result.fuzzy_prefix_length = v;
    }
    if let Some(v) = raw.max_clause_count {
        result.max_clause_count = v;
    }
    if let Some(v) = raw.rewrite {
        result.rewrite = v;
    }
    if let Some(v) = raw.date_resolution {
        result.date_resolution = Some(v);
    }
    if let Some(ref v) = raw.field_date_resolution {
        result
            .field_date_resolution
            .extend(v.iter().map(|(field, res)| (field.clone(), *res)));
    }
    if let Some(v) = raw.max_reference_depth {
        result.max_reference_depth = v;
    }
    if let Some(v) = raw.reference_mode {
        result.reference_mode = v;
    }
}

/// Applies raw analysis settings.
fn apply_raw_analysis(result: &mut AnalysisSettings, raw: &RawAnalysisSettings) {
    if let Some(ref v) = raw.language {
        result.language = v.clone();
    }
    if let Some(v) = raw.stemming {
        result.stemming = v;
    }
    if let Some(v) = raw.builtin_stop_words {
        result.builtin_stop_words = v;
    }
    if let Some(ref v) = raw.stop_words {
        result.stop_words = v.clone();
    }
    if let Some(ref v) = raw.keyword_fields {
        result.keyword_fields = v.clone();
    }
    if let Some(ref v) = raw.synonyms {
        result.synonyms.extend(v.clone());
    }
}

/// Applies raw field settings.
fn apply_raw_fields(result: &mut FieldSettings, raw: &RawFieldSettings) {
    if let Some(v) = raw.check {
        result.check = v;
    }
    if let Some(ref v) = raw.whitelist {
        result.whitelist = v.clone();
    }
    if let Some(ref v) = raw.aliases {
        result.aliases.extend(v.clone());
    }
}

#[cfg(test)]
mod tests {
    use refql_query::{DateResolution, Operator};

    use super::*;
    use crate::parse::parse_config_str;

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config_str(toml, Path::new(path)).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty_configs() {
        let result = merge_configs(&[]);
        assert_eq!(result.parser, ParserConfig::default());
        assert!(result.config_root.is_none());
        assert!(result.sources.is_empty());
    }

    #[test]
    fn test_merge_single_config() {
        let result = merge_configs(&[parsed(
            "/project/.refql.toml",
            r#"
[parser]
default_field = "all"
max_clause_count = 10
"#,
        )]);
        assert_eq!(result.parser.default_field, "all");
        assert_eq!(result.parser.max_clause_count, 10);
        assert_eq!(result.parser.phrase_slop, 0);
        assert_eq!(result.config_root, Some(PathBuf::from("/project")));
    }

    #[test]
    fn test_merge_scalar_override() {
        let high = parsed(
            "/home/user/project/.refql.toml",
            r#"
[parser]
default_operator = "and"

[analysis]
stemming = false
"#,
        );
        let low = parsed(
            "/home/user/.refql.toml",
            r#"
[parser]
default_operator = "or"
phrase_slop = 3

[analysis]
language = "french"
"#,
        );

        let result = merge_configs(&[high, low]);
        assert_eq!(result.parser.default_operator, Operator::And);
        assert_eq!(result.parser.phrase_slop, 3);
        assert_eq!(result.analysis.language, "french");
        assert!(!result.analysis.stemming);
        assert_eq!(
            result.config_root,
            Some(PathBuf::from("/home/user/project"))
        );
        assert_eq!(result.sources.len(), 2);
    }

    #[test]
    fn test_merge_lists_replace() {
        let high = parsed("/a/b/.refql.toml", "[fields]\nwhitelist = [\"ti\"]\n");
        let low = parsed(
            "/a/.refql.toml",
            "[fields]\ncheck = true\nwhitelist = [\"ti\", \"ab\"]\n",
        );

        let result = merge_configs(&[high, low]);
        assert!(result.fields.check);
        assert_eq!(result.fields.whitelist, vec!["ti"]);
    }

    #[test]
    fn test_merge_tables_by_key() {
        let high = parsed(
            "/a/b/.refql.toml",
            r#"
[fields.aliases]
"名称" = "title"

[analysis.synonyms]
tv = "telly"

[parser.field_date_resolution]
published = "year"
"#,
        );
        let low = parsed(
            "/a/.refql.toml",
            r#"
[fields.aliases]
"名称" = "ti"
"摘要" = "ab"

[analysis.synonyms]
tv = "television"
car = ["auto"]

[parser.field_date_resolution]
published = "day"
modified = "second"
"#,
        );

        let result = merge_configs(&[high, low]);
        assert_eq!(result.fields.aliases["名称"], "title");
        assert_eq!(result.fields.aliases["摘要"], "ab");
        assert_eq!(result.analysis.synonyms["tv"], vec!["telly"]);
        assert_eq!(result.analysis.synonyms["car"], vec!["auto"]);
        assert_eq!(
            result.parser.field_date_resolution["published"],
            DateResolution::Year
        );
        assert_eq!(
            result.parser.field_date_resolution["modified"],
            DateResolution::Second
        );
    }
}
