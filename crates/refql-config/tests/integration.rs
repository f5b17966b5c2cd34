//! Integration tests for refql-config.
//!
//! Tests the full configuration loading pipeline: discovery -> parse -> merge -> build parser.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use refql_config::{CONFIG_FILENAME, Config, ConfigError, ConfigWarning, local_template};
use refql_query::{Operator, QueryErrorKind, QueryParser, ReferenceProvider};

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory and returns its path.
    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_load_empty_root_config_returns_defaults() {
    let env = TestEnv::new();
    env.create_file(CONFIG_FILENAME, "root = true\n");
    let config = Config::load(env.path()).unwrap();

    assert_eq!(config.sources, vec![env.path().join(CONFIG_FILENAME)]);
    assert_eq!(config.parser.default_field, "text");
    assert_eq!(config.analysis.language, "english");
}

#[test]
fn test_load_nested_configs_merging() {
    let env = TestEnv::new();
    let subdir = env.create_dir("project/subdir");

    env.create_file(
        CONFIG_FILENAME,
        r#"
root = true

[parser]
default_field = "all"
default_operator = "and"

[fields.aliases]
"全部" = "all"
"名称" = "ti"
"#,
    );
    env.create_file(
        "project/.refql.toml",
        r#"
[parser]
default_operator = "or"

[fields]
check = true
whitelist = ["all", "ti", "co"]

[fields.aliases]
"国家" = "co"
"#,
    );

    let config = Config::load(&subdir).unwrap();

    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.parser.default_field, "all");
    assert_eq!(config.parser.default_operator, Operator::Or);
    assert_eq!(config.fields.aliases.len(), 3);
    assert!(config.fields.check);
    assert_eq!(config.config_root, Some(env.path().join("project")));
    assert!(config.validate().is_empty());
}

#[test]
fn test_loaded_config_drives_parser() {
    let env = TestEnv::new();
    env.create_file(
        CONFIG_FILENAME,
        r#"
root = true

[parser]
default_field = "全部"

[analysis.synonyms]
car = "auto"

[fields]
check = true
whitelist = ["all", "ti"]

[fields.aliases]
"全部" = "all"
"名称" = "ti"
"#,
    );

    let config = Config::load(env.path()).unwrap();
    let analyzer = config.analyzer().unwrap();
    let fields = config.field_resolver();
    let references = ReferenceProvider::new(["名称=cars"]);
    let parser = QueryParser::new(&config.parser, &analyzer)
        .with_fields(&fields)
        .with_references(&references);

    let parsed = parser.parse("#1 AND racing").unwrap();
    assert_eq!(parsed.query.to_query_string("all"), "+ti:car +race");
    assert!(parsed.query.to_string().contains("Synonym(ti: [\"car\", \"auto\"])"));

    let err = parser.parse("co:nz").unwrap_err();
    assert!(matches!(err.kind, QueryErrorKind::FieldValidation { .. }));
}

#[test]
fn test_invalid_toml_reports_path() {
    let env = TestEnv::new();
    let path = env.create_file(CONFIG_FILENAME, "root = true\n[parser\n");

    let err = Config::load(env.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn test_unknown_language_warns_and_fails_analyzer() {
    let env = TestEnv::new();
    env.create_file(
        CONFIG_FILENAME,
        "root = true\n[analysis]\nlanguage = \"klingon\"\n",
    );

    let config = Config::load(env.path()).unwrap();
    assert_eq!(
        config.validate(),
        vec![ConfigWarning::UnknownLanguage {
            language: "klingon".into()
        }]
    );
    assert!(config.analyzer().is_err());
}

#[test]
fn test_written_template_loads_as_defaults() {
    let env = TestEnv::new();
    env.create_file(CONFIG_FILENAME, &local_template());

    let config = Config::load_from_files(&[env.path().join(CONFIG_FILENAME)]).unwrap();
    assert_eq!(config.parser, Config::default().parser);
}

#[test]
fn test_effective_settings_reload() {
    let env = TestEnv::new();
    let path = env.create_file(
        CONFIG_FILENAME,
        r#"
[parser]
phrase_slop = 2
rewrite = { top_terms = 20 }

[parser.field_date_resolution]
published = "day"
"#,
    );

    let config = Config::load_from_files(&[path]).unwrap();
    let effective = env.create_file("effective/.refql.toml", &config.settings_to_toml().unwrap());
    let reloaded = Config::load_from_files(&[effective]).unwrap();
    assert_eq!(reloaded.parser, config.parser);
    assert_eq!(reloaded.fields, config.fields);
}
