//! Starter files written by `refql init`.
//!
//! The sources under `templates/` are live TOML, checked by the tests below. `init` writes them
//! with every setting disabled, so a fresh file changes nothing until a line is uncommented.

/// A starter configuration file.
#[derive(Debug, Clone, Copy)]
enum Template {
    /// Project file: documents every setting.
    Local,
    /// `~/.refql.toml`: the settings worth sharing across projects.
    Global,
}

impl Template {
    /// The live TOML source.
    const fn source(self) -> &'static str {
        match self {
            Self::Local => include_str!("../templates/config.toml"),
            Self::Global => include_str!("../templates/config-global.toml"),
        }
    }

    /// The source with its settings commented out.
    fn render(self) -> String {
        disable_settings(self.source())
    }
}

/// Returns the project configuration file written by `refql init`.
pub fn local_template() -> String {
    Template::Local.render()
}

/// Returns the global configuration file written by `refql init --global`.
pub fn global_template() -> String {
    Template::Global.render()
}

/// Prefixes every `key = value` line with `# `.
///
/// Comments, blank lines and `[section]` headers are kept as they are, so enabling a setting
/// only takes removing its `# `.
fn disable_settings(source: &str) -> String {
    source
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
                format!("{line}\n")
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Config, ParsedConfig, merge::merge_configs, parse::parse_config, validate::validate_config,
    };

    /// Merges one file's contents as if it were the only config found.
    fn load(contents: &str) -> Config {
        let parsed = ParsedConfig {
            path: "/project/.refql.toml".into(),
            config: parse_config(contents).unwrap(),
        };
        merge_configs(&[parsed])
    }

    #[test]
    fn sources_are_valid_config() {
        for template in [Template::Local, Template::Global] {
            let result = parse_config(template.source());
            assert!(result.is_ok(), "{template:?} failed to parse: {result:?}");
        }
    }

    #[test]
    fn local_source_has_no_warnings() {
        let config = load(Template::Local.source());
        assert!(validate_config(&config).is_empty());
        assert_eq!(config.fields.aliases["ti"], "title");
    }

    #[test]
    fn rendered_templates_keep_defaults() {
        let defaults = Config::default();
        for rendered in [local_template(), global_template()] {
            let config = load(&rendered);
            assert_eq!(config.parser, defaults.parser);
            assert_eq!(config.analysis, defaults.analysis);
            assert_eq!(config.fields, defaults.fields);
        }
    }

    #[test]
    fn rendered_local_template_keeps_sections() {
        let rendered = local_template();
        assert!(rendered.contains("\n[parser]\n"));
        assert!(rendered.contains("\n[fields.aliases]\n"));
        assert!(rendered.contains("\n# root = true\n"));
        assert!(rendered.contains("\n# ti = \"title\"\n"));
    }

    #[test]
    fn disable_settings_only_touches_settings() {
        let input = "# note\nkey = \"value\"\n\n[section]\n  nested = 1\n";
        assert_eq!(
            disable_settings(input),
            "# note\n# key = \"value\"\n\n[section]\n#   nested = 1\n"
        );
    }
}
