//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use refql_analysis::parse_language;

use crate::Config;

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The analysis language is not supported.
    UnknownLanguage {
        /// Configured language name.
        language: String,
    },
    /// Field checking is on but no field is whitelisted.
    EmptyWhitelist,
    /// The default field is not whitelisted.
    DefaultFieldNotWhitelisted {
        /// Canonical default field.
        field: String,
    },
    /// An alias points at a field that is not whitelisted.
    AliasTargetNotWhitelisted {
        /// Alias name.
        alias: String,
        /// Canonical name it maps to.
        target: String,
    },
    /// An alias points at another alias. Aliases resolve in one step.
    AliasChain {
        /// Alias name.
        alias: String,
        /// Target, itself an alias.
        target: String,
    },
    /// A reference depth of zero rejects every `#N` marker.
    ZeroReferenceDepth,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLanguage { language } => {
                write!(f, "unsupported analysis language: {language}")
            }
            Self::EmptyWhitelist => {
                write!(f, "field checking is on but the whitelist is empty")
            }
            Self::DefaultFieldNotWhitelisted { field } => {
                write!(f, "default field '{field}' is not in the whitelist")
            }
            Self::AliasTargetNotWhitelisted { alias, target } => {
                write!(
                    f,
                    "alias '{alias}' maps to '{target}', which is not in the whitelist"
                )
            }
            Self::AliasChain { alias, target } => {
                write!(
                    f,
                    "alias '{alias}' maps to '{target}', which is itself an alias"
                )
            }
            Self::ZeroReferenceDepth => {
                write!(f, "max_reference_depth is 0, so every #N reference fails")
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
///
/// This checks for:
/// - An analysis language without a stemmer
/// - Whitelist problems when field checking is on
/// - Aliases that map to other aliases
/// - A reference depth that rejects every marker
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if parse_language(&config.analysis.language).is_err() {
        warnings.push(ConfigWarning::UnknownLanguage {
            language: config.analysis.language.clone(),
        });
    }

    for (alias, target) in &config.fields.aliases {
        if config.fields.aliases.contains_key(target) {
            warnings.push(ConfigWarning::AliasChain {
                alias: alias.clone(),
                target: target.clone(),
            });
        }
    }

    if config.fields.check {
        warnings.extend(validate_whitelist(config));
    }

    if config.parser.max_reference_depth == 0 {
        warnings.push(ConfigWarning::ZeroReferenceDepth);
    }

    warnings
}

/// Checks the whitelist against the default field and alias targets.
fn validate_whitelist(config: &Config) -> Vec<ConfigWarning> {
    let fields = &config.fields;
    if fields.whitelist.is_empty() {
        return vec![ConfigWarning::EmptyWhitelist];
    }

    let mut warnings = Vec::new();
    let allowed = |field: &str| fields.whitelist.iter().any(|w| w == field);

    let default_field = fields
        .aliases
        .get(&config.parser.default_field)
        .unwrap_or(&config.parser.default_field);
    if !allowed(default_field) {
        warnings.push(ConfigWarning::DefaultFieldNotWhitelisted {
            field: default_field.clone(),
        });
    }

    for (alias, target) in &fields.aliases {
        if !allowed(target) && !fields.aliases.contains_key(target) {
            warnings.push(ConfigWarning::AliasTargetNotWhitelisted {
                alias: alias.clone(),
                target: target.clone(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::FieldSettings;

    fn checked(whitelist: &[&str], aliases: &[(&str, &str)]) -> Config {
        let mut config = Config::default();
        config.fields = FieldSettings {
            check: true,
            whitelist: whitelist.iter().map(|s| (*s).to_string()).collect(),
            aliases: aliases
                .iter()
                .map(|(a, t)| ((*a).to_string(), (*t).to_string()))
                .collect::<BTreeMap<_, _>>(),
        };
        config
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn test_validate_unknown_language() {
        let mut config = Config::default();
        config.analysis.language = "klingon".into();
        assert_eq!(
            config.validate(),
            vec![ConfigWarning::UnknownLanguage {
                language: "klingon".into()
            }]
        );
    }

    #[test]
    fn test_validate_empty_whitelist() {
        let config = checked(&[], &[]);
        assert_eq!(config.validate(), vec![ConfigWarning::EmptyWhitelist]);
    }

    #[test]
    fn test_validate_whitelist_unchecked_is_ignored() {
        let mut config = checked(&["ti"], &[("名称", "xx")]);
        config.fields.check = false;
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_default_field_through_alias() {
        let mut config = checked(&["all"], &[("全部", "all")]);
        config.parser.default_field = "全部".into();
        assert!(config.validate().is_empty());

        config.parser.default_field = "text".into();
        assert_eq!(
            config.validate(),
            vec![ConfigWarning::DefaultFieldNotWhitelisted {
                field: "text".into()
            }]
        );
    }

    #[test]
    fn test_validate_alias_targets() {
        let mut config = checked(&["ti", "text"], &[("名称", "ti"), ("摘要", "ab")]);
        config.parser.default_field = "text".into();
        assert_eq!(
            config.validate(),
            vec![ConfigWarning::AliasTargetNotWhitelisted {
                alias: "摘要".into(),
                target: "ab".into()
            }]
        );
    }

    #[test]
    fn test_validate_alias_chain() {
        let config = checked(&["ti", "text"], &[("a", "b"), ("b", "ti")]);
        assert_eq!(
            config.validate(),
            vec![ConfigWarning::AliasChain {
                alias: "a".into(),
                target: "b".into()
            }]
        );
    }

    #[test]
    fn test_validate_zero_reference_depth() {
        let mut config = Config::default();
        config.parser.max_reference_depth = 0;
        assert_eq!(config.validate(), vec![ConfigWarning::ZeroReferenceDepth]);
    }

    #[test]
    fn test_warning_display() {
        let warning = ConfigWarning::AliasTargetNotWhitelisted {
            alias: "摘要".into(),
            target: "ab".into(),
        };
        assert_eq!(
            warning.to_string(),
            "alias '摘要' maps to 'ab', which is not in the whitelist"
        );
        assert_eq!(
            ConfigWarning::EmptyWhitelist.to_string(),
            "field checking is on but the whitelist is empty"
        );
    }
}
