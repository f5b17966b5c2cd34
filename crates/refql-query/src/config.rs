//! Parser configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Operator applied between clauses that carry no explicit modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Unmodified clauses are optional.
    #[default]
    Or,
    /// Unmodified clauses are required.
    And,
}

/// Granularity that date range bounds are rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateResolution {
    /// `yyyy`
    Year,
    /// `yyyyMM`
    Month,
    /// `yyyyMMdd`
    Day,
    /// `yyyyMMddHH`
    Hour,
    /// `yyyyMMddHHmm`
    Minute,
    /// `yyyyMMddHHmmss`
    Second,
    /// `yyyyMMddHHmmssSSS`
    Millisecond,
}

/// How the search engine should expand multi-term queries.
///
/// Opaque to the parser: it is copied onto every prefix, wildcard, fuzzy, regexp and range node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteMethod {
    /// Constant score over all matching terms.
    #[default]
    ConstantScore,
    /// Expand into a scoring boolean query.
    ScoringBoolean,
    /// Keep only the top N terms by score.
    TopTerms(usize),
}

/// When backreference markers are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceMode {
    /// Markers are parsed as tokens and the referenced query is spliced in as a sub-tree.
    #[default]
    Structural,
    /// Markers are replaced by the referenced text before parsing.
    Textual,
}

/// Immutable settings for a [`QueryParser`](crate::QueryParser).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Field used for terms without an explicit field.
    pub default_field: String,
    /// Occur for clauses without a modifier.
    pub default_operator: Operator,
    /// Allow `*` or `?` as the first character of wildcard and prefix terms.
    pub allow_leading_wildcard: bool,
    /// Honor position gaps left by the analyzer (e.g. removed stop words) in phrases.
    pub enable_position_increments: bool,
    /// Pass range bounds through the analyzer.
    pub analyze_range_terms: bool,
    /// Treat unquoted text that analyzes to several tokens as a phrase.
    pub auto_generate_phrase_queries: bool,
    /// Lowercase prefix, wildcard, fuzzy, regexp and range text.
    pub lowercase_expanded_terms: bool,
    /// Slop used for phrases without an explicit `~N`.
    pub phrase_slop: u32,
    /// Similarity used for `term~` without a number.
    pub fuzzy_min_sim: f32,
    /// Number of leading characters that must match exactly in fuzzy queries.
    pub fuzzy_prefix_length: u32,
    /// Maximum number of clauses in any boolean query.
    pub max_clause_count: usize,
    /// Rewrite method copied to multi-term nodes.
    pub rewrite: RewriteMethod,
    /// Date resolution for fields without their own entry.
    pub date_resolution: Option<DateResolution>,
    /// Per-field date resolution.
    pub field_date_resolution: HashMap<String, DateResolution>,
    /// Maximum nesting of backreference resolution.
    pub max_reference_depth: usize,
    /// How backreference markers are resolved.
    pub reference_mode: ReferenceMode,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_field: String::from("text"),
            default_operator: Operator::Or,
            allow_leading_wildcard: false,
            enable_position_increments: true,
            analyze_range_terms: false,
            auto_generate_phrase_queries: false,
            lowercase_expanded_terms: true,
            phrase_slop: 0,
            fuzzy_min_sim: 2.0,
            fuzzy_prefix_length: 0,
            max_clause_count: 1024,
            rewrite: RewriteMethod::ConstantScore,
            date_resolution: None,
            field_date_resolution: HashMap::new(),
            max_reference_depth: 32,
            reference_mode: ReferenceMode::Structural,
        }
    }
}

impl ParserConfig {
    /// Creates a configuration with the given default field and default settings otherwise.
    pub fn new(default_field: impl Into<String>) -> Self {
        Self {
            default_field: default_field.into(),
            ..Self::default()
        }
    }

    /// Sets the default operator.
    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = operator;
        self
    }

    /// Sets the clause limit.
    pub fn with_max_clause_count(mut self, limit: usize) -> Self {
        self.max_clause_count = limit;
        self
    }

    /// Sets the reference resolution mode.
    pub fn with_reference_mode(mut self, mode: ReferenceMode) -> Self {
        self.reference_mode = mode;
        self
    }

    /// Sets the resolution for one date field.
    pub fn with_date_resolution(
        mut self,
        field: impl Into<String>,
        resolution: DateResolution,
    ) -> Self {
        self.field_date_resolution.insert(field.into(), resolution);
        self
    }

    /// Returns the date resolution that applies to a field, if any.
    pub fn date_resolution_for(&self, field: &str) -> Option<DateResolution> {
        self.field_date_resolution
            .get(field)
            .copied()
            .or(self.date_resolution)
    }
}
