//! Query tree.
//!
//! The output of a parse: a closed set of node kinds the search engine executes. Every leaf
//! carries exactly one canonical field.

use std::fmt;

use serde::Serialize;

use crate::{
    config::{Operator, RewriteMethod},
    escape::{escape, escape_phrase, escape_term},
};

/// How a clause participates in a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause may match.
    Should,
    /// The clause must not match.
    MustNot,
}

impl Occur {
    /// Prefix used in the query string form.
    fn prefix(self) -> &'static str {
        match self {
            Self::Must => "+",
            Self::Should => "",
            Self::MustNot => "-",
        }
    }
}

/// A clause of a boolean query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    /// Participation of the clause.
    pub occur: Occur,
    /// The clause query.
    pub query: Query,
}

impl Clause {
    /// Creates a clause.
    pub fn new(occur: Occur, query: Query) -> Self {
        Self { occur, query }
    }

    /// Creates a required clause.
    pub fn must(query: Query) -> Self {
        Self::new(Occur::Must, query)
    }

    /// Creates an optional clause.
    pub fn should(query: Query) -> Self {
        Self::new(Occur::Should, query)
    }

    /// Creates a prohibited clause.
    pub fn must_not(query: Query) -> Self {
        Self::new(Occur::MustNot, query)
    }
}

/// A term of a phrase at its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseTerm {
    /// Term text.
    pub text: String,
    /// Position within the phrase, starting at zero.
    pub position: u32,
}

/// Alternatives of a multi-phrase at one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhrasePosition {
    /// Terms that may appear at this position.
    pub terms: Vec<String>,
    /// Position within the phrase, starting at zero.
    pub position: u32,
}

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    /// A single analyzed term.
    Term {
        /// Canonical field.
        field: String,
        /// Term text.
        text: String,
    },
    /// Analyzed term and its synonyms, all at one position. Any of them matches.
    Synonym {
        /// Canonical field.
        field: String,
        /// The analyzed term first, then its alternatives.
        terms: Vec<String>,
    },
    /// Terms at fixed relative positions.
    Phrase {
        /// Canonical field.
        field: String,
        /// Terms with their positions.
        terms: Vec<PhraseTerm>,
        /// Allowed positional slop.
        slop: u32,
    },
    /// A phrase with synonym alternatives at some positions.
    MultiPhrase {
        /// Canonical field.
        field: String,
        /// Alternatives per position.
        positions: Vec<PhrasePosition>,
        /// Allowed positional slop.
        slop: u32,
    },
    /// Boolean combination of clauses.
    Boolean {
        /// Clauses in query order.
        clauses: Vec<Clause>,
        /// Minimum number of optional clauses that must match.
        minimum_should_match: u32,
    },
    /// A pattern with `*` and `?` wildcards. Escapes are kept in the pattern.
    Wildcard {
        /// Canonical field.
        field: String,
        /// Pattern text.
        pattern: String,
        /// Rewrite method.
        rewrite: RewriteMethod,
    },
    /// Terms starting with a prefix.
    Prefix {
        /// Canonical field.
        field: String,
        /// Prefix text, without the trailing `*`.
        prefix: String,
        /// Rewrite method.
        rewrite: RewriteMethod,
    },
    /// Terms within an edit distance.
    Fuzzy {
        /// Canonical field.
        field: String,
        /// Term text.
        text: String,
        /// Maximum edit distance (0 to 2).
        max_edits: u8,
        /// Leading characters that must match exactly.
        prefix_length: u32,
        /// Rewrite method.
        rewrite: RewriteMethod,
    },
    /// Terms matching a regular expression.
    Regexp {
        /// Canonical field.
        field: String,
        /// Pattern between the slashes.
        pattern: String,
        /// Rewrite method.
        rewrite: RewriteMethod,
    },
    /// Terms between two bounds.
    Range {
        /// Canonical field.
        field: String,
        /// Lower bound, `None` when unbounded.
        lower: Option<String>,
        /// Upper bound, `None` when unbounded.
        upper: Option<String>,
        /// Lower bound is inclusive.
        include_lower: bool,
        /// Upper bound is inclusive.
        include_upper: bool,
        /// Rewrite method.
        rewrite: RewriteMethod,
    },
    /// Matches every document.
    MatchAll,
    /// Matches nothing.
    MatchNone,
    /// Multiplies the score of the inner query.
    Boost {
        /// The boosted query.
        query: Box<Self>,
        /// Boost factor.
        factor: f32,
    },
}

impl Query {
    /// Creates a term query.
    pub fn term(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Term {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Creates a boolean query without a minimum-should-match constraint.
    pub fn boolean(clauses: Vec<Clause>) -> Self {
        Self::Boolean {
            clauses,
            minimum_should_match: 0,
        }
    }

    /// Creates a boosted query.
    pub fn boost(query: Self, factor: f32) -> Self {
        Self::Boost {
            query: Box::new(query),
            factor,
        }
    }

    /// Returns the field of a leaf node.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Term { field, .. }
            | Self::Synonym { field, .. }
            | Self::Phrase { field, .. }
            | Self::MultiPhrase { field, .. }
            | Self::Wildcard { field, .. }
            | Self::Prefix { field, .. }
            | Self::Fuzzy { field, .. }
            | Self::Regexp { field, .. }
            | Self::Range { field, .. } => Some(field),
            Self::Boolean { .. } | Self::MatchAll | Self::MatchNone | Self::Boost { .. } => None,
        }
    }

    /// Renders the query in query-language syntax for a parser whose default operator is `OR`.
    ///
    /// Fields equal to `default_field` are omitted, so parsing the output with the same
    /// configuration yields the same tree.
    pub fn to_query_string(&self, default_field: &str) -> String {
        self.to_query_string_with(default_field, Operator::Or)
    }

    /// Renders the query for a parser whose default operator is `operator`.
    ///
    /// Synonym sets and multi-phrase positions are written as their first term, which the
    /// analyzer expands again. Under `AND` a bare clause is required, so a boolean query with
    /// optional clauses joins them with `OR`.
    pub fn to_query_string_with(&self, default_field: &str, operator: Operator) -> String {
        match self {
            Self::Term { field, text } => {
                format!("{}{}", field_prefix(field, default_field), escape_term(text))
            }
            Self::Synonym { field, terms } => format!(
                "{}{}",
                field_prefix(field, default_field),
                terms.first().map(|t| escape_term(t)).unwrap_or_default()
            ),
            Self::Phrase { field, terms, slop } => {
                let words: Vec<String> = terms.iter().map(|t| escape_phrase(&t.text)).collect();
                format!(
                    "{}\"{}\"{}",
                    field_prefix(field, default_field),
                    words.join(" "),
                    slop_suffix(*slop)
                )
            }
            Self::MultiPhrase {
                field,
                positions,
                slop,
            } => {
                let words: Vec<String> = positions
                    .iter()
                    .filter_map(|p| p.terms.first())
                    .map(|t| escape_phrase(t))
                    .collect();
                format!(
                    "{}\"{}\"{}",
                    field_prefix(field, default_field),
                    words.join(" "),
                    slop_suffix(*slop)
                )
            }
            Self::Boolean {
                clauses,
                minimum_should_match,
            } => {
                let parts: Vec<String> = clauses
                    .iter()
                    .map(|clause| {
                        let inner = clause.query.to_query_string_with(default_field, operator);
                        if matches!(clause.query, Self::Boolean { .. }) {
                            format!("{}({inner})", clause.occur.prefix())
                        } else {
                            format!("{}{inner}", clause.occur.prefix())
                        }
                    })
                    .collect();
                let optional = clauses.iter().any(|c| c.occur == Occur::Should);
                let separator = match operator {
                    Operator::And if optional => " OR ",
                    _ => " ",
                };
                if *minimum_should_match > 0 {
                    format!("({})~{minimum_should_match}", parts.join(separator))
                } else {
                    parts.join(separator)
                }
            }
            Self::Wildcard { field, pattern, .. } => {
                format!("{}{pattern}", field_prefix(field, default_field))
            }
            Self::Prefix { field, prefix, .. } => {
                format!("{}{}*", field_prefix(field, default_field), escape(prefix))
            }
            Self::Fuzzy {
                field,
                text,
                max_edits,
                ..
            } => format!(
                "{}{}~{max_edits}",
                field_prefix(field, default_field),
                escape(text)
            ),
            Self::Regexp { field, pattern, .. } => {
                format!("{}/{pattern}/", field_prefix(field, default_field))
            }
            Self::Range {
                field,
                lower,
                upper,
                include_lower,
                include_upper,
                ..
            } => format!(
                "{}{}{} TO {}{}",
                field_prefix(field, default_field),
                if *include_lower { '[' } else { '{' },
                range_bound(lower.as_deref()),
                range_bound(upper.as_deref()),
                if *include_upper { ']' } else { '}' },
            ),
            Self::MatchAll => String::from("*:*"),
            Self::MatchNone => String::new(),
            Self::Boost { query, factor } => format!(
                "({})^{}",
                query.to_query_string_with(default_field, operator),
                format_factor(*factor)
            ),
        }
    }

    /// Formats the query as an indented tree.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize, label: &str) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term { field, text } => writeln!(f, "{prefix}{label}Term({field}:{text:?})"),
            Self::Synonym { field, terms } => {
                writeln!(f, "{prefix}{label}Synonym({field}: {terms:?})")
            }
            Self::Phrase { field, terms, slop } => {
                let words: Vec<String> = terms
                    .iter()
                    .map(|t| format!("{}@{}", t.text, t.position))
                    .collect();
                writeln!(f, "{prefix}{label}Phrase({field}: {words:?}, slop={slop})")
            }
            Self::MultiPhrase {
                field,
                positions,
                slop,
            } => {
                let groups: Vec<String> = positions
                    .iter()
                    .map(|p| format!("{}@{}", p.terms.join("|"), p.position))
                    .collect();
                writeln!(f, "{prefix}{label}MultiPhrase({field}: {groups:?}, slop={slop})")
            }
            Self::Boolean {
                clauses,
                minimum_should_match,
            } => {
                if *minimum_should_match > 0 {
                    writeln!(f, "{prefix}{label}Boolean(min_should_match={minimum_should_match})")?;
                } else {
                    writeln!(f, "{prefix}{label}Boolean")?;
                }
                for clause in clauses {
                    let label = match clause.occur {
                        Occur::Must => "Must ",
                        Occur::Should => "Should ",
                        Occur::MustNot => "MustNot ",
                    };
                    clause.query.fmt_tree(f, indent + 1, label)?;
                }
                Ok(())
            }
            Self::Wildcard { field, pattern, .. } => {
                writeln!(f, "{prefix}{label}Wildcard({field}:{pattern:?})")
            }
            Self::Prefix { field, prefix: p, .. } => {
                writeln!(f, "{prefix}{label}Prefix({field}:{p:?})")
            }
            Self::Fuzzy {
                field,
                text,
                max_edits,
                prefix_length,
                ..
            } => writeln!(
                f,
                "{prefix}{label}Fuzzy({field}:{text:?}, edits={max_edits}, prefix={prefix_length})"
            ),
            Self::Regexp { field, pattern, .. } => {
                writeln!(f, "{prefix}{label}Regexp({field}:/{pattern}/)")
            }
            Self::Range { .. } => writeln!(f, "{prefix}{label}Range({})", self.to_query_string("")),
            Self::MatchAll => writeln!(f, "{prefix}{label}MatchAll"),
            Self::MatchNone => writeln!(f, "{prefix}{label}MatchNone"),
            Self::Boost { query, factor } => {
                writeln!(f, "{prefix}{label}Boost({})", format_factor(*factor))?;
                query.fmt_tree(f, indent + 1, "")
            }
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0, "")
    }
}

/// Returns `field:` unless the field is the default one.
fn field_prefix(field: &str, default_field: &str) -> String {
    if field == default_field {
        String::new()
    } else {
        format!("{}:", escape(field))
    }
}

/// Returns `~N` for a non-zero slop.
fn slop_suffix(slop: u32) -> String {
    if slop == 0 {
        String::new()
    } else {
        format!("~{slop}")
    }
}

/// Renders one range bound, quoting text the range lexer would split or read as `TO`.
fn range_bound(bound: Option<&str>) -> String {
    match bound {
        None => String::from("*"),
        Some("*") => String::from("\\*"),
        Some(text) if needs_quotes(text) => format!("\"{}\"", escape_phrase(text)),
        Some(text) => text.to_string(),
    }
}

/// Returns true if a range bound cannot be written bare.
fn needs_quotes(text: &str) -> bool {
    text == "TO"
        || text.starts_with('"')
        || text.contains(|c: char| c.is_whitespace() || matches!(c, ']' | '}' | '\\'))
}

/// Formats a boost factor, keeping one decimal for whole numbers (`2.0`, `0.5`).
fn format_factor(factor: f32) -> String {
    if factor.fract() == 0.0 && factor.is_finite() {
        format!("{factor:.1}")
    } else {
        format!("{factor}")
    }
}
