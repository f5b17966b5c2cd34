//! Turning analyzer output into query nodes.
//!
//! The analyzer decides the shape of a leaf: one token is a term, several tokens at one position
//! are a synonym set, several positions are either a boolean query or, when quoted, a phrase.

use crate::{
    analysis::{AnalyzedToken, Analyzer},
    ast::{Clause, Occur, PhrasePosition, PhraseTerm, Query},
    error::QueryError,
};

/// Builds term, boolean, phrase and multi-phrase queries from analyzed text.
#[derive(Clone, Copy)]
pub struct QueryBuilder<'a> {
    /// Analyzer applied to every text.
    analyzer: &'a dyn Analyzer,
    /// Honor position gaps in phrases.
    enable_position_increments: bool,
    /// Maximum number of clauses in a boolean query.
    max_clause_count: usize,
}

/// Tokens grouped by position.
struct Analysis {
    /// Token groups; every group after the first starts with a non-zero increment.
    groups: Vec<PositionGroup>,
    /// Total number of tokens.
    token_count: usize,
    /// Sum of the non-zero increments.
    position_count: u32,
    /// At least one token shares a position with the previous one.
    has_synonyms: bool,
}

/// Terms sharing one position.
struct PositionGroup {
    /// Terms at this position.
    terms: Vec<String>,
    /// Distance from the previous position.
    increment: u32,
}

impl Analysis {
    /// Groups analyzer output by position.
    fn new(tokens: Vec<AnalyzedToken>) -> Self {
        let token_count = tokens.len();
        let mut groups: Vec<PositionGroup> = Vec::new();
        let mut has_synonyms = false;
        for token in tokens {
            match groups.last_mut() {
                Some(group) if token.position_increment == 0 => {
                    has_synonyms = true;
                    group.terms.push(token.text);
                }
                _ => groups.push(PositionGroup {
                    terms: vec![token.text],
                    increment: token.position_increment.max(1),
                }),
            }
        }
        let position_count = groups.iter().map(|g| g.increment).sum();
        Self {
            groups,
            token_count,
            position_count,
            has_synonyms,
        }
    }

    /// Returns the position of every group, starting at zero.
    fn positions(&self, enable_increments: bool) -> Vec<u32> {
        let mut next = 0;
        self.groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                if enable_increments {
                    next += group.increment;
                    next - 1
                } else {
                    index as u32
                }
            })
            .collect()
    }
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder with position increments enabled and a limit of 1024 clauses.
    pub fn new(analyzer: &'a dyn Analyzer) -> Self {
        Self {
            analyzer,
            enable_position_increments: true,
            max_clause_count: 1024,
        }
    }

    /// Sets whether phrase positions honor analyzer gaps.
    pub fn with_position_increments(mut self, enable: bool) -> Self {
        self.enable_position_increments = enable;
        self
    }

    /// Sets the maximum number of clauses in a boolean query.
    pub fn with_max_clause_count(mut self, limit: usize) -> Self {
        self.max_clause_count = limit;
        self
    }

    /// Builds a boolean query of the analyzed terms, each with the given occur.
    ///
    /// Only `Should` and `Must` are accepted. Returns `None` when the text analyzes to nothing.
    pub fn create_boolean_query(
        &self,
        field: &str,
        text: &str,
        occur: Occur,
    ) -> Result<Option<Query>, QueryError> {
        if occur == Occur::MustNot {
            return Err(QueryError::invalid_argument(
                "invalid operator: only Should or Must are allowed",
            ));
        }
        self.create_field_query(field, text, occur, false, 0)
    }

    /// Builds a phrase query of the analyzed terms.
    pub fn create_phrase_query(
        &self,
        field: &str,
        text: &str,
        slop: u32,
    ) -> Result<Option<Query>, QueryError> {
        self.create_field_query(field, text, Occur::Must, true, slop)
    }

    /// Builds an optional boolean query where at least `fraction` of the positions must match.
    ///
    /// `fraction` must lie in `[0, 1]`; `1` is the same as requiring every term.
    pub fn create_min_should_match_query(
        &self,
        field: &str,
        text: &str,
        fraction: f32,
    ) -> Result<Option<Query>, QueryError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(QueryError::invalid_argument(format!(
                "fraction should be between 0 and 1 but was {fraction}"
            )));
        }
        if fraction == 1.0 {
            return self.create_boolean_query(field, text, Occur::Must);
        }

        let analysis = Analysis::new(self.analyzer.analyze(field, text));
        let multi_position = analysis.position_count > 1;
        let query = self.shape(field, analysis, Occur::Should, false, 0)?;
        Ok(query.map(|query| match query {
            Query::Boolean { clauses, .. } if multi_position => Query::Boolean {
                minimum_should_match: (fraction * clauses.len() as f32) as u32,
                clauses,
            },
            other => other,
        }))
    }

    /// Analyzes `text` and builds the matching query shape.
    ///
    /// `occur` applies to the clauses of a multi-position boolean query. Quoted text with more
    /// than one position becomes a phrase with the given slop.
    pub fn create_field_query(
        &self,
        field: &str,
        text: &str,
        occur: Occur,
        quoted: bool,
        slop: u32,
    ) -> Result<Option<Query>, QueryError> {
        let analysis = Analysis::new(self.analyzer.analyze(field, text));
        self.shape(field, analysis, occur, quoted, slop)
    }

    /// Picks the query shape for analyzed text.
    fn shape(
        &self,
        field: &str,
        mut analysis: Analysis,
        occur: Occur,
        quoted: bool,
        slop: u32,
    ) -> Result<Option<Query>, QueryError> {
        if analysis.token_count == 0 {
            return Ok(None);
        }
        if analysis.token_count == 1 {
            let text = analysis.groups.swap_remove(0).terms.swap_remove(0);
            return Ok(Some(Query::term(field, text)));
        }
        if quoted && analysis.position_count > 1 {
            return Ok(Some(if analysis.has_synonyms {
                self.multi_phrase(field, &analysis, slop)
            } else {
                self.phrase(field, &analysis, slop)
            }));
        }
        if analysis.position_count == 1 {
            let terms = analysis.groups.swap_remove(0).terms;
            return self.synonyms(field, terms).map(Some);
        }

        let clauses = analysis
            .groups
            .into_iter()
            .map(|group| -> Result<Clause, QueryError> {
                let query = match <[String; 1]>::try_from(group.terms) {
                    Ok([text]) => Query::term(field, text),
                    Err(terms) => self.synonyms(field, terms)?,
                };
                Ok(Clause::new(occur, query))
            })
            .collect::<Result<Vec<_>, QueryError>>()?;
        self.check_clause_count(clauses.len())?;
        Ok(Some(Query::boolean(clauses)))
    }

    /// Builds a synonym set from the terms at one position.
    fn synonyms(&self, field: &str, terms: Vec<String>) -> Result<Query, QueryError> {
        self.check_clause_count(terms.len())?;
        Ok(Query::Synonym {
            field: field.to_string(),
            terms,
        })
    }

    /// Builds a phrase with one term per position.
    fn phrase(&self, field: &str, analysis: &Analysis, slop: u32) -> Query {
        let positions = analysis.positions(self.enable_position_increments);
        let terms = analysis
            .groups
            .iter()
            .zip(positions)
            .flat_map(|(group, position)| {
                group.terms.iter().map(move |text| PhraseTerm {
                    text: text.clone(),
                    position,
                })
            })
            .collect();
        Query::Phrase {
            field: field.to_string(),
            terms,
            slop,
        }
    }

    /// Builds a phrase with synonym alternatives.
    fn multi_phrase(&self, field: &str, analysis: &Analysis, slop: u32) -> Query {
        let positions = analysis
            .groups
            .iter()
            .zip(analysis.positions(self.enable_position_increments))
            .map(|(group, position)| PhrasePosition {
                terms: group.terms.clone(),
                position,
            })
            .collect();
        Query::MultiPhrase {
            field: field.to_string(),
            positions,
            slop,
        }
    }

    /// Fails when a boolean query would exceed the clause limit.
    fn check_clause_count(&self, count: usize) -> Result<(), QueryError> {
        if count > self.max_clause_count {
            return Err(QueryError::too_many_clauses(self.max_clause_count, count));
        }
        Ok(())
    }
}
