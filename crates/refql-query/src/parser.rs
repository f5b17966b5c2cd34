//! Query parser.
//!
//! Parses a query string into a [`Query`] tree using recursive descent over a one-token
//! lookahead stream. Leaf text goes through the [`QueryBuilder`], explicit fields through the
//! [`FieldResolver`], and `#N` markers through the [`ReferenceProvider`].
//!
//! # Grammar
//!
//! ```text
//! query      → clause (conj? clause)*
//! conj       → "AND" | "OR"
//! clause     → modifier? (field_expr | group)
//! modifier   → "+" | "-" | "!" | "NOT"
//! field_expr → (FIELD (":" | "="))? (value | group)
//! value      → (TERM | QUOTED | PREFIX | WILD | REGEXP | REF | range) suffix* | "*"
//! suffix     → "~" NUMBER? | "^" NUMBER
//! range      → ("[" | "{") bound "TO" bound ("]" | "}")
//! group      → "(" query ")" ("^" NUMBER)?
//! ```
//!
//! # Precedence
//!
//! Adjacent clauses and clauses joined by `AND` form a run; `OR` closes the current run. So
//! `a AND b OR c AND d` reads as `(a AND b) OR (c AND d)`. Parentheses override grouping.

use std::mem;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    analysis::Analyzer,
    ast::{Clause, Occur, Query},
    builder::QueryBuilder,
    config::{Operator, ParserConfig, ReferenceMode},
    date,
    error::{QueryError, QueryErrorKind},
    escape::{unescape, unquote},
    fields::FieldResolver,
    lexer::{Token, TokenKind},
    provenance::Provenance,
    reference::{ReferenceProvider, ResolutionChain},
    stream::TokenStream,
};

/// Deepest allowed nesting of parenthesized groups, counted across referenced queries.
const MAX_GROUP_DEPTH: usize = 100;

/// Parses query strings into query trees.
///
/// Holds only shared, immutable state; every call to [`Self::parse`] gets fresh provenance
/// stores and a fresh reference chain.
#[derive(Clone, Copy)]
pub struct QueryParser<'a> {
    /// Parser settings.
    config: &'a ParserConfig,
    /// Analyzer for leaf text.
    analyzer: &'a dyn Analyzer,
    /// Alias and whitelist table for explicit fields.
    fields: Option<&'a FieldResolver>,
    /// Earlier queries that `#N` markers refer to.
    references: Option<&'a ReferenceProvider>,
}

/// A parsed query together with the text fragments and markers it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    /// Root of the query tree.
    pub query: Query,
    /// Stores filled while parsing, including by referenced queries.
    pub provenance: Provenance,
}

impl<'a> QueryParser<'a> {
    /// Creates a parser without field mapping or references.
    pub fn new(config: &'a ParserConfig, analyzer: &'a dyn Analyzer) -> Self {
        Self {
            config,
            analyzer,
            fields: None,
            references: None,
        }
    }

    /// Resolves explicit fields through `fields`.
    pub fn with_fields(mut self, fields: &'a FieldResolver) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Resolves `#N` markers against `references`.
    pub fn with_references(mut self, references: &'a ReferenceProvider) -> Self {
        self.references = Some(references);
        self
    }

    /// Renders a query so that this parser reads it back as the same tree.
    pub fn query_string(&self, query: &Query) -> String {
        query.to_query_string_with(&self.default_field(), self.config.default_operator)
    }

    /// Returns a query builder with this parser's analyzer and limits.
    pub fn builder(&self) -> QueryBuilder<'a> {
        QueryBuilder::new(self.analyzer)
            .with_position_increments(self.config.enable_position_increments)
            .with_max_clause_count(self.config.max_clause_count)
    }

    /// Returns the canonical default field. It is alias-resolved but never whitelist-checked.
    pub fn default_field(&self) -> String {
        let field = self.config.default_field.as_str();
        self.fields
            .map_or(field, |fields| fields.canonical(field))
            .to_string()
    }

    /// Parses a query string.
    ///
    /// A query with no searchable text yields [`Query::MatchNone`].
    pub fn parse(&self, query: &str) -> Result<ParsedQuery, QueryError> {
        let mut provenance = Provenance::new();
        let query = self.parse_with(query, &mut provenance)?;
        Ok(ParsedQuery { query, provenance })
    }

    /// Parses a query string, adding fragments and markers to existing stores.
    pub fn parse_with(
        &self,
        query: &str,
        provenance: &mut Provenance,
    ) -> Result<Query, QueryError> {
        debug!(query, mode = ?self.config.reference_mode, "parsing query");
        let mut chain = ResolutionChain::new(self.config.max_reference_depth);

        let expanded;
        let (text, structural) = match (self.config.reference_mode, self.references) {
            (ReferenceMode::Structural, _) => (query, true),
            (ReferenceMode::Textual, None) => (query, false),
            (ReferenceMode::Textual, Some(references)) => {
                expanded = references
                    .expand_into(query, &mut provenance.references, &mut chain)
                    .map_err(|err| err.with_query(query))?;
                (expanded.as_str(), false)
            }
        };

        let default_field = self.default_field();
        let mut session = Session {
            parser: self,
            tokens: TokenStream::new(text),
            provenance,
            chain: &mut chain,
            structural,
            depth: 0,
        };
        let parsed = session
            .parse_top(&default_field)
            .map_err(|err| err.with_query(text))?;
        Ok(parsed.unwrap_or(Query::MatchNone))
    }

    /// Resolves an explicit field token.
    fn resolve_field(&self, name: &str, position: usize) -> Result<String, QueryError> {
        match self.fields {
            Some(fields) => fields.resolve(name, Some(position)),
            None => Ok(name.to_string()),
        }
    }

    /// Occur of clauses without a modifier.
    fn default_occur(&self) -> Occur {
        match self.config.default_operator {
            Operator::Or => Occur::Should,
            Operator::And => Occur::Must,
        }
    }

    /// Lowercases text of multi-term leaves when configured to.
    fn expanded(&self, text: String) -> String {
        if self.config.lowercase_expanded_terms {
            text.to_lowercase()
        } else {
            text
        }
    }
}

/// A clause read by the parser, before it joins a boolean query.
struct Parsed {
    /// Occur after modifiers and `AND` joins.
    occur: Occur,
    /// The clause carried a `+`, `-`, `!` or `NOT` modifier.
    explicit: bool,
    /// The clause query; `None` when its text analyzed to nothing.
    query: Option<Query>,
}

/// Suffixes following a value.
#[derive(Default)]
struct Suffixes {
    /// The `~` token, if any.
    tilde: Option<Token>,
    /// The `^` factor, if any.
    boost: Option<f32>,
}

/// State of one parse. Referenced queries run in a nested session sharing the stores and chain.
struct Session<'s, 'a> {
    /// The parser being run.
    parser: &'s QueryParser<'a>,
    /// Tokens of the text being parsed.
    tokens: TokenStream<'s>,
    /// Stores shared by the whole parse.
    provenance: &'s mut Provenance,
    /// References being resolved.
    chain: &'s mut ResolutionChain,
    /// Reference tokens are resolved rather than read as text.
    structural: bool,
    /// Groups currently open, including those of enclosing sessions.
    depth: usize,
}

impl Session<'_, '_> {
    /// Parses the whole input.
    fn parse_top(&mut self, field: &str) -> Result<Option<Query>, QueryError> {
        let query = self.parse_query(field)?;
        let token = self.tokens.next()?;
        if token.kind != TokenKind::Eof {
            return Err(QueryError::syntax(
                "unexpected closing parenthesis",
                Some(token.start),
            ));
        }
        Ok(query)
    }

    /// Parses clauses up to the end of input or a closing parenthesis.
    fn parse_query(&mut self, field: &str) -> Result<Option<Query>, QueryError> {
        let mut closed: Vec<Vec<Parsed>> = Vec::new();
        let mut current: Vec<Parsed> = Vec::new();
        let mut seen = false;

        loop {
            let kind = self.tokens.peek_kind()?;
            let conjunction = match kind {
                TokenKind::Eof | TokenKind::RParen => break,
                TokenKind::And | TokenKind::Or => {
                    let token = self.tokens.next()?;
                    if !seen {
                        return Err(unexpected(&token));
                    }
                    Some(kind)
                }
                _ => None,
            };

            let modifier = self.parse_modifier()?;
            let query = self.parse_clause(field)?;
            let mut occur = modifier.unwrap_or_else(|| self.parser.default_occur());

            match conjunction {
                Some(TokenKind::Or) => closed.push(mem::take(&mut current)),
                Some(TokenKind::And) => {
                    if let Some(previous) = current.last_mut()
                        && previous.occur != Occur::MustNot
                    {
                        previous.occur = Occur::Must;
                    }
                    if occur != Occur::MustNot {
                        occur = Occur::Must;
                    }
                }
                _ => {}
            }
            current.push(Parsed {
                occur,
                explicit: modifier.is_some(),
                query,
            });
            seen = true;
        }

        if closed.is_empty() {
            return self.finish(current);
        }
        closed.push(current);
        self.combine_runs(closed)
    }

    /// Turns the runs of a query containing `OR` into one optional clause each.
    fn combine_runs(&self, runs: Vec<Vec<Parsed>>) -> Result<Option<Query>, QueryError> {
        let mut clauses = Vec::with_capacity(runs.len());
        for run in runs {
            let mut run: Vec<Parsed> = run.into_iter().filter(|p| p.query.is_some()).collect();
            if run.len() > 1 {
                clauses.push(Parsed {
                    occur: Occur::Should,
                    explicit: false,
                    query: self.finish(run)?,
                });
            } else if let Some(mut only) = run.pop() {
                if !only.explicit {
                    only.occur = Occur::Should;
                }
                clauses.push(only);
            }
        }
        self.finish(clauses)
    }

    /// Builds a boolean query from clauses, unwrapping a lone clause without a modifier.
    fn finish(&self, parsed: Vec<Parsed>) -> Result<Option<Query>, QueryError> {
        let mut parsed: Vec<Parsed> = parsed.into_iter().filter(|p| p.query.is_some()).collect();
        if parsed.len() == 1 && !parsed[0].explicit {
            return Ok(parsed.pop().and_then(|p| p.query));
        }
        if parsed.is_empty() {
            return Ok(None);
        }
        let limit = self.parser.config.max_clause_count;
        if parsed.len() > limit {
            return Err(QueryError::too_many_clauses(limit, parsed.len()));
        }
        let clauses = parsed
            .into_iter()
            .filter_map(|p| p.query.map(|query| Clause::new(p.occur, query)))
            .collect();
        Ok(Some(Query::boolean(clauses)))
    }

    /// Consumes an optional `+`, `-`, `!` or `NOT`.
    fn parse_modifier(&mut self) -> Result<Option<Occur>, QueryError> {
        let occur = match self.tokens.peek_kind()? {
            TokenKind::Plus => Occur::Must,
            TokenKind::Minus | TokenKind::Bang | TokenKind::Not => Occur::MustNot,
            _ => return Ok(None),
        };
        self.tokens.next()?;
        Ok(Some(occur))
    }

    /// Parses a group, a field expression or a bare value.
    fn parse_clause(&mut self, field: &str) -> Result<Option<Query>, QueryError> {
        let token = self.tokens.next()?;
        match token.kind {
            TokenKind::LParen => self.parse_group(field, &token),
            TokenKind::Term | TokenKind::Number | TokenKind::Star
                if matches!(
                    self.tokens.peek_kind()?,
                    TokenKind::Colon | TokenKind::Equals
                ) =>
            {
                self.tokens.next()?;
                let field = self
                    .parser
                    .resolve_field(&unescape(&token.image), token.start)?;
                let value = self.tokens.next()?;
                if value.kind == TokenKind::LParen {
                    self.parse_group(&field, &value)
                } else {
                    self.parse_value(&field, value)
                }
            }
            _ => self.parse_value(field, token),
        }
    }

    /// Parses the rest of a group after its opening parenthesis.
    fn parse_group(&mut self, field: &str, open: &Token) -> Result<Option<Query>, QueryError> {
        self.enter_group(open)?;
        let inner = self.parse_query(field);
        self.exit_group();
        let inner = inner?;
        let close = self.tokens.next()?;
        if close.kind != TokenKind::RParen {
            return Err(QueryError::syntax(
                "expected closing parenthesis",
                Some(close.start),
            ));
        }
        self.parse_boost_only(inner, "group")
    }

    /// Counts an opened group, failing past [`MAX_GROUP_DEPTH`].
    fn enter_group(&mut self, open: &Token) -> Result<(), QueryError> {
        if self.depth >= MAX_GROUP_DEPTH {
            return Err(QueryError::syntax(
                format!("groups nested deeper than {MAX_GROUP_DEPTH} levels"),
                Some(open.start),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Counts a closed group.
    fn exit_group(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Parses a leaf starting with `token`, including its suffixes.
    fn parse_value(&mut self, field: &str, token: Token) -> Result<Option<Query>, QueryError> {
        match token.kind {
            TokenKind::Reference if self.structural => {
                let query = self.resolve_reference(field, &token)?;
                self.parse_boost_only(query, "reference")
            }
            TokenKind::Term | TokenKind::Number | TokenKind::Reference => {
                if token.kind == TokenKind::Reference {
                    self.provenance.references.add(&token.image);
                }
                let suffixes = self.parse_suffixes()?;
                let query = match &suffixes.tilde {
                    Some(tilde) => Some(self.fuzzy(field, &token, tilde)?),
                    None => self.field_query(field, &unescape(&token.image), false, None)?,
                };
                Ok(boosted(query, suffixes.boost))
            }
            TokenKind::QuotedString => {
                let suffixes = self.parse_suffixes()?;
                let slop = suffixes
                    .tilde
                    .as_ref()
                    .map(|tilde| phrase_slop(tilde, self.parser.config.phrase_slop));
                let query = self.field_query(field, &unquote(&token.image), true, slop)?;
                Ok(boosted(query, suffixes.boost))
            }
            TokenKind::PrefixTerm => {
                let query = self.prefix(field, &token);
                self.parse_boost_only(Some(query), "prefix query")
            }
            TokenKind::WildTerm | TokenKind::Star => {
                let query = self.wildcard(field, &token)?;
                self.parse_boost_only(Some(query), "wildcard query")
            }
            TokenKind::Regexp => {
                let query = self.regexp(field, &token);
                self.parse_boost_only(Some(query), "regular expression")
            }
            TokenKind::LBracket | TokenKind::LBrace => {
                let query = self.parse_range(field, &token)?;
                self.parse_boost_only(Some(query), "range")
            }
            _ => Err(unexpected(&token)),
        }
    }

    /// Consumes `~` and `^` suffixes, each at most once.
    fn parse_suffixes(&mut self) -> Result<Suffixes, QueryError> {
        let mut suffixes = Suffixes::default();
        loop {
            match self.tokens.peek_kind()? {
                TokenKind::Tilde => {
                    let tilde = self.tokens.next()?;
                    if suffixes.tilde.is_some() {
                        return Err(QueryError::syntax("duplicate '~'", Some(tilde.start)));
                    }
                    suffixes.tilde = Some(tilde);
                }
                TokenKind::Caret => {
                    let caret = self.tokens.next()?;
                    if suffixes.boost.is_some() {
                        return Err(QueryError::syntax("duplicate boost", Some(caret.start)));
                    }
                    suffixes.boost = Some(self.parse_boost_factor()?);
                }
                _ => return Ok(suffixes),
            }
        }
    }

    /// Reads the number after `^`.
    fn parse_boost_factor(&mut self) -> Result<f32, QueryError> {
        let number = self.tokens.next()?;
        if number.kind != TokenKind::Number {
            return Err(QueryError::syntax(
                "expected number after '^'",
                Some(number.start),
            ));
        }
        let invalid = || {
            QueryError::syntax(
                format!("invalid boost {:?}", number.image),
                Some(number.start),
            )
        };
        let factor: f32 = number.image.parse().map_err(|_| invalid())?;
        if !factor.is_finite() {
            return Err(invalid());
        }
        Ok(factor)
    }

    /// Applies an optional boost to a unit that does not accept `~`.
    fn parse_boost_only(
        &mut self,
        query: Option<Query>,
        unit: &str,
    ) -> Result<Option<Query>, QueryError> {
        let suffixes = self.parse_suffixes()?;
        if let Some(tilde) = suffixes.tilde {
            return Err(QueryError::syntax(
                format!("unexpected '~' after {unit}"),
                Some(tilde.start),
            ));
        }
        Ok(boosted(query, suffixes.boost))
    }

    /// Records the fragment and hands it to the query builder.
    fn field_query(
        &mut self,
        field: &str,
        text: &str,
        quoted: bool,
        slop: Option<u32>,
    ) -> Result<Option<Query>, QueryError> {
        self.provenance.record_text(field, text);
        let config = self.parser.config;
        self.parser.builder().create_field_query(
            field,
            text,
            self.parser.default_occur(),
            quoted || config.auto_generate_phrase_queries,
            slop.unwrap_or(config.phrase_slop),
        )
    }

    /// Builds a fuzzy query from a term and its `~` suffix.
    fn fuzzy(&mut self, field: &str, token: &Token, tilde: &Token) -> Result<Query, QueryError> {
        let config = self.parser.config;
        let text = unescape(&token.image);
        self.provenance.record_text(field, &text);

        let similarity = match tilde.image.strip_prefix('~').filter(|n| !n.is_empty()) {
            Some(number) => number.parse::<f32>().map_err(|_| invalid_fuzzy(tilde))?,
            None => config.fuzzy_min_sim,
        };
        let text = self.parser.expanded(text);
        let max_edits =
            fuzzy_edits(similarity, text.chars().count()).ok_or_else(|| invalid_fuzzy(tilde))?;

        Ok(Query::Fuzzy {
            field: field.to_string(),
            text,
            max_edits,
            prefix_length: config.fuzzy_prefix_length,
            rewrite: config.rewrite,
        })
    }

    /// Builds a prefix query from `term*`.
    fn prefix(&mut self, field: &str, token: &Token) -> Query {
        let raw = token.image.strip_suffix('*').unwrap_or(&token.image);
        let prefix = unescape(raw);
        self.provenance.record_text(field, &prefix);
        Query::Prefix {
            field: field.to_string(),
            prefix: self.parser.expanded(prefix),
            rewrite: self.parser.config.rewrite,
        }
    }

    /// Builds a wildcard query, or match-all for `*:*`.
    fn wildcard(&mut self, field: &str, token: &Token) -> Result<Query, QueryError> {
        let config = self.parser.config;
        let pattern = token.image.as_str();
        if field == "*" && pattern == "*" {
            return Ok(Query::MatchAll);
        }
        if !config.allow_leading_wildcard && pattern.starts_with(['*', '?']) {
            return Err(QueryError::syntax(
                "'*' or '?' not allowed as first character in wildcard query",
                Some(token.start),
            ));
        }
        self.provenance.record_text(field, pattern);
        Ok(Query::Wildcard {
            field: field.to_string(),
            pattern: self.parser.expanded(pattern.to_string()),
            rewrite: config.rewrite,
        })
    }

    /// Builds a regexp query from `/pattern/`.
    fn regexp(&mut self, field: &str, token: &Token) -> Query {
        let pattern = token
            .image
            .strip_prefix('/')
            .and_then(|p| p.strip_suffix('/'))
            .unwrap_or(&token.image);
        self.provenance.record_text(field, pattern);
        Query::Regexp {
            field: field.to_string(),
            pattern: self.parser.expanded(pattern.to_string()),
            rewrite: self.parser.config.rewrite,
        }
    }

    /// Parses the rest of a range after its opening bracket.
    fn parse_range(&mut self, field: &str, open: &Token) -> Result<Query, QueryError> {
        let lower = self.parse_range_bound()?;
        let to = self.tokens.next()?;
        if to.kind != TokenKind::To {
            return Err(QueryError::syntax("expected TO in range", Some(to.start)));
        }
        let upper = self.parse_range_bound()?;
        let close = self.tokens.next()?;
        let include_upper = match close.kind {
            TokenKind::RBracket => true,
            TokenKind::RBrace => false,
            _ => {
                return Err(QueryError::syntax(
                    "expected ']' or '}' to close range",
                    Some(close.start),
                ));
            }
        };

        let lower = lower
            .map(|bound| self.range_term(field, bound, false))
            .transpose()?;
        let upper = upper
            .map(|bound| self.range_term(field, bound, include_upper))
            .transpose()?;
        Ok(Query::Range {
            field: field.to_string(),
            lower,
            upper,
            include_lower: open.kind == TokenKind::LBracket,
            include_upper,
            rewrite: self.parser.config.rewrite,
        })
    }

    /// Reads one range bound; an unquoted `*` is unbounded.
    fn parse_range_bound(&mut self) -> Result<Option<String>, QueryError> {
        let token = self.tokens.next()?;
        match token.kind {
            TokenKind::Term if token.image == "*" => Ok(None),
            TokenKind::Term => Ok(Some(unescape(&token.image))),
            TokenKind::QuotedString => Ok(Some(unquote(&token.image))),
            _ => Err(QueryError::syntax("expected range bound", Some(token.start))),
        }
    }

    /// Normalizes a range bound: lowercasing, date rounding, then analysis.
    fn range_term(
        &mut self,
        field: &str,
        text: String,
        end_of_day: bool,
    ) -> Result<String, QueryError> {
        self.provenance.record_text(field, &text);
        let config = self.parser.config;
        let mut text = self.parser.expanded(text);
        if let Some(resolution) = config.date_resolution_for(field)
            && let Some(date) = date::to_resolution(&text, resolution, end_of_day)
        {
            text = date;
        }
        if !config.analyze_range_terms {
            return Ok(text);
        }
        let tokens = self.parser.analyzer.analyze(field, &text);
        match <[_; 1]>::try_from(tokens) {
            Ok([token]) => Ok(token.text),
            Err(tokens) => Err(QueryError::range(format!(
                "range bound {text:?} analyzed to {} terms, expected exactly one",
                tokens.len()
            ))),
        }
    }

    /// Splices in the tree of a referenced query.
    ///
    /// Markers that do not resolve are searched as text. A referenced query that fails to
    /// parse contributes nothing, unless the failure is a cycle or depth violation, which
    /// keeps the text of the innermost referenced query.
    fn resolve_reference(
        &mut self,
        field: &str,
        token: &Token,
    ) -> Result<Option<Query>, QueryError> {
        let marker = token.image.as_str();
        self.provenance.references.add(marker);
        let Some(references) = self.parser.references else {
            warn!(marker, "no earlier queries to refer to, treating marker as text");
            return self.field_query(field, marker, false, None);
        };
        let Some((index, text)) = references.lookup(marker) else {
            return self.field_query(field, marker, false, None);
        };

        self.chain.enter(index, marker)?;
        debug!(marker, depth = self.chain.depth(), "resolving reference");
        let mut nested = Session {
            parser: self.parser,
            tokens: TokenStream::new(text),
            provenance: &mut *self.provenance,
            chain: &mut *self.chain,
            structural: true,
            depth: self.depth,
        };
        let result = nested.parse_top(field);
        self.chain.leave();

        match result {
            Err(err) if !is_fatal(&err) => {
                warn!(
                    marker,
                    error = %err.message(),
                    "referenced query failed to parse, ignoring it"
                );
                Ok(None)
            }
            Err(err) => Err(err.with_query(text)),
            ok => ok,
        }
    }
}

/// Wraps a query in a boost unless the factor is neutral.
fn boosted(query: Option<Query>, boost: Option<f32>) -> Option<Query> {
    match boost {
        Some(factor) if (factor - 1.0).abs() > f32::EPSILON => {
            query.map(|query| Query::boost(query, factor))
        }
        _ => query,
    }
}

/// Converts a fuzzy suffix into an edit distance.
///
/// Whole numbers up to 2 are edit distances. A similarity between 0 and 1 allows
/// `floor((1 - similarity) * length)` edits, capped at 2.
fn fuzzy_edits(similarity: f32, length: usize) -> Option<u8> {
    if similarity >= 1.0 || similarity == 0.0 {
        (similarity.fract() == 0.0 && similarity <= 2.0).then_some(similarity as u8)
    } else if similarity > 0.0 {
        let edits = ((1.0 - similarity) * length as f32).floor().min(2.0);
        Some(edits as u8)
    } else {
        None
    }
}

/// Reads a phrase slop from a `~` suffix, truncating fractions.
fn phrase_slop(tilde: &Token, default: u32) -> u32 {
    tilde
        .image
        .strip_prefix('~')
        .and_then(|n| n.parse::<f32>().ok())
        .map_or(default, |n| n as u32)
}

/// Error for a fuzzy suffix that is neither an edit distance nor a similarity.
fn invalid_fuzzy(tilde: &Token) -> QueryError {
    QueryError::syntax(
        format!(
            "invalid fuzzy suffix '{}': expected 0, 1, 2 or a similarity below 1",
            tilde.image
        ),
        Some(tilde.start),
    )
}

/// Error for a token that cannot appear where it was found.
fn unexpected(token: &Token) -> QueryError {
    let message = match token.kind {
        TokenKind::Eof => String::from("unexpected end of query"),
        TokenKind::RParen => String::from("unexpected closing parenthesis"),
        TokenKind::And => String::from("unexpected AND (needs expression before it)"),
        TokenKind::Or => String::from("unexpected OR (needs expression before it)"),
        TokenKind::Caret => String::from("unexpected boost (needs expression before it)"),
        TokenKind::Tilde => String::from("unexpected '~' (needs term before it)"),
        TokenKind::Plus | TokenKind::Minus | TokenKind::Bang | TokenKind::Not => {
            format!("unexpected modifier '{}'", token.image)
        }
        _ => format!("unexpected '{}'", token.image),
    };
    QueryError::syntax(message, Some(token.start))
}

/// Reference errors that abort the whole parse instead of dropping the reference.
fn is_fatal(err: &QueryError) -> bool {
    matches!(
        err.kind,
        QueryErrorKind::ReferenceCycle { .. } | QueryErrorKind::ReferenceDepth { .. }
    )
}
