//! Backreferences: `#N` markers that refer to previously submitted queries.
//!
//! Markers are resolved either textually, by substituting the referenced text before parsing,
//! or structurally by the parser, which splices the referenced query's tree in place of the
//! marker. Both walk the same [`ResolutionChain`] so cycles and runaway nesting are caught.

use std::ops::Range;

use tracing::{debug, warn};

use crate::{
    error::{QueryError, QueryErrorKind},
    lexer::is_term_char,
    provenance::ReferenceStore,
};

/// Previously submitted query strings, addressed by 1-based `#N` markers.
#[derive(Debug, Clone, Default)]
pub struct ReferenceProvider {
    /// Queries in submission order.
    queries: Vec<String>,
}

impl ReferenceProvider {
    /// Creates a provider from queries in submission order.
    pub fn new<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queries: queries.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends a query; it becomes addressable as `#len()`.
    pub fn push(&mut self, query: impl Into<String>) {
        self.queries.push(query.into());
    }

    /// Number of queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Returns true if there are no queries.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Looks up a marker such as `#2`, returning its index and query text.
    ///
    /// Unparsable or out-of-range markers are logged and yield `None`; the caller then treats
    /// the marker as literal text.
    pub fn lookup(&self, marker: &str) -> Option<(usize, &str)> {
        let Some(index) = parse_marker(marker) else {
            warn!(marker, "invalid reference marker, treating it as text");
            return None;
        };
        match index.checked_sub(1).and_then(|i| self.queries.get(i)) {
            Some(query) => Some((index, query)),
            None => {
                warn!(
                    marker,
                    available = self.queries.len(),
                    "reference not found, treating it as text"
                );
                None
            }
        }
    }

    /// Replaces every marker in `text` with the recursively expanded, parenthesized text of the
    /// query it refers to. Markers that cannot be resolved are kept as they are.
    pub fn expand(&self, text: &str, max_depth: usize) -> Result<String, QueryError> {
        let mut references = ReferenceStore::default();
        self.expand_into(text, &mut references, &mut ResolutionChain::new(max_depth))
    }

    /// Like [`Self::expand`], recording every marker seen in `references`.
    pub fn expand_into(
        &self,
        text: &str,
        references: &mut ReferenceStore,
        chain: &mut ResolutionChain,
    ) -> Result<String, QueryError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for span in find_markers(text) {
            let marker = &text[span.clone()];
            out.push_str(&text[last..span.start]);
            references.add(marker);
            match self.lookup(marker) {
                Some((index, referenced)) => {
                    chain.enter(index, marker)?;
                    let expanded = self.expand_into(referenced, references, chain);
                    chain.leave();
                    out.push('(');
                    out.push_str(&expanded?);
                    out.push(')');
                }
                None => out.push_str(marker),
            }
            last = span.end;
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

/// The references currently being resolved, innermost last.
#[derive(Debug, Clone)]
pub struct ResolutionChain {
    /// Indexes on the chain.
    active: Vec<usize>,
    /// Maximum chain length.
    limit: usize,
}

impl ResolutionChain {
    /// Creates an empty chain allowing `limit` nested resolutions.
    pub fn new(limit: usize) -> Self {
        Self {
            active: Vec::new(),
            limit,
        }
    }

    /// Starts resolving `index`, failing on a cycle or when the chain is full.
    pub fn enter(&mut self, index: usize, marker: &str) -> Result<(), QueryError> {
        if self.active.contains(&index) {
            debug!(marker, chain = ?self.active, "reference cycle detected");
            return Err(QueryError::new(QueryErrorKind::ReferenceCycle {
                marker: marker.to_string(),
            }));
        }
        if self.active.len() >= self.limit {
            return Err(QueryError::new(QueryErrorKind::ReferenceDepth { limit: self.limit }));
        }
        self.active.push(index);
        Ok(())
    }

    /// Finishes the innermost resolution.
    pub fn leave(&mut self) {
        self.active.pop();
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.active.len()
    }
}

/// Parses the index of a `#N` marker.
pub fn parse_marker(marker: &str) -> Option<usize> {
    let digits = marker.strip_prefix('#')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Finds the byte ranges of standalone markers, the ones the lexer would read as references.
///
/// A marker glued to other term characters (`c#1`, `#1a`) or escaped (`\#1`) is plain text.
pub fn find_markers(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut prev: Option<char> = None;
    for (start, ch) in text.char_indices() {
        let glued = prev.is_some_and(|p| p == '\\' || is_term_char(p));
        prev = Some(ch);
        if ch != '#' || glued {
            continue;
        }
        let rest = &text[start + 1..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let end = start + 1 + digits;
        let followed = text[end..].chars().next().is_some_and(is_term_char);
        if digits > 0 && !followed {
            spans.push(start..end);
        }
    }
    spans
}
