//! Synonym expansion as an analyzer decorator.

use std::collections::HashMap;

use refql_query::{AnalyzedToken, Analyzer};
use tracing::warn;

/// Wraps an analyzer and emits synonyms at the same position as the token they expand.
///
/// Words and synonyms are passed through the inner analyzer when added, so they match the
/// analyzed form of query text (a stemmed `dogs` matches an entry written as `dogs`).
/// Entries that analyze to anything but a single token are skipped.
#[derive(Debug, Clone)]
pub struct SynonymAnalyzer<A> {
    /// Analyzer producing the tokens to expand.
    inner: A,
    /// Analyzed word to analyzed alternatives.
    synonyms: HashMap<String, Vec<String>>,
}

impl<A: Analyzer> SynonymAnalyzer<A> {
    /// Wraps `inner` with an empty synonym table.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            synonyms: HashMap::new(),
        }
    }

    /// Adds synonym entries.
    pub fn with_synonyms<I, K, V, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (word, alternatives) in entries {
            self.add(word.as_ref(), alternatives);
        }
        self
    }

    /// Adds alternatives for one word.
    pub fn add<I, S>(&mut self, word: &str, alternatives: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(key) = self.single_token(word) else {
            return;
        };
        let alternatives: Vec<String> = alternatives
            .into_iter()
            .filter_map(|alt| self.single_token(alt.as_ref()))
            .filter(|alt| *alt != key)
            .collect();
        let entry = self.synonyms.entry(key).or_default();
        for alt in alternatives {
            if !entry.contains(&alt) {
                entry.push(alt);
            }
        }
    }

    /// Number of words with synonyms.
    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    /// Returns true if no synonyms are configured.
    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }

    /// Analyzes a synonym entry, which must yield exactly one token.
    fn single_token(&self, text: &str) -> Option<String> {
        let tokens = self.inner.analyze("", text);
        match <[AnalyzedToken; 1]>::try_from(tokens) {
            Ok([token]) => Some(token.text),
            Err(tokens) => {
                warn!(
                    entry = text,
                    tokens = tokens.len(),
                    "synonym entry is not a single token, skipping it"
                );
                None
            }
        }
    }
}

impl<A: Analyzer> Analyzer for SynonymAnalyzer<A> {
    fn analyze(&self, field: &str, text: &str) -> Vec<AnalyzedToken> {
        let mut out = Vec::new();
        for token in self.inner.analyze(field, text) {
            let alternatives = self.synonyms.get(&token.text);
            let (start, end) = (token.start_offset, token.end_offset);
            out.push(token);
            for alt in alternatives.into_iter().flatten() {
                out.push(AnalyzedToken {
                    text: alt.clone(),
                    position_increment: 0,
                    start_offset: start,
                    end_offset: end,
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use refql_query::WhitespaceAnalyzer;

    use super::*;
    use crate::TantivyAnalyzer;

    fn texts(tokens: &[AnalyzedToken]) -> Vec<(&str, u32)> {
        tokens
            .iter()
            .map(|t| (t.text.as_str(), t.position_increment))
            .collect()
    }

    #[test]
    fn injects_alternatives_at_same_position() {
        let analyzer = SynonymAnalyzer::new(WhitespaceAnalyzer::new(true))
            .with_synonyms([("pig", ["cavy", "hog"])]);
        let tokens = analyzer.analyze("f", "Pig farm");
        assert_eq!(
            texts(&tokens),
            vec![("pig", 1), ("cavy", 0), ("hog", 0), ("farm", 1)]
        );
        assert_eq!((tokens[1].start_offset, tokens[1].end_offset), (0, 3));
    }

    #[test]
    fn entries_are_analyzed() {
        let analyzer = SynonymAnalyzer::new(TantivyAnalyzer::default())
            .with_synonyms([("Dogs", ["hounds"])]);
        let tokens = analyzer.analyze("f", "dog");
        assert_eq!(texts(&tokens), vec![("dog", 1), ("hound", 0)]);
    }

    #[test]
    fn multi_token_entries_are_skipped() {
        let analyzer = SynonymAnalyzer::new(WhitespaceAnalyzer::new(true))
            .with_synonyms([("usa", vec!["united states", "america"]), ("a b", vec!["c"])]);
        assert_eq!(analyzer.len(), 1);
        let tokens = analyzer.analyze("f", "usa");
        assert_eq!(texts(&tokens), vec![("usa", 1), ("america", 0)]);
    }

    #[test]
    fn duplicates_and_self_references_are_ignored() {
        let mut analyzer = SynonymAnalyzer::new(WhitespaceAnalyzer::new(true));
        analyzer.add("tv", ["television", "TV"]);
        analyzer.add("tv", ["television"]);
        let tokens = analyzer.analyze("f", "tv");
        assert_eq!(texts(&tokens), vec![("tv", 1), ("television", 0)]);
    }
}
