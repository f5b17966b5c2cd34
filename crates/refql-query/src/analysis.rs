//! The analyzer seam.
//!
//! Query text is handed to an [`Analyzer`] before leaves are built. The analyzer is an
//! external collaborator; this module only defines the contract plus two small analyzers that
//! need no index or language resources.

use std::{collections::HashSet, sync::Arc};

/// One token emitted by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    /// Term text after analysis.
    pub text: String,
    /// Distance from the previous token's position. Zero marks a synonym of the previous token;
    /// values above one leave a gap (e.g. a removed stop word).
    pub position_increment: u32,
    /// Byte offset of the source text.
    pub start_offset: usize,
    /// Byte offset one past the source text.
    pub end_offset: usize,
}

impl AnalyzedToken {
    /// Creates a token with the given text and increment and empty offsets.
    pub fn new(text: impl Into<String>, position_increment: u32) -> Self {
        Self {
            text: text.into(),
            position_increment,
            start_offset: 0,
            end_offset: 0,
        }
    }
}

/// Turns field text into a sequence of tokens.
pub trait Analyzer: Send + Sync {
    /// Analyzes `text` as it would be indexed in `field`.
    fn analyze(&self, field: &str, text: &str) -> Vec<AnalyzedToken>;
}

impl<A: Analyzer + ?Sized> Analyzer for &A {
    fn analyze(&self, field: &str, text: &str) -> Vec<AnalyzedToken> {
        (**self).analyze(field, text)
    }
}

impl<A: Analyzer + ?Sized> Analyzer for Box<A> {
    fn analyze(&self, field: &str, text: &str) -> Vec<AnalyzedToken> {
        (**self).analyze(field, text)
    }
}

impl<A: Analyzer + ?Sized> Analyzer for Arc<A> {
    fn analyze(&self, field: &str, text: &str) -> Vec<AnalyzedToken> {
        (**self).analyze(field, text)
    }
}

/// Splits on whitespace, optionally lowercasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceAnalyzer {
    /// Lowercase every token.
    pub lowercase: bool,
}

impl WhitespaceAnalyzer {
    /// Creates a whitespace analyzer.
    pub fn new(lowercase: bool) -> Self {
        Self { lowercase }
    }
}

impl Analyzer for WhitespaceAnalyzer {
    fn analyze(&self, _field: &str, text: &str) -> Vec<AnalyzedToken> {
        split_tokens(text, char::is_whitespace)
            .map(|(start, word)| AnalyzedToken {
                text: if self.lowercase {
                    word.to_lowercase()
                } else {
                    word.to_string()
                },
                position_increment: 1,
                start_offset: start,
                end_offset: start + word.len(),
            })
            .collect()
    }
}

/// Splits on anything that is not alphanumeric, lowercases, and drops stop words.
///
/// A dropped stop word still advances the position, so the next token carries an
/// increment greater than one.
#[derive(Debug, Clone, Default)]
pub struct SimpleAnalyzer {
    /// Words removed from the output.
    stop_words: HashSet<String>,
}

impl SimpleAnalyzer {
    /// Creates an analyzer without stop words.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds stop words.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words
            .extend(words.into_iter().map(|w| w.into().to_lowercase()));
        self
    }
}

impl Analyzer for SimpleAnalyzer {
    fn analyze(&self, _field: &str, text: &str) -> Vec<AnalyzedToken> {
        let mut tokens = Vec::new();
        let mut increment = 0;
        for (start, word) in split_tokens(text, |c| !c.is_alphanumeric()) {
            increment += 1;
            let lowered = word.to_lowercase();
            if self.stop_words.contains(&lowered) {
                continue;
            }
            tokens.push(AnalyzedToken {
                text: lowered,
                position_increment: increment,
                start_offset: start,
                end_offset: start + word.len(),
            });
            increment = 0;
        }
        tokens
    }
}

/// Yields `(byte offset, word)` for the non-empty pieces between separator characters.
fn split_tokens(text: &str, is_separator: fn(char) -> bool) -> impl Iterator<Item = (usize, &str)> {
    text.split(is_separator)
        .filter(|piece| !piece.is_empty())
        .map(move |piece| (piece.as_ptr() as usize - text.as_ptr() as usize, piece))
}
