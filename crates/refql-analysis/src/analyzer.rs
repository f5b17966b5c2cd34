//! Tantivy text analysis behind the query parser's [`Analyzer`] trait.
//!
//! The analysis pipeline consists of:
//! 1. `SimpleTokenizer` - splits on whitespace and punctuation
//! 2. `LowerCaser` - converts tokens to lowercase
//! 3. `RemoveLongFilter` - removes tokens longer than 40 bytes
//! 4. `StopWordFilter` - optional, built-in list and/or custom words
//! 5. `Stemmer` - optional, language-specific stemming
//!
//! Removed tokens keep their positions, so the parser sees the gap as a position increment.

use std::collections::HashMap;

use refql_query::{AnalyzedToken, Analyzer};
use tantivy::tokenizer::{
    Language, LowerCaser, RawTokenizer, RemoveLongFilter, SimpleTokenizer, Stemmer,
    StopWordFilter, TextAnalyzer, TokenStream,
};
use tracing::warn;

use crate::error::AnalysisError;

/// Maximum token length in bytes. Tokens longer than this are dropped.
pub const MAX_TOKEN_LENGTH: usize = 40;

/// Parses a stemmer language string into a Tantivy `Language`.
///
/// Supports lowercase language names matching Tantivy's `Language` enum.
/// The match is case-insensitive.
pub fn parse_language(name: &str) -> Result<Language, AnalysisError> {
    match name.to_lowercase().as_str() {
        "arabic" => Ok(Language::Arabic),
        "danish" => Ok(Language::Danish),
        "dutch" => Ok(Language::Dutch),
        "english" => Ok(Language::English),
        "finnish" => Ok(Language::Finnish),
        "french" => Ok(Language::French),
        "german" => Ok(Language::German),
        "greek" => Ok(Language::Greek),
        "hungarian" => Ok(Language::Hungarian),
        "italian" => Ok(Language::Italian),
        "norwegian" => Ok(Language::Norwegian),
        "portuguese" => Ok(Language::Portuguese),
        "romanian" => Ok(Language::Romanian),
        "russian" => Ok(Language::Russian),
        "spanish" => Ok(Language::Spanish),
        "swedish" => Ok(Language::Swedish),
        "tamil" => Ok(Language::Tamil),
        "turkish" => Ok(Language::Turkish),
        other => Err(AnalysisError::InvalidLanguage(other.to_string())),
    }
}

/// Settings for a text analysis pipeline.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Language for stemming and the built-in stop word list.
    pub language: Language,
    /// Apply the stemmer.
    pub stemming: bool,
    /// Remove the language's built-in stop words.
    pub builtin_stop_words: bool,
    /// Additional words to remove, matched after lowercasing.
    pub stop_words: Vec<String>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            language: Language::English,
            stemming: true,
            builtin_stop_words: false,
            stop_words: Vec::new(),
        }
    }
}

impl AnalyzerOptions {
    /// Default options for a language given by name.
    pub fn for_language(name: &str) -> Result<Self, AnalysisError> {
        Ok(Self {
            language: parse_language(name)?,
            ..Self::default()
        })
    }
}

/// Builds a Tantivy text analyzer from options.
pub fn build_text_analyzer(options: &AnalyzerOptions) -> TextAnalyzer {
    let mut builder = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .dynamic();

    if options.builtin_stop_words {
        match StopWordFilter::new(options.language) {
            Some(filter) => builder = builder.filter_dynamic(filter),
            None => warn!(language = ?options.language, "no built-in stop words for language"),
        }
    }
    if !options.stop_words.is_empty() {
        let words = options.stop_words.iter().map(|w| w.to_lowercase());
        builder = builder.filter_dynamic(StopWordFilter::remove(words));
    }
    if options.stemming {
        builder = builder.filter_dynamic(Stemmer::new(options.language));
    }
    builder.build()
}

/// Builds an analyzer that keeps the whole text as one lowercased token.
pub fn build_keyword_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(RawTokenizer::default())
        .filter(LowerCaser)
        .build()
}

/// An [`Analyzer`] backed by Tantivy text analyzers, with optional per-field overrides.
#[derive(Clone)]
pub struct TantivyAnalyzer {
    /// Analyzer for fields without an override.
    default: TextAnalyzer,
    /// Per-field analyzers.
    fields: HashMap<String, TextAnalyzer>,
}

impl TantivyAnalyzer {
    /// Wraps a Tantivy analyzer used for every field.
    pub fn new(analyzer: TextAnalyzer) -> Self {
        Self {
            default: analyzer,
            fields: HashMap::new(),
        }
    }

    /// Builds the analysis pipeline described by `options`.
    pub fn from_options(options: &AnalyzerOptions) -> Self {
        Self::new(build_text_analyzer(options))
    }

    /// Uses `analyzer` for one field.
    pub fn with_field(mut self, field: impl Into<String>, analyzer: TextAnalyzer) -> Self {
        self.fields.insert(field.into(), analyzer);
        self
    }

    /// Treats the given fields as keywords: no splitting, stemming or stop words.
    pub fn with_keyword_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.fields.insert(field.into(), build_keyword_analyzer());
        }
        self
    }
}

impl Default for TantivyAnalyzer {
    fn default() -> Self {
        Self::from_options(&AnalyzerOptions::default())
    }
}

impl Analyzer for TantivyAnalyzer {
    fn analyze(&self, field: &str, text: &str) -> Vec<AnalyzedToken> {
        // token_stream needs &mut, so each call works on its own copy
        let mut analyzer = self.fields.get(field).unwrap_or(&self.default).clone();
        let mut stream = analyzer.token_stream(text);

        let mut tokens = Vec::new();
        let mut next_position = 0;
        while stream.advance() {
            let token = stream.token();
            let increment = (token.position + 1).saturating_sub(next_position);
            next_position = token.position + 1;
            tokens.push(AnalyzedToken {
                text: token.text.clone(),
                position_increment: u32::try_from(increment).unwrap_or(u32::MAX),
                start_offset: token.offset_from,
                end_offset: token.offset_to,
            });
        }
        tokens
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn texts(analyzer: &TantivyAnalyzer, field: &str, text: &str) -> Vec<(String, u32)> {
        analyzer
            .analyze(field, text)
            .into_iter()
            .map(|t| (t.text, t.position_increment))
            .collect()
    }

    fn unstemmed() -> AnalyzerOptions {
        AnalyzerOptions {
            stemming: false,
            ..AnalyzerOptions::default()
        }
    }

    #[test]
    fn parse_all_languages() {
        let languages = [
            ("arabic", Language::Arabic),
            ("danish", Language::Danish),
            ("dutch", Language::Dutch),
            ("english", Language::English),
            ("finnish", Language::Finnish),
            ("french", Language::French),
            ("german", Language::German),
            ("greek", Language::Greek),
            ("hungarian", Language::Hungarian),
            ("italian", Language::Italian),
            ("norwegian", Language::Norwegian),
            ("portuguese", Language::Portuguese),
            ("romanian", Language::Romanian),
            ("russian", Language::Russian),
            ("spanish", Language::Spanish),
            ("swedish", Language::Swedish),
            ("tamil", Language::Tamil),
            ("turkish", Language::Turkish),
        ];

        for (name, expected) in languages {
            assert_eq!(
                parse_language(name).unwrap(),
                expected,
                "failed to parse {name}"
            );
        }
    }

    #[test]
    fn parse_case_insensitive() {
        assert_eq!(parse_language("English").unwrap(), Language::English);
        assert_eq!(parse_language("GeRmAn").unwrap(), Language::German);
    }

    #[test]
    fn parse_invalid_language() {
        let err = parse_language("klingon").unwrap_err();
        assert!(err.to_string().contains("klingon"));
        assert!(AnalyzerOptions::for_language("klingon").is_err());
    }

    #[test]
    fn lowercases_and_splits_punctuation() {
        let analyzer = TantivyAnalyzer::from_options(&unstemmed());
        assert_eq!(
            texts(&analyzer, "f", "Hello, World! foo-bar"),
            vec![
                ("hello".into(), 1),
                ("world".into(), 1),
                ("foo".into(), 1),
                ("bar".into(), 1)
            ]
        );
    }

    #[test]
    fn stems_english() {
        let analyzer = TantivyAnalyzer::default();
        let words: Vec<String> = texts(&analyzer, "f", "handling running")
            .into_iter()
            .map(|(text, _)| text)
            .collect();
        assert_eq!(words, vec!["handl", "run"]);
    }

    #[test]
    fn long_tokens_leave_a_gap() {
        let analyzer = TantivyAnalyzer::from_options(&unstemmed());
        let text = format!("short {} word", "a".repeat(50));
        assert_eq!(
            texts(&analyzer, "f", &text),
            vec![("short".into(), 1), ("word".into(), 2)]
        );
    }

    #[test]
    fn stop_words_leave_a_gap() {
        let options = AnalyzerOptions {
            builtin_stop_words: true,
            stop_words: vec!["Quick".into()],
            ..unstemmed()
        };
        let analyzer = TantivyAnalyzer::from_options(&options);
        assert_eq!(
            texts(&analyzer, "f", "the quick brown fox"),
            vec![("brown".into(), 3), ("fox".into(), 1)]
        );
        assert!(analyzer.analyze("f", "the").is_empty());
    }

    #[test]
    fn offsets_are_byte_ranges() {
        let analyzer = TantivyAnalyzer::from_options(&unstemmed());
        let tokens = analyzer.analyze("f", "ab  cd");
        assert_eq!((tokens[1].start_offset, tokens[1].end_offset), (4, 6));
    }

    #[test]
    fn keyword_fields_are_not_split() {
        let analyzer = TantivyAnalyzer::default().with_keyword_fields(["country"]);
        assert_eq!(
            texts(&analyzer, "country", "United Kingdom"),
            vec![("united kingdom".into(), 1)]
        );
        assert_eq!(texts(&analyzer, "body", "United Kingdom").len(), 2);
    }
}
