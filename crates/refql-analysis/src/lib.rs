//! Text analysis for refql queries, backed by Tantivy tokenizers.
//!
//! This crate supplies [`refql_query::Analyzer`] implementations:
//! - [`TantivyAnalyzer`] - tokenizing, lowercasing, stop words and stemming, with per-field
//!   overrides and keyword fields
//! - [`SynonymAnalyzer`] - wraps any analyzer and injects synonyms at the same position
//!
//! # Example
//!
//! ```
//! use refql_analysis::{AnalyzerOptions, SynonymAnalyzer, TantivyAnalyzer};
//! use refql_query::{ParserConfig, QueryParser};
//!
//! let options = AnalyzerOptions {
//!     stemming: false,
//!     ..AnalyzerOptions::default()
//! };
//! let analyzer = SynonymAnalyzer::new(TantivyAnalyzer::from_options(&options))
//!     .with_synonyms([("tv", ["television"])]);
//! let config = ParserConfig::new("body");
//! let parser = QueryParser::new(&config, &analyzer);
//!
//! let parsed = parser.parse("TV").unwrap();
//! assert_eq!(parsed.query.to_query_string("body"), "tv television");
//! ```

#![warn(missing_docs)]

mod analyzer;
mod error;
mod synonym;

pub use analyzer::{
    AnalyzerOptions, MAX_TOKEN_LENGTH, TantivyAnalyzer, build_keyword_analyzer,
    build_text_analyzer, parse_language,
};
pub use error::AnalysisError;
pub use synonym::SynonymAnalyzer;
pub use tantivy::tokenizer::Language;
