//! Query language parsing for refql.
//!
//! This crate turns query strings into a [`Query`] tree:
//!
//! - **Terms**: `rust` - analyzed into a term, synonym set or boolean query
//! - **Phrases**: `"error handling"~2` - terms at fixed positions, with optional slop
//! - **Modifiers**: `+required -prohibited !prohibited NOT prohibited`
//! - **Operators**: `a AND b OR c` - `OR` separates conjunctive runs
//! - **Fields**: `title:guide`, `名称=测试` - aliased and whitelisted through a [`FieldResolver`]
//! - **Multi-term**: `pre*`, `te?t`, `roam~1`, `/re.*x/`, `[a TO z}`
//! - **Boosting**: `rust^2.5`, `(a b)^0.5`
//! - **References**: `#2` - the tree of an earlier query, see [`ReferenceProvider`]
//!
//! While parsing, every literal fragment and marker is recorded in [`Provenance`] stores.
//!
//! # Example
//!
//! ```
//! use refql_query::{ParserConfig, QueryParser, ReferenceProvider, WhitespaceAnalyzer};
//!
//! let config = ParserConfig::new("text");
//! let analyzer = WhitespaceAnalyzer::new(true);
//! let references = ReferenceProvider::new(["title:guide"]);
//! let parser = QueryParser::new(&config, &analyzer).with_references(&references);
//!
//! let parsed = parser.parse("#1 AND (Rust OR golang) -deprecated").unwrap();
//! assert_eq!(
//!     parsed.query.to_query_string("text"),
//!     "+title:guide +(rust golang) -deprecated"
//! );
//! assert!(parsed.provenance.references.contains("#1"));
//! ```

#![warn(missing_docs)]

mod analysis;
mod ast;
mod builder;
mod config;
mod date;
mod error;
mod escape;
mod fields;
mod lexer;
mod parser;
mod provenance;
mod reference;
mod stream;

pub use analysis::{AnalyzedToken, Analyzer, SimpleAnalyzer, WhitespaceAnalyzer};
pub use ast::{Clause, Occur, PhrasePosition, PhraseTerm, Query};
pub use builder::QueryBuilder;
pub use config::{DateResolution, Operator, ParserConfig, ReferenceMode, RewriteMethod};
pub use error::{LexError, QueryError, QueryErrorKind};
pub use escape::{escape, unescape};
pub use fields::FieldResolver;
pub use lexer::{LexState, Lexer, Token, TokenKind, tokenize};
pub use parser::{ParsedQuery, QueryParser};
pub use provenance::{FieldTextStore, Provenance, QueryTextStore, ReferenceStore};
pub use reference::{ReferenceProvider, ResolutionChain, find_markers, parse_marker};
pub use stream::TokenStream;

/// Parses a query with the default configuration and a lowercasing whitespace analyzer.
///
/// Convenient for tests and tools; use [`QueryParser`] to configure fields, analysis and
/// references.
pub fn parse(input: &str) -> Result<Query, QueryError> {
    let config = ParserConfig::default();
    let analyzer = WhitespaceAnalyzer::new(true);
    QueryParser::new(&config, &analyzer)
        .parse(input)
        .map(|parsed| parsed.query)
}
