//! Parser tests with Tantivy analysis.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use refql_analysis::{AnalyzerOptions, SynonymAnalyzer, TantivyAnalyzer};
use refql_query::{
    FieldResolver, ParserConfig, PhraseTerm, Query, QueryParser, ReferenceProvider,
};

fn english() -> TantivyAnalyzer {
    let options = AnalyzerOptions {
        builtin_stop_words: true,
        ..AnalyzerOptions::default()
    };
    TantivyAnalyzer::from_options(&options)
}

#[test]
fn stop_words_leave_phrase_gaps() {
    let analyzer = english();
    let config = ParserConfig::new("body");
    let parser = QueryParser::new(&config, &analyzer);

    let query = parser.parse("\"the running dogs\"").unwrap().query;
    assert_eq!(
        query,
        Query::Phrase {
            field: "body".into(),
            terms: vec![
                PhraseTerm { text: "run".into(), position: 1 },
                PhraseTerm { text: "dog".into(), position: 2 },
            ],
            slop: 0,
        }
    );
}

#[test]
fn stop_words_alone_match_nothing() {
    let analyzer = english();
    let config = ParserConfig::new("body");
    let parser = QueryParser::new(&config, &analyzer);

    assert_eq!(parser.parse("the").unwrap().query, Query::MatchNone);
    assert_eq!(
        parser.parse("the rust").unwrap().query,
        Query::term("body", "rust")
    );
}

#[test]
fn keyword_fields_keep_whole_values() {
    let analyzer = TantivyAnalyzer::default().with_keyword_fields(["country"]);
    let config = ParserConfig::new("body");
    let fields = FieldResolver::new().with_aliases([("国家", "country")]);
    let parser = QueryParser::new(&config, &analyzer).with_fields(&fields);

    let query = parser.parse("国家=\"New Zealand\" Running").unwrap().query;
    assert_eq!(query.to_query_string("body"), "country:new\\ zealand run");
}

#[test]
fn synonyms_through_references() {
    let analyzer = SynonymAnalyzer::new(TantivyAnalyzer::default())
        .with_synonyms([("car", ["auto"])]);
    let config = ParserConfig::new("body");
    let references = ReferenceProvider::new(["title:Cars"]);
    let parser = QueryParser::new(&config, &analyzer).with_references(&references);

    let parsed = parser.parse("#1 -body:trucks").unwrap();
    assert_eq!(parsed.query.to_query_string("body"), "title:car -truck");
    let Query::Boolean { clauses, .. } = &parsed.query else {
        panic!("expected boolean");
    };
    assert_eq!(
        clauses[0].query,
        Query::Synonym {
            field: "title".into(),
            terms: vec!["car".into(), "auto".into()],
        }
    );
    assert!(parsed.provenance.references.contains("#1"));
}
