//! Implementation of `refql parse`.

use std::process::ExitCode;

use refql_query::{ParsedQuery, Provenance, QueryParser, ReferenceProvider};
use serde::Serialize;
use tracing::debug;

use crate::cli::{
    args::ParseCommand,
    context::CommandContext,
    output::{dim, indent, subheader},
};

/// JSON output for a parsed query.
#[derive(Serialize)]
struct JsonParseOutput<'a> {
    /// The query as given on the command line.
    input: &'a str,
    /// Canonical default field the query was parsed against.
    default_field: &'a str,
    /// Serialized form of the query tree.
    normalized: &'a str,
    /// Query tree and provenance stores.
    #[serde(flatten)]
    parsed: &'a ParsedQuery,
}

/// Parses a query with the configured analyzer, fields and the given references.
pub fn run(ctx: &CommandContext, cmd: &ParseCommand) -> ExitCode {
    let config = ctx.parser_config(cmd.field.as_deref(), cmd.references.mode.map(Into::into));

    let analyzer = match ctx.analyzer() {
        Ok(analyzer) => analyzer,
        Err(code) => return code,
    };
    let fields = ctx.field_resolver();
    let references = ReferenceProvider::new(cmd.references.refs.iter().cloned());
    let parser = QueryParser::new(&config, &analyzer)
        .with_fields(&fields)
        .with_references(&references);
    debug!(references = references.len(), "parser ready");

    let parsed = match parser.parse(&cmd.query) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let default_field = parser.default_field();
    let normalized = parser.query_string(&parsed.query);

    if cmd.json {
        let output = JsonParseOutput {
            input: &cmd.query,
            default_field: &default_field,
            normalized: &normalized,
            parsed: &parsed,
        };
        return match serde_json::to_string_pretty(&output) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to serialize JSON: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if cmd.tree {
        println!("{}", subheader("Query tree:"));
        print!("{}", indent(&parsed.query.to_string(), "  "));
        println!();
        println!("{}", subheader("Normalized:"));
        println!("  {normalized}");
        println!();
        print_provenance(&parsed.provenance);
    } else {
        println!("{normalized}");
    }

    ExitCode::SUCCESS
}

/// Prints the three provenance stores.
fn print_provenance(provenance: &Provenance) {
    println!("{}", subheader("Text by field:"));
    if provenance.fields.is_empty() {
        println!("  {}", dim("(none)"));
    }
    for field in provenance.fields.fields() {
        let texts: Vec<&str> = provenance
            .fields
            .get(field)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        println!("  {field}: {}", texts.join(", "));
    }
    println!();

    println!("{}", subheader("Query text:"));
    print_list(provenance.texts.iter());
    println!();

    println!("{}", subheader("References:"));
    print_list(provenance.references.iter());
}

/// Prints a comma-separated list, or a dimmed placeholder when empty.
fn print_list<'a>(items: impl Iterator<Item = &'a str>) {
    let items: Vec<&str> = items.collect();
    if items.is_empty() {
        println!("  {}", dim("(none)"));
    } else {
        println!("  {}", items.join(", "));
    }
}
