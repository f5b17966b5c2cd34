//! Error types for query lexing, parsing and building.
//!
//! Every failure is fatal for the parse that raised it: no partial trees are returned.

use std::{borrow::Cow, error::Error, fmt};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in input where the error occurred.
    pub position: usize,
    /// 1-based line of the error.
    pub line: usize,
    /// 1-based column (in characters) of the error.
    pub column: usize,
    /// The text that could not be tokenized.
    pub text: String,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(
        message: impl Into<String>,
        position: usize,
        (line, column): (usize, usize),
        text: impl Into<String>,
        input: &str,
    ) -> Self {
        Self {
            message: message.into(),
            position,
            line,
            column,
            text: text.into(),
            input: input.to_string(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )?;
        if !self.text.is_empty() {
            write!(f, " (near {:?})", self.text)?;
        }
        Ok(())
    }
}

impl Error for LexError {}

/// A unified error type for query parsing.
///
/// Carries the original query string (when known) so the rendered message can point at the
/// offending position.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The original query string (if available).
    pub query: Option<String>,
}

/// The specific kind of query error.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryErrorKind {
    /// No token kind matched the input.
    Lex {
        /// Error message.
        message: String,
        /// Byte position in input.
        position: usize,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
        /// Offending text.
        text: String,
    },
    /// The token sequence does not match the grammar.
    Syntax {
        /// Error message.
        message: String,
        /// Byte position of the offending token (if known).
        position: Option<usize>,
    },
    /// An explicit field is not in the whitelist.
    FieldValidation {
        /// Canonical field name that failed validation.
        field: String,
        /// Field token as written in the query.
        token: String,
        /// Byte position of the field token.
        position: Option<usize>,
    },
    /// A range bound could not be analyzed into a single term.
    Range {
        /// Error message.
        message: String,
    },
    /// A boolean query would exceed the configured clause limit.
    TooManyClauses {
        /// Configured maximum.
        limit: usize,
        /// Number of clauses that were requested.
        count: usize,
    },
    /// A reference marker refers back to a query already being resolved.
    ReferenceCycle {
        /// The marker that closed the cycle, e.g. `#2`.
        marker: String,
    },
    /// Reference resolution nested deeper than allowed.
    ReferenceDepth {
        /// Configured maximum depth.
        limit: usize,
    },
    /// A builder entry point was called with an invalid argument.
    InvalidArgument {
        /// Error message.
        message: String,
    },
}

impl QueryError {
    /// Wraps a kind with no query context.
    pub fn new(kind: QueryErrorKind) -> Self {
        Self { kind, query: None }
    }

    /// Creates a syntax error.
    pub fn syntax(message: impl Into<String>, position: Option<usize>) -> Self {
        Self::new(QueryErrorKind::Syntax {
            message: message.into(),
            position,
        })
    }

    /// Creates a field validation error.
    pub fn field_validation(
        field: impl Into<String>,
        token: impl Into<String>,
        position: Option<usize>,
    ) -> Self {
        Self::new(QueryErrorKind::FieldValidation {
            field: field.into(),
            token: token.into(),
            position,
        })
    }

    /// Creates a range analysis error.
    pub fn range(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::Range {
            message: message.into(),
        })
    }

    /// Creates a clause limit error.
    pub fn too_many_clauses(limit: usize, count: usize) -> Self {
        Self::new(QueryErrorKind::TooManyClauses { limit, count })
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::InvalidArgument {
            message: message.into(),
        })
    }

    /// Sets the query string for this error unless one is already attached.
    ///
    /// Errors raised while parsing a referenced query keep that query's text.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        if self.query.is_none() {
            self.query = Some(query.into());
        }
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> Cow<'_, str> {
        match &self.kind {
            QueryErrorKind::Lex { message, .. }
            | QueryErrorKind::Syntax { message, .. }
            | QueryErrorKind::Range { message }
            | QueryErrorKind::InvalidArgument { message } => Cow::Borrowed(message),
            QueryErrorKind::FieldValidation { field, token, .. } if field == token => {
                Cow::Owned(format!("unknown field: {field}"))
            }
            QueryErrorKind::FieldValidation { field, token, .. } => {
                Cow::Owned(format!("unknown field: {token} (resolved to {field})"))
            }
            QueryErrorKind::TooManyClauses { limit, count } => Cow::Owned(format!(
                "too many boolean clauses: {count} exceeds the limit of {limit}"
            )),
            QueryErrorKind::ReferenceCycle { marker } => {
                Cow::Owned(format!("reference cycle through {marker}"))
            }
            QueryErrorKind::ReferenceDepth { limit } => {
                Cow::Owned(format!("references nested deeper than {limit} levels"))
            }
        }
    }

    /// Returns the byte position the error points at, if any.
    pub fn position(&self) -> Option<usize> {
        match &self.kind {
            QueryErrorKind::Lex { position, .. } => Some(*position),
            QueryErrorKind::Syntax { position, .. }
            | QueryErrorKind::FieldValidation { position, .. } => *position,
            _ => None,
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            QueryErrorKind::Lex { message, .. } if message.contains("unclosed quote") => {
                Some("Add a closing quote (\") to complete the phrase")
            }
            QueryErrorKind::Lex { message, .. } if message.contains("after '^'") => {
                Some("A boost needs a number, e.g., 'rust^2.5'")
            }
            QueryErrorKind::Syntax { message, .. }
                if message.starts_with("expected closing parenthesis") =>
            {
                Some("Add a closing parenthesis ) to match the opening one")
            }
            QueryErrorKind::Syntax { message, .. }
                if message.starts_with("unexpected AND") || message.starts_with("unexpected OR") =>
            {
                Some("AND/OR require expressions on both sides, e.g., 'rust OR golang'")
            }
            QueryErrorKind::Syntax { message, .. }
                if message.contains("not allowed as first character") =>
            {
                Some("Leading wildcards are disabled; enable allow_leading_wildcard to use them")
            }
            QueryErrorKind::FieldValidation { .. } => {
                Some("Use one of the configured field names or aliases")
            }
            QueryErrorKind::TooManyClauses { .. } => {
                Some("Simplify the query or raise max_clause_count")
            }
            QueryErrorKind::ReferenceCycle { .. } => {
                Some("A query cannot refer to itself, directly or through other references")
            }
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match &self.kind {
            QueryErrorKind::Lex { .. } | QueryErrorKind::Syntax { .. } => "query syntax error",
            QueryErrorKind::ReferenceCycle { .. } | QueryErrorKind::ReferenceDepth { .. } => {
                "reference error"
            }
            _ => "query error",
        };

        writeln!(f, "{}: {}", prefix, self.message())?;

        if let Some(query) = &self.query {
            writeln!(f, "  {query}")?;
            if let Some(pos) = self.position() {
                let clamped = pos.min(query.len());
                let width = query
                    .get(..clamped)
                    .map_or(clamped, |prefix| prefix.chars().count());
                writeln!(f, "  {}^", " ".repeat(width))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "hint: {suggestion}")?;
        }

        Ok(())
    }
}

impl Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: err.message,
                position: err.position,
                line: err.line,
                column: err.column,
                text: err.text,
            },
            query: Some(err.input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = QueryError::from(LexError::new(
            "unclosed quote",
            0,
            (1, 1),
            "\"hello world",
            "\"hello world",
        ));
        let display = err.to_string();
        assert!(display.contains("unclosed quote"));
        assert!(display.contains("\"hello world"));
        assert!(display.contains("^"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn lex_error_reports_line_and_column() {
        let err = LexError::new("unexpected character", 7, (2, 3), "/", "a\nb /");
        assert_eq!(err.to_string(), "unexpected character at line 2, column 3 (near \"/\")");
    }

    #[test]
    fn syntax_error_display() {
        let err = QueryError::syntax("expected closing parenthesis", Some(5)).with_query("(rust");
        let display = err.to_string();
        assert!(display.contains("expected closing parenthesis"));
        assert!(display.contains("(rust"));
        assert!(display.contains("     ^"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn caret_counts_characters_not_bytes() {
        let err = QueryError::syntax("unexpected ':'", Some(6)).with_query("名称:");
        let display = err.to_string();
        assert!(display.contains("\n    ^\n"), "{display}");
    }

    #[test]
    fn with_query_keeps_existing_query() {
        let err = QueryError::syntax("bad", None)
            .with_query("inner")
            .with_query("outer");
        assert_eq!(err.query.as_deref(), Some("inner"));
    }

    #[test]
    fn or_error_suggestion() {
        let err = QueryError::syntax("unexpected OR", None);
        assert!(err.suggestion().unwrap().contains("AND/OR require"));
    }

    #[test]
    fn field_validation_message() {
        let err = QueryError::field_validation("ti", "名称", Some(0));
        assert_eq!(err.message(), "unknown field: 名称 (resolved to ti)");
        let err = QueryError::field_validation("foo", "foo", None);
        assert_eq!(err.message(), "unknown field: foo");
        assert!(err.to_string().contains("hint:"));
    }

    #[test]
    fn too_many_clauses_message() {
        let err = QueryError::too_many_clauses(2, 3);
        assert!(err.message().contains("3 exceeds the limit of 2"));
    }

    #[test]
    fn reference_errors_use_reference_prefix() {
        let err = QueryError::new(QueryErrorKind::ReferenceCycle {
            marker: "#1".into(),
        });
        assert!(err.to_string().starts_with("reference error: reference cycle through #1"));
    }
}
