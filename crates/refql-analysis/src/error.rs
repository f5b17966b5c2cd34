//! Error types for the refql-analysis crate.

use thiserror::Error;

/// Errors that can occur when building analyzers.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Invalid stemmer language.
    #[error("unsupported stemmer language: {0}")]
    InvalidLanguage(String),
}
