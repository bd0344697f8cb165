//! Error types for the analyzer.

use thiserror::Error;

use crate::parser::ParseError;

/// Analyzer errors.
///
/// Only [`Analyzer::try_analyze`](crate::Analyzer::try_analyze) returns
/// these; [`Analyzer::analyze`](crate::Analyzer::analyze) turns them into
/// issues.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The query text could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A statement the analyzer cannot inspect.
    #[error("unsupported statement: {0}")]
    Unsupported(String),

    /// A rule failed while walking the query.
    #[error("internal analyzer error: {0}")]
    Internal(String),
}

/// Result type alias for analyzer operations.
pub type Result<T> = std::result::Result<T, AnalyzeError>;
