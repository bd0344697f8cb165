//! Error types for the SQLite adapter.

/// Errors that can occur while grading against a SQLite database.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    /// Database error while introspecting or running a query.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Only queries are run against the exercise database.
    #[error("Refusing to run a {0} statement; only queries are allowed")]
    NotAQuery(String),

    /// The analyzer rejected the query.
    #[error("Analysis error: {0}")]
    Analyze(#[from] sqlgrade_core::AnalyzeError),
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, GradeError>;
