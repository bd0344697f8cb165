//! Grading a submitted query against a reference query.

use serde::Serialize;
use sqlgrade_core::{is_equivalent, Analyzer, AnalyzerOptions, Issue, SchemaInfo, Severity};
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use crate::error::Result;
use crate::execute::fetch_result_set;
use crate::introspect::introspect;

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the submission returns the same data as the reference query.
    pub equivalent: bool,
    /// Static analysis findings on the submission, errors first.
    pub issues: Vec<Issue>,
}

impl Verdict {
    /// Returns `true` if any issue has [`Severity::Error`].
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }

    /// Equivalent and free of errors. Warnings do not fail a submission.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.equivalent && !self.has_errors()
    }
}

/// Grades submissions against one exercise database.
#[derive(Debug, Clone)]
pub struct Grader {
    pool: SqlitePool,
    analyzer: Analyzer,
}

impl Grader {
    /// Introspects the database behind `pool` and builds an analyzer over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be read.
    pub async fn new(pool: SqlitePool, options: AnalyzerOptions) -> Result<Self> {
        let schema = introspect(&pool).await?;
        Ok(Self::with_schema(pool, schema, options))
    }

    /// Uses an explicit schema instead of introspecting one.
    #[must_use]
    pub const fn with_schema(pool: SqlitePool, schema: SchemaInfo, options: AnalyzerOptions) -> Self {
        Self {
            pool,
            analyzer: Analyzer::with_options(schema, options),
        }
    }

    /// Returns the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the analyzer.
    #[must_use]
    pub const fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Runs both queries, compares their results and analyzes `candidate_sql`.
    ///
    /// # Errors
    ///
    /// Returns an error if either query fails to run.
    pub async fn grade(&self, expected_sql: &str, candidate_sql: &str) -> Result<Verdict> {
        let issues = self.analyzer.analyze(candidate_sql);
        let equivalent = self.compare(expected_sql, candidate_sql).await?;
        info!(
            equivalent,
            issues = issues.len(),
            "Graded submission"
        );
        Ok(Verdict { equivalent, issues })
    }

    /// Runs both queries and compares their results.
    ///
    /// # Errors
    ///
    /// Returns an error if either query fails to run.
    pub async fn compare(&self, expected_sql: &str, candidate_sql: &str) -> Result<bool> {
        let expected = fetch_result_set(&self.pool, expected_sql).await?;
        let actual = fetch_result_set(&self.pool, candidate_sql).await?;
        let equivalent = is_equivalent(&expected, &actual);
        debug!(
            expected_rows = expected.row_count(),
            actual_rows = actual.row_count(),
            equivalent,
            "Compared result sets"
        );
        Ok(equivalent)
    }

    /// Analyzes `sql` without running it.
    ///
    /// # Errors
    ///
    /// Returns an error if `sql` does not parse or is not a query.
    pub fn check(&self, sql: &str) -> Result<Vec<Issue>> {
        Ok(self.analyzer.try_analyze(sql)?)
    }
}
