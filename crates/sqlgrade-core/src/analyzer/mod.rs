//! Static analysis of query structure.
//!
//! The [`Analyzer`] parses a query, walks every SELECT block once per rule
//! and returns the issues found, errors first. Each rule is a separate pass
//! over the whole tree so it can be tested on its own.

mod issue;
mod rules;
mod scope;
mod walk;

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

pub use issue::{sort_issues, Issue, IssueKind, IssuePayload, Severity};
pub use rules::{
    DanglingTables, ForbiddenInnerJoin, IncompleteGroupBy, IncompleteJoin, NullFilteredOuterJoin,
    UselessDistinct,
};
pub use scope::{ColumnSite, JoinEdge, Origin, Relation, Scope};
pub use walk::{Rule, SelectContext};

use crate::ast::{Query, Statement};
use crate::error::{AnalyzeError, Result};
use crate::parser::parse_statements;
use crate::schema::SchemaInfo;

/// Analyzer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Report `JOIN` / `INNER JOIN`; the course expects comma joins.
    pub forbid_explicit_join: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            forbid_explicit_join: true,
        }
    }
}

/// Checks queries against one schema.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    schema: SchemaInfo,
    options: AnalyzerOptions,
}

impl Analyzer {
    /// Creates an analyzer with the default options.
    #[must_use]
    pub fn new(schema: SchemaInfo) -> Self {
        Self::with_options(schema, AnalyzerOptions::default())
    }

    /// Creates an analyzer with explicit options.
    #[must_use]
    pub const fn with_options(schema: SchemaInfo, options: AnalyzerOptions) -> Self {
        Self { schema, options }
    }

    /// The schema queries are checked against.
    #[must_use]
    pub const fn schema(&self) -> &SchemaInfo {
        &self.schema
    }

    /// The active options.
    #[must_use]
    pub const fn options(&self) -> AnalyzerOptions {
        self.options
    }

    /// Analyzes every statement of `sql`.
    ///
    /// Never fails. Text that does not parse, and statements that are not
    /// queries, yield an [`IssueKind::UnsupportedQuery`] error; a failure
    /// inside the analyzer replaces the whole result with a single
    /// [`IssueKind::InternalError`] error.
    #[must_use]
    pub fn analyze(&self, sql: &str) -> Vec<Issue> {
        let statements = match parse_statements(sql) {
            Ok(statements) => statements,
            Err(err) => {
                warn!(%err, "query could not be parsed");
                return vec![Issue::unsupported_query()];
            }
        };

        let mut issues = Vec::new();
        for statement in &statements {
            match self.analyze_statement(statement) {
                Ok(found) => issues.extend(found),
                Err(AnalyzeError::Unsupported(kind)) => {
                    warn!(statement = %kind, "statement is not a query");
                    issues.push(Issue::unsupported_query());
                }
                Err(err) => {
                    error!(%err, "analysis failed");
                    return vec![Issue::internal_error()];
                }
            }
        }
        sort_issues(&mut issues);
        issues
    }

    /// Analyzes every statement of `sql`, reporting failures as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if `sql` does not parse, contains a statement that is
    /// not a query, or a rule fails.
    pub fn try_analyze(&self, sql: &str) -> Result<Vec<Issue>> {
        let statements = parse_statements(sql)?;
        let mut issues = Vec::new();
        for statement in &statements {
            issues.extend(self.analyze_statement(statement)?);
        }
        sort_issues(&mut issues);
        Ok(issues)
    }

    fn analyze_statement(&self, statement: &Statement) -> Result<Vec<Issue>> {
        match statement {
            Statement::Query(query) => self.analyze_query(query),
            Statement::Other { kind } => Err(AnalyzeError::Unsupported(kind.clone())),
        }
    }

    fn analyze_query(&self, query: &Query) -> Result<Vec<Issue>> {
        let root = Scope::root(&self.schema);
        let rules = self.rules();
        let issues = panic::catch_unwind(AssertUnwindSafe(|| {
            rules
                .iter()
                .flat_map(|rule| walk::walk_query(query, &root, *rule))
                .collect::<Vec<_>>()
        }))
        .map_err(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| String::from("unknown panic"));
            error!("caught a panic while analyzing a query: {message}");
            AnalyzeError::Internal(message)
        })?;
        debug!(issues = issues.len(), "query analyzed");
        Ok(issues)
    }

    fn rules(&self) -> Vec<&'static dyn Rule> {
        let mut rules: Vec<&'static dyn Rule> =
            vec![&IncompleteJoin as &dyn Rule, &DanglingTables, &IncompleteGroupBy];
        if self.options.forbid_explicit_join {
            rules.push(&ForbiddenInnerJoin);
        }
        rules.push(&UselessDistinct);
        rules.push(&NullFilteredOuterJoin);
        rules
    }
}
