//! Issues reported by the analyzer.

use std::fmt;

use serde::Serialize;

use crate::schema::JoinCondition;

/// How serious an issue is. Errors sort before warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// The query is wrong or not acceptable.
    Error,
    /// The query is likely wrong or needlessly complicated.
    Warning,
}

impl Severity {
    /// Returns the display name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule that produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Two tables with a declared relationship are not joined on it.
    IncompleteJoin,
    /// The FROM list splits into groups with no join between them.
    DanglingTables,
    /// A selected column is missing from GROUP BY.
    IncompleteGroupBy,
    /// Explicit JOIN syntax where comma joins are required.
    ForbiddenInnerJoin,
    /// DISTINCT together with GROUP BY.
    UselessDistinct,
    /// A NULL filter on the nullable side of an outer join.
    NullFilteredOuterJoin,
    /// The text is not a query the analyzer can inspect.
    UnsupportedQuery,
    /// The analyzer itself failed.
    InternalError,
}

impl IssueKind {
    /// Returns the stable identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IncompleteJoin => "incomplete_join",
            Self::DanglingTables => "dangling_tables",
            Self::IncompleteGroupBy => "incomplete_group_by",
            Self::ForbiddenInnerJoin => "forbidden_inner_join",
            Self::UselessDistinct => "useless_distinct",
            Self::NullFilteredOuterJoin => "null_filtered_outer_join",
            Self::UnsupportedQuery => "unsupported_query",
            Self::InternalError => "internal_error",
        }
    }

    /// The severity issues of this kind carry.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::DanglingTables
            | Self::ForbiddenInnerJoin
            | Self::UnsupportedQuery
            | Self::InternalError => Severity::Error,
            Self::IncompleteJoin
            | Self::IncompleteGroupBy
            | Self::UselessDistinct
            | Self::NullFilteredOuterJoin => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-specific details of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuePayload {
    /// No details.
    None,
    /// The tables involved.
    Tables(Vec<String>),
    /// Groups of tables that are not joined to each other.
    TableGroups(Vec<Vec<String>>),
    /// The columns involved.
    Columns(Vec<String>),
    /// The null-filtered column of an outer join.
    NullFilter {
        /// Table on the nullable side.
        table: String,
        /// Filtered column.
        column: String,
        /// The outer join keyword, e.g. `LEFT JOIN`.
        join: String,
    },
}

/// A structural finding about a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// The rule that produced it.
    pub kind: IssueKind,
    /// Its severity.
    pub severity: Severity,
    /// A message ready for display.
    pub message: String,
    /// Rule-specific details.
    pub payload: IssuePayload,
}

impl Issue {
    /// Creates an issue with the kind's default severity.
    #[must_use]
    pub fn new(kind: IssueKind, message: impl Into<String>, payload: IssuePayload) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            payload,
        }
    }

    /// A declared join condition is not stated by the query.
    #[must_use]
    pub fn incomplete_join(missing: &JoinCondition) -> Self {
        Self::new(
            IssueKind::IncompleteJoin,
            format!(
                "Tables {} and {} are not joined on {}.{} = {}.{}",
                missing.table1,
                missing.table2,
                missing.table1,
                missing.column1,
                missing.table2,
                missing.column2
            ),
            IssuePayload::Tables(vec![missing.table1.clone(), missing.table2.clone()]),
        )
    }

    /// The FROM list splits into unconnected groups.
    #[must_use]
    pub fn dangling_tables(groups: Vec<Vec<String>>) -> Self {
        let listed: Vec<String> = groups
            .iter()
            .map(|group| format!("({})", group.join(", ")))
            .collect();
        Self::new(
            IssueKind::DanglingTables,
            format!(
                "Tables are not all joined to each other: {} form separate groups",
                listed.join(" and ")
            ),
            IssuePayload::TableGroups(groups),
        )
    }

    /// Selected columns missing from GROUP BY.
    #[must_use]
    pub fn incomplete_group_by(columns: Vec<String>) -> Self {
        Self::new(
            IssueKind::IncompleteGroupBy,
            format!(
                "Selected columns missing from GROUP BY: {}",
                columns.join(", ")
            ),
            IssuePayload::Columns(columns),
        )
    }

    /// Explicit JOIN keyword for the given table.
    #[must_use]
    pub fn forbidden_inner_join(keyword: &str, table: String) -> Self {
        Self::new(
            IssueKind::ForbiddenInnerJoin,
            format!(
                "{keyword} {table} is not allowed here: list the tables separated by commas and join them in WHERE"
            ),
            IssuePayload::Tables(vec![table]),
        )
    }

    /// DISTINCT next to GROUP BY.
    #[must_use]
    pub fn useless_distinct() -> Self {
        Self::new(
            IssueKind::UselessDistinct,
            "DISTINCT is redundant: GROUP BY already returns one row per group",
            IssuePayload::None,
        )
    }

    /// A NULL filter that defeats an outer join.
    #[must_use]
    pub fn null_filtered_outer_join(
        keyword: &str,
        table: String,
        column: String,
        in_on_clause: bool,
    ) -> Self {
        let message = if in_on_clause {
            format!(
                "{keyword} never matches: the ON clause requires {table}.{column} IS NULL on its join column"
            )
        } else {
            format!(
                "{keyword} behaves like an inner join: WHERE removes the rows where {table}.{column} is NULL"
            )
        };
        Self::new(
            IssueKind::NullFilteredOuterJoin,
            message,
            IssuePayload::NullFilter {
                table,
                column,
                join: keyword.to_string(),
            },
        )
    }

    /// The text could not be parsed or is not a query.
    #[must_use]
    pub fn unsupported_query() -> Self {
        Self::new(
            IssueKind::UnsupportedQuery,
            "Unsupported query type",
            IssuePayload::None,
        )
    }

    /// The analyzer failed.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(
            IssueKind::InternalError,
            "The query could not be analyzed",
            IssuePayload::None,
        )
    }

    /// Every table named in the payload.
    #[must_use]
    pub fn tables(&self) -> Vec<&str> {
        match &self.payload {
            IssuePayload::Tables(tables) => tables.iter().map(String::as_str).collect(),
            IssuePayload::TableGroups(groups) => {
                groups.iter().flatten().map(String::as_str).collect()
            }
            IssuePayload::NullFilter { table, .. } => vec![table.as_str()],
            IssuePayload::None | IssuePayload::Columns(_) => Vec::new(),
        }
    }

    /// Every column named in the payload.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        match &self.payload {
            IssuePayload::Columns(columns) => columns.iter().map(String::as_str).collect(),
            IssuePayload::NullFilter { column, .. } => vec![column.as_str()],
            IssuePayload::None | IssuePayload::Tables(_) | IssuePayload::TableGroups(_) => {
                Vec::new()
            }
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.kind, self.message)
    }
}

/// Orders errors before warnings, keeping the order within each severity.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by_key(|issue| issue.severity);
}
