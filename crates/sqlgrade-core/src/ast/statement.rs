//! SQL statement AST types.

use super::expression::Expr;

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// Bare JOIN.
    Join,
    /// INNER JOIN.
    Inner,
    /// LEFT [OUTER] JOIN.
    Left,
    /// RIGHT [OUTER] JOIN.
    Right,
    /// FULL [OUTER] JOIN.
    Full,
    /// CROSS JOIN.
    Cross,
    /// Dialect-specific join forms (APPLY, ASOF, ...).
    Other,
}

impl JoinType {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "JOIN",
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Other => "JOIN",
        }
    }

    /// Returns `true` for LEFT, RIGHT and FULL joins.
    #[must_use]
    pub const fn is_outer(&self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Full)
    }

    /// Returns `true` for the explicit inner join keywords.
    #[must_use]
    pub const fn is_explicit_inner(&self) -> bool {
        matches!(self, Self::Join | Self::Inner)
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// The type of join.
    pub join_type: JoinType,
    /// The table to join.
    pub table: TableRef,
    /// The join condition.
    pub on: Option<Expr>,
    /// USING columns (alternative to ON).
    pub using: Vec<String>,
    /// NATURAL join.
    pub natural: bool,
}

/// A table reference in a FROM list.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// A simple table name.
    Table {
        /// Table name.
        name: String,
        /// Alias.
        alias: Option<String>,
    },
    /// A derived table.
    Subquery {
        /// The subquery.
        query: Box<Query>,
        /// Alias.
        alias: Option<String>,
    },
    /// A joined table.
    Join {
        /// Left side of the join.
        left: Box<TableRef>,
        /// The join clause.
        join: Box<JoinClause>,
    },
    /// A table-valued function or other source the analyzer ignores.
    Other,
}

impl TableRef {
    /// Creates a simple table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            name: name.into(),
            alias: None,
        }
    }

    /// Adds an alias to this table reference.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        match self {
            Self::Table { name, .. } => Self::Table {
                name,
                alias: Some(alias.into()),
            },
            Self::Subquery { query, .. } => Self::Subquery {
                query,
                alias: Some(alias.into()),
            },
            other => other,
        }
    }

    /// Joins `table` onto this reference.
    #[must_use]
    pub fn join(self, join_type: JoinType, table: Self, on: Option<Expr>) -> Self {
        Self::Join {
            left: Box::new(self),
            join: Box::new(JoinClause {
                join_type,
                table,
                on,
                using: Vec::new(),
                natural: false,
            }),
        }
    }

    /// Name used in messages: the table name, else the alias.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Table { name, .. } => name.clone(),
            Self::Subquery { alias, .. } => alias
                .clone()
                .unwrap_or_else(|| String::from("(subquery)")),
            Self::Join { left, .. } => left.label(),
            Self::Other => String::from("(table)"),
        }
    }

    /// Every JOIN clause in this reference, leftmost first.
    #[must_use]
    pub fn joins(&self) -> Vec<&JoinClause> {
        match self {
            Self::Join { left, join } => {
                let mut joins = left.joins();
                joins.extend(join.table.joins());
                joins.push(join.as_ref());
                joins
            }
            Self::Table { .. } | Self::Subquery { .. } | Self::Other => Vec::new(),
        }
    }
}

/// A column in SELECT clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    /// The expression.
    pub expr: Expr,
    /// Column alias.
    pub alias: Option<String>,
}

impl SelectColumn {
    /// Creates a new select column.
    #[must_use]
    pub const fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    /// Creates a select column with an alias.
    #[must_use]
    pub fn with_alias(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

/// A SELECT block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    /// Whether DISTINCT was specified.
    pub distinct: bool,
    /// The columns to select.
    pub columns: Vec<SelectColumn>,
    /// The comma-separated FROM list.
    pub from: Vec<TableRef>,
    /// The WHERE clause.
    pub where_clause: Option<Expr>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// HAVING clause.
    pub having: Option<Expr>,
}

impl SelectStatement {
    /// Every JOIN clause in the FROM list.
    #[must_use]
    pub fn joins(&self) -> Vec<&JoinClause> {
        self.from.iter().flat_map(TableRef::joins).collect()
    }

    /// Every expression of this block that may hold a subquery.
    #[must_use]
    pub fn expressions(&self) -> Vec<&Expr> {
        let mut exprs: Vec<&Expr> = self.columns.iter().map(|c| &c.expr).collect();
        exprs.extend(self.joins().into_iter().filter_map(|j| j.on.as_ref()));
        exprs.extend(self.where_clause.as_ref());
        exprs.extend(&self.group_by);
        exprs.extend(self.having.as_ref());
        exprs
    }

    /// Queries nested directly in this block: derived tables and expression
    /// subqueries.
    #[must_use]
    pub fn subqueries(&self) -> Vec<&Query> {
        let mut queries = Vec::new();
        for table in &self.from {
            collect_derived(table, &mut queries);
        }
        for expr in self.expressions() {
            queries.extend(expr.subqueries());
        }
        queries
    }
}

fn collect_derived<'a>(table: &'a TableRef, out: &mut Vec<&'a Query>) {
    match table {
        TableRef::Subquery { query, .. } => out.push(query.as_ref()),
        TableRef::Join { left, join } => {
            collect_derived(left, out);
            collect_derived(&join.table, out);
        }
        TableRef::Table { .. } | TableRef::Other => {}
    }
}

/// A common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    /// The CTE name.
    pub name: String,
    /// Its query.
    pub query: Query,
}

/// The body of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryBody {
    /// A SELECT block.
    Select(Box<SelectStatement>),
    /// UNION / INTERSECT / EXCEPT.
    SetOperation {
        /// Left operand.
        left: Box<QueryBody>,
        /// Right operand.
        right: Box<QueryBody>,
    },
    /// A parenthesized query.
    Nested(Box<Query>),
    /// VALUES and other bodies without a FROM list.
    Other,
}

/// A query: optional CTEs and a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// WITH clause entries.
    pub ctes: Vec<Cte>,
    /// The body.
    pub body: QueryBody,
}

impl Query {
    /// Wraps a single SELECT block.
    #[must_use]
    pub fn select(select: SelectStatement) -> Self {
        Self {
            ctes: Vec::new(),
            body: QueryBody::Select(Box::new(select)),
        }
    }
}

/// A SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A query.
    Query(Box<Query>),
    /// Any other statement, by its leading keyword.
    Other {
        /// The statement keyword, e.g. `INSERT`.
        kind: String,
    },
}
