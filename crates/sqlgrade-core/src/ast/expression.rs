//! Expression AST types.

use super::statement::Query;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Concat,

    /// Any operator the analyzer has no rule for.
    Other,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "||",
            Self::Other => "?",
        }
    }

    /// Returns `true` for `=`, `!=`, `<`, `<=`, `>` and `>=`.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical NOT
    Not,
    /// Anything else (+, ~, ...).
    Other,
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The function name, lower case.
    pub name: String,
    /// The arguments.
    pub args: Vec<Expr>,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
}

impl FunctionCall {
    /// Returns `true` for the aggregate functions SQLite knows.
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self.name.as_str(),
            "count" | "sum" | "avg" | "min" | "max" | "total" | "group_concat" | "string_agg"
        )
    }
}

/// An SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal, kept as written.
    Literal(String),

    /// A column reference (optionally qualified with table name or alias).
    Column {
        /// Table name or alias (optional).
        table: Option<String>,
        /// Column name.
        name: String,
    },

    /// A binary expression.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },

    /// A unary expression.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },

    /// A function call.
    Function(FunctionCall),

    /// A scalar subquery.
    Subquery(Box<Query>),

    /// EXISTS (subquery).
    Exists {
        /// The subquery.
        query: Box<Query>,
        /// Whether this is NOT EXISTS.
        negated: bool,
    },

    /// expr IN (subquery).
    InSubquery {
        /// The expression to check.
        expr: Box<Expr>,
        /// The subquery.
        query: Box<Query>,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// expr IN (list).
    InList {
        /// The expression to check.
        expr: Box<Expr>,
        /// The list of values.
        list: Vec<Expr>,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// BETWEEN expression.
    Between {
        /// The expression to check.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
        /// Whether this is NOT BETWEEN.
        negated: bool,
    },

    /// IS NULL expression.
    IsNull {
        /// The expression to check.
        expr: Box<Expr>,
        /// Whether this is IS NOT NULL.
        negated: bool,
    },

    /// Parenthesized expression.
    Paren(Box<Expr>),

    /// CASE expression.
    Case {
        /// The operand of a simple CASE.
        operand: Option<Box<Expr>>,
        /// WHEN / THEN pairs.
        branches: Vec<(Expr, Expr)>,
        /// ELSE result.
        else_result: Option<Box<Expr>>,
    },

    /// CAST(expr AS type).
    Cast(Box<Expr>),

    /// LIKE, ILIKE and similar pattern matches.
    Like {
        /// The expression to match.
        expr: Box<Expr>,
        /// The pattern.
        pattern: Box<Expr>,
        /// Whether this is NOT LIKE.
        negated: bool,
    },

    /// Any other form, kept only as its operands (`IS DISTINCT FROM`,
    /// `COLLATE`, row values, ...).
    Compound(Vec<Expr>),

    /// Wildcard (*) in SELECT or in COUNT(*).
    Wildcard {
        /// Table qualifier (optional).
        table: Option<String>,
    },

    /// An expression form the analyzer does not look into.
    Other,
}

impl Expr {
    /// Creates a new column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            table: None,
            name: name.into(),
        }
    }

    /// Creates a new qualified column reference.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Creates a binary expression.
    #[must_use]
    pub fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.binary(BinaryOp::Eq, right)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    /// Strips any number of enclosing parentheses.
    #[must_use]
    pub fn unparen(&self) -> &Self {
        let mut expr = self;
        while let Self::Paren(inner) = expr {
            expr = inner.as_ref();
        }
        expr
    }

    /// Returns `(qualifier, column)` if this is a plain column reference.
    #[must_use]
    pub fn as_column(&self) -> Option<(Option<&str>, &str)> {
        match self.unparen() {
            Self::Column { table, name } => Some((table.as_deref(), name.as_str())),
            _ => None,
        }
    }

    /// Splits a chain of ANDs into its operands.
    #[must_use]
    pub fn conjuncts(&self) -> Vec<&Self> {
        match self.unparen() {
            Self::Binary {
                left,
                op: BinaryOp::And,
                right,
            } => {
                let mut parts = left.conjuncts();
                parts.extend(right.conjuncts());
                parts
            }
            other => vec![other],
        }
    }

    /// Direct sub-expressions, not descending into subqueries.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Self::Unary { operand, .. } => vec![operand.as_ref()],
            Self::Function(call) => call.args.iter().collect(),
            Self::InSubquery { expr, .. }
            | Self::IsNull { expr, .. }
            | Self::Paren(expr)
            | Self::Cast(expr) => vec![expr.as_ref()],
            Self::Like { expr, pattern, .. } => vec![expr.as_ref(), pattern.as_ref()],
            Self::Case {
                operand,
                branches,
                else_result,
            } => {
                let mut children: Vec<&Self> = operand.iter().map(AsRef::as_ref).collect();
                for (condition, result) in branches {
                    children.push(condition);
                    children.push(result);
                }
                children.extend(else_result.iter().map(AsRef::as_ref));
                children
            }
            Self::Compound(parts) => parts.iter().collect(),
            Self::InList { expr, list, .. } => {
                let mut children = vec![expr.as_ref()];
                children.extend(list);
                children
            }
            Self::Between {
                expr, low, high, ..
            } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
            Self::Literal(_)
            | Self::Column { .. }
            | Self::Subquery(_)
            | Self::Exists { .. }
            | Self::Wildcard { .. }
            | Self::Other => Vec::new(),
        }
    }

    /// Queries nested anywhere inside this expression (outermost only).
    #[must_use]
    pub fn subqueries(&self) -> Vec<&Query> {
        let mut found = Vec::new();
        self.collect_subqueries(&mut found);
        found
    }

    fn collect_subqueries<'a>(&'a self, found: &mut Vec<&'a Query>) {
        match self {
            Self::Subquery(query)
            | Self::Exists { query, .. }
            | Self::InSubquery { query, .. } => found.push(query.as_ref()),
            _ => {}
        }
        for child in self.children() {
            child.collect_subqueries(found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conjuncts_flatten_and_chains() {
        let expr = Expr::column("a")
            .eq(Expr::column("b"))
            .and(Expr::Paren(Box::new(
                Expr::column("c").is_null().and(Expr::column("d").is_not_null()),
            )));
        assert_eq!(expr.conjuncts().len(), 3);
    }

    #[test]
    fn test_or_is_one_conjunct() {
        let expr = Expr::column("a")
            .eq(Expr::column("b"))
            .binary(BinaryOp::Or, Expr::column("c").is_null());
        assert_eq!(expr.conjuncts().len(), 1);
    }

    #[test]
    fn test_as_column_sees_through_parens() {
        let expr = Expr::Paren(Box::new(Expr::qualified_column("s", "id")));
        assert_eq!(expr.as_column(), Some((Some("s"), "id")));
        assert_eq!(Expr::Other.as_column(), None);
    }

    #[test]
    fn test_case_children_reach_subqueries() {
        let inner = Query::select(crate::ast::SelectStatement::default());
        let expr = Expr::Case {
            operand: None,
            branches: vec![(
                Expr::Exists {
                    query: Box::new(inner),
                    negated: false,
                },
                Expr::Literal("1".into()),
            )],
            else_result: Some(Box::new(Expr::Cast(Box::new(Expr::column("x"))))),
        };
        assert_eq!(expr.children().len(), 3);
        assert_eq!(expr.subqueries().len(), 1);
    }

    #[test]
    fn test_aggregate_names() {
        let count = FunctionCall {
            name: "count".into(),
            args: vec![Expr::Wildcard { table: None }],
            distinct: false,
        };
        assert!(count.is_aggregate());
        let upper = FunctionCall {
            name: "upper".into(),
            args: vec![Expr::column("name")],
            distinct: false,
        };
        assert!(!upper.is_aggregate());
    }
}
