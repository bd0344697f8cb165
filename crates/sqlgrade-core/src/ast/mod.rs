//! Abstract Syntax Tree (AST) types for the queries the analyzer inspects.
//!
//! The tree is a closed set of node kinds lowered from the external parser's
//! output (see [`crate::parser`]). Identifiers are lower case.

mod expression;
mod statement;

pub use expression::{BinaryOp, Expr, FunctionCall, UnaryOp};
pub use statement::{
    Cte, JoinClause, JoinType, Query, QueryBody, SelectColumn, SelectStatement, Statement,
    TableRef,
};
