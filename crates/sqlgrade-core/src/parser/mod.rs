//! SQL parsing.
//!
//! Query text is parsed with `sqlparser` using the SQLite dialect, then
//! lowered into the closed AST of [`crate::ast`]. Only the shapes the
//! analyzer inspects are kept; forms it does not model keep their operands
//! in a `Compound` node, and the rest become `Other`.

mod error;
mod lower;

pub use error::ParseError;

use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use crate::ast::Statement;

/// Parses every statement in `sql`.
///
/// # Errors
///
/// Returns an error if the text is not valid SQL for the SQLite dialect.
pub fn parse_statements(sql: &str) -> Result<Vec<Statement>, ParseError> {
    let parsed = Parser::parse_sql(&SQLiteDialect {}, sql)?;
    debug!(statements = parsed.len(), "parsed query text");
    Ok(parsed.iter().map(lower::statement).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Expr, JoinType, QueryBody, SelectStatement, TableRef};

    fn select(sql: &str) -> SelectStatement {
        let statements = parse_statements(sql).unwrap();
        assert_eq!(statements.len(), 1);
        let Statement::Query(query) = &statements[0] else {
            panic!("expected a query");
        };
        let QueryBody::Select(select) = &query.body else {
            panic!("expected a SELECT body");
        };
        (**select).clone()
    }

    #[test]
    fn test_comma_separated_from_list() {
        let stmt = select("SELECT * FROM Student s, Enrollment");
        assert_eq!(
            stmt.from,
            vec![
                TableRef::table("student").alias("s"),
                TableRef::table("enrollment"),
            ]
        );
        assert_eq!(stmt.columns[0].expr, Expr::Wildcard { table: None });
    }

    #[test]
    fn test_identifiers_are_lower_cased() {
        let stmt = select("SELECT S.Name FROM Student AS S WHERE S.ID = 1");
        assert_eq!(stmt.columns[0].expr, Expr::qualified_column("s", "name"));
        let Some(Expr::Binary { left, op, .. }) = stmt.where_clause else {
            panic!("expected a comparison");
        };
        assert_eq!(op, BinaryOp::Eq);
        assert_eq!(left.as_column(), Some((Some("s"), "id")));
    }

    #[test]
    fn test_join_operators() {
        let stmt = select(
            "SELECT * FROM a JOIN b ON a.id = b.a_id \
             INNER JOIN c USING (id) LEFT OUTER JOIN d ON d.x = c.x \
             RIGHT JOIN e ON 1 = 1 NATURAL FULL JOIN f",
        );
        let joins = stmt.joins();
        let kinds: Vec<JoinType> = joins.iter().map(|j| j.join_type).collect();
        assert_eq!(
            kinds,
            vec![
                JoinType::Join,
                JoinType::Inner,
                JoinType::Left,
                JoinType::Right,
                JoinType::Full,
            ]
        );
        assert_eq!(joins[1].using, vec![String::from("id")]);
        assert!(joins[4].natural);
        assert!(joins[0].on.is_some());
    }

    #[test]
    fn test_group_by_distinct_and_aggregates() {
        let stmt = select("SELECT DISTINCT name, COUNT(DISTINCT course) FROM t GROUP BY name");
        assert!(stmt.distinct);
        assert_eq!(stmt.group_by, vec![Expr::column("name")]);
        let Expr::Function(call) = &stmt.columns[1].expr else {
            panic!("expected a function call");
        };
        assert_eq!(call.name, "count");
        assert!(call.distinct);
        assert!(call.is_aggregate());
    }

    #[test]
    fn test_subqueries_and_ctes() {
        let statements = parse_statements(
            "WITH t AS (SELECT id FROM a) \
             SELECT * FROM t WHERE id IN (SELECT a_id FROM b) \
             UNION SELECT * FROM (SELECT id FROM c) AS d",
        )
        .unwrap();
        let Statement::Query(query) = &statements[0] else {
            panic!("expected a query");
        };
        assert_eq!(query.ctes.len(), 1);
        assert_eq!(query.ctes[0].name, "t");
        let QueryBody::SetOperation { left, right } = &query.body else {
            panic!("expected a set operation");
        };
        let (QueryBody::Select(left), QueryBody::Select(right)) = (&**left, &**right) else {
            panic!("expected two SELECT blocks");
        };
        assert_eq!(left.subqueries().len(), 1);
        assert!(matches!(
            &right.from[0],
            TableRef::Subquery { alias: Some(alias), .. } if alias == "d"
        ));
    }

    #[test]
    fn test_case_cast_and_like_keep_operands() {
        let stmt = select(
            "SELECT CASE WHEN EXISTS (SELECT 1 FROM a) THEN 1 ELSE 0 END, \
             CAST(grade AS TEXT) FROM t WHERE name NOT LIKE 'A%'",
        );
        let Expr::Case { branches, else_result, .. } = &stmt.columns[0].expr else {
            panic!("expected a CASE expression");
        };
        assert_eq!(branches.len(), 1);
        assert!(else_result.is_some());
        assert_eq!(stmt.columns[0].expr.subqueries().len(), 1);
        assert_eq!(
            stmt.columns[1].expr,
            Expr::Cast(Box::new(Expr::column("grade")))
        );
        assert!(matches!(
            stmt.where_clause,
            Some(Expr::Like { negated: true, .. })
        ));
    }

    #[test]
    fn test_other_statements_keep_their_keyword() {
        let statements = parse_statements("DELETE FROM student; SELECT 1").unwrap();
        assert_eq!(
            statements[0],
            Statement::Other {
                kind: String::from("DELETE")
            }
        );
        assert!(matches!(statements[1], Statement::Query(_)));
    }

    #[test]
    fn test_invalid_sql_is_an_error() {
        let err = parse_statements("SELEC name FROM").unwrap_err();
        assert!(!err.message.is_empty());
    }
}
