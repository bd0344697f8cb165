//! Declared relationships the query does not join on.

use crate::analyzer::issue::{Issue, IssueKind};
use crate::analyzer::scope::{JoinEdge, Relation};
use crate::analyzer::walk::{Rule, SelectContext};
use crate::ast::BinaryOp;
use crate::schema::JoinCondition;

/// Warns when two tables of a FROM list have a declared join condition that
/// neither WHERE nor ON states. One issue per table pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncompleteJoin;

impl Rule for IncompleteJoin {
    fn kind(&self) -> IssueKind {
        IssueKind::IncompleteJoin
    }

    fn check(&self, ctx: SelectContext<'_>) -> Vec<Issue> {
        let relations = ctx.scope.relations();
        if relations.len() < 2 {
            return Vec::new();
        }

        let edges: Vec<JoinEdge> = ctx
            .scope
            .join_edges(ctx.select)
            .into_iter()
            .filter(|edge| edge.op == BinaryOp::Eq)
            .collect();

        let mut reported: Vec<(&str, &str)> = Vec::new();
        let mut issues = Vec::new();
        for condition in ctx.scope.schema().join_conditions() {
            if !both_present(relations, condition) || is_stated(&edges, condition) {
                continue;
            }
            let pair = unordered(&condition.table1, &condition.table2);
            if reported.contains(&pair) {
                continue;
            }
            reported.push(pair);
            issues.push(Issue::incomplete_join(condition));
        }
        issues
    }
}

fn unordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn both_present(relations: &[Relation], condition: &JoinCondition) -> bool {
    let count = |table: &str| {
        relations
            .iter()
            .filter(|r| r.table.as_deref() == Some(table))
            .count()
    };
    if condition.is_self_reference() {
        count(&condition.table1) >= 2
    } else {
        count(&condition.table1) > 0 && count(&condition.table2) > 0
    }
}

fn is_stated(edges: &[JoinEdge], condition: &JoinCondition) -> bool {
    edges.iter().any(|edge| {
        let (Some(l), Some(r)) = (edge.left.local(), edge.right.local()) else {
            return false;
        };
        let (Some(left_table), Some(right_table)) =
            (edge.left.table.as_deref(), edge.right.table.as_deref())
        else {
            return false;
        };
        l != r
            && condition.is_stated_by(
                (left_table, &edge.left.column),
                (right_table, &edge.right.column),
            )
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::run;
    use super::*;

    #[test]
    fn test_missing_where_condition() {
        let issues = run(&IncompleteJoin, "SELECT * FROM student, enrollment");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].tables(), vec!["enrollment", "student"]);
    }

    #[test]
    fn test_condition_in_where_either_order() {
        assert!(run(
            &IncompleteJoin,
            "SELECT * FROM student s, enrollment e WHERE e.student_id = s.id"
        )
        .is_empty());
        assert!(run(
            &IncompleteJoin,
            "SELECT * FROM student, enrollment WHERE id = student_id AND grade > 3"
        )
        .is_empty());
    }

    #[test]
    fn test_condition_in_on_clause() {
        assert!(run(
            &IncompleteJoin,
            "SELECT * FROM student s JOIN enrollment e ON s.id = e.student_id"
        )
        .is_empty());
    }

    #[test]
    fn test_wrong_columns_do_not_count() {
        let issues = run(
            &IncompleteJoin,
            "SELECT * FROM student s, enrollment e WHERE s.id = e.grade",
        );
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_one_issue_per_pair() {
        let issues = run(
            &IncompleteJoin,
            "SELECT * FROM student, enrollment, course WHERE student.id = enrollment.student_id",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].tables(), vec!["enrollment", "course"]);
    }

    #[test]
    fn test_single_table_never_reports() {
        assert!(run(&IncompleteJoin, "SELECT * FROM enrollment").is_empty());
    }

    #[test]
    fn test_applies_inside_subqueries() {
        let issues = run(
            &IncompleteJoin,
            "SELECT name FROM student WHERE id IN \
             (SELECT e.student_id FROM enrollment e, course c WHERE c.title = 'SQL')",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].tables(), vec!["enrollment", "course"]);
    }
}
