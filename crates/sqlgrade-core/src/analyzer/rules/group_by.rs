//! Selected columns that GROUP BY does not cover.

use crate::analyzer::issue::{Issue, IssueKind};
use crate::analyzer::scope::Scope;
use crate::analyzer::walk::{Rule, SelectContext};
use crate::ast::{Expr, SelectColumn};

/// Warns when a column of the select list is not a GROUP BY key.
///
/// A select item is covered outright when a key repeats it, names its alias
/// or gives its 1-based position. Otherwise every column it reads outside
/// an aggregate call must itself be a key. Columns of nested subqueries are
/// left to the subquery's own block.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncompleteGroupBy;

impl Rule for IncompleteGroupBy {
    fn kind(&self) -> IssueKind {
        IssueKind::IncompleteGroupBy
    }

    fn check(&self, ctx: SelectContext<'_>) -> Vec<Issue> {
        let keys = &ctx.select.group_by;
        if keys.is_empty() {
            return Vec::new();
        }

        let mut missing: Vec<String> = Vec::new();
        for (position, column) in ctx.select.columns.iter().enumerate() {
            if keys.iter().any(|key| is_item_key(key, position, column)) {
                continue;
            }
            let mut read = Vec::new();
            bare_columns(&column.expr, &mut read);
            for expr in read {
                let Some((_, name)) = expr.as_column() else {
                    continue;
                };
                let covered = keys.iter().any(|key| covers(ctx.scope, key, expr));
                if !covered && !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
            }
        }

        if missing.is_empty() {
            Vec::new()
        } else {
            vec![Issue::incomplete_group_by(missing)]
        }
    }
}

fn is_item_key(key: &Expr, position: usize, column: &SelectColumn) -> bool {
    match key.unparen() {
        Expr::Literal(text) => text.parse::<usize>().is_ok_and(|n| n == position + 1),
        Expr::Column { table: None, name } if column.alias.as_deref() == Some(name.as_str()) => {
            true
        }
        other => other == column.expr.unparen(),
    }
}

/// Column references of `expr` outside aggregate calls.
fn bare_columns<'e>(expr: &'e Expr, out: &mut Vec<&'e Expr>) {
    match expr {
        Expr::Column { .. } => out.push(expr),
        Expr::Function(call) if call.is_aggregate() => {}
        _ => {
            for child in expr.children() {
                bare_columns(child, out);
            }
        }
    }
}

fn covers(scope: &Scope<'_>, key: &Expr, column: &Expr) -> bool {
    let (Some((key_qualifier, key_name)), Some((qualifier, name))) =
        (key.as_column(), column.as_column())
    else {
        return false;
    };
    match (scope.resolve(qualifier, name), scope.resolve(key_qualifier, key_name)) {
        (Some(selected), Some(grouped)) => selected == grouped,
        _ => {
            name == key_name
                && (qualifier.is_none() || key_qualifier.is_none() || qualifier == key_qualifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::run;
    use super::*;

    const JOINED: &str = "FROM student, enrollment WHERE student.id = enrollment.student_id";

    #[test]
    fn test_complete_group_by() {
        let sql = format!("SELECT name, COUNT(*) {JOINED} GROUP BY name");
        assert!(run(&IncompleteGroupBy, &sql).is_empty());
    }

    #[test]
    fn test_missing_column_is_listed() {
        let sql = format!("SELECT name, enrollment.course_code, COUNT(*) {JOINED} GROUP BY name");
        let issues = run(&IncompleteGroupBy, &sql);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].columns(), vec!["course_code"]);
    }

    #[test]
    fn test_qualified_and_unqualified_forms_match() {
        let sql = format!("SELECT student.name, COUNT(*) {JOINED} GROUP BY name");
        assert!(run(&IncompleteGroupBy, &sql).is_empty());
    }

    #[test]
    fn test_ordinal_and_alias_keys() {
        let by_position = format!("SELECT grade, COUNT(*) {JOINED} GROUP BY 1");
        assert!(run(&IncompleteGroupBy, &by_position).is_empty());
        let by_alias = format!("SELECT grade AS g, COUNT(*) {JOINED} GROUP BY g");
        assert!(run(&IncompleteGroupBy, &by_alias).is_empty());
    }

    #[test]
    fn test_aggregates_are_not_checked() {
        let sql = format!("SELECT name, MAX(grade), COUNT(DISTINCT course_code) {JOINED} GROUP BY name");
        assert!(run(&IncompleteGroupBy, &sql).is_empty());
    }

    #[test]
    fn test_columns_inside_scalar_expressions_are_checked() {
        let sql = format!("SELECT name || grade, UPPER(name), COUNT(*) {JOINED} GROUP BY name");
        let issues = run(&IncompleteGroupBy, &sql);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].columns(), vec!["grade"]);
    }

    #[test]
    fn test_repeated_expression_is_a_key() {
        let sql = format!("SELECT UPPER(name), COUNT(*) {JOINED} GROUP BY UPPER(name)");
        assert!(run(&IncompleteGroupBy, &sql).is_empty());
    }

    #[test]
    fn test_without_group_by_nothing_is_checked() {
        assert!(run(&IncompleteGroupBy, "SELECT name, grade FROM student, enrollment").is_empty());
    }
}
