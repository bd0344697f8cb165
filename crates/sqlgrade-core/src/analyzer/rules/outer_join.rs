//! NULL filters that undo an outer join.

use std::ops::Range;

use crate::analyzer::issue::{Issue, IssueKind};
use crate::analyzer::scope::{join_spans, ColumnSite, JoinSpan, Scope};
use crate::analyzer::walk::{Rule, SelectContext};
use crate::ast::{BinaryOp, Expr, JoinType};

/// Warns about NULL tests on the join columns of an outer join's nullable
/// side.
///
/// `IS NOT NULL` in WHERE drops exactly the rows the outer join added, so
/// the join behaves like an inner join. `IS NULL` in the ON clause can
/// never hold together with the join equality, so the join never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFilteredOuterJoin;

impl Rule for NullFilteredOuterJoin {
    fn kind(&self) -> IssueKind {
        IssueKind::NullFilteredOuterJoin
    }

    fn check(&self, ctx: SelectContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for span in join_spans(ctx.select) {
            let join_type = span.clause.join_type;
            let nullable = nullable_sides(&span, join_type);
            if nullable.is_empty() {
                continue;
            }
            let join_columns = join_columns(ctx.scope, &span, &nullable);
            if join_columns.is_empty() {
                continue;
            }

            let mut report = |filter: &Expr, negated: bool, in_on_clause: bool| {
                for conjunct in filter.conjuncts() {
                    let Some(site) = null_test(ctx.scope, conjunct, negated) else {
                        continue;
                    };
                    if join_columns.contains(&site) {
                        let table = site.table.clone().unwrap_or_default();
                        issues.push(Issue::null_filtered_outer_join(
                            join_type.as_str(),
                            table,
                            site.column,
                            in_on_clause,
                        ));
                    }
                }
            };

            if let Some(filter) = &ctx.select.where_clause {
                report(filter, true, false);
            }
            if let Some(on) = &span.clause.on {
                report(on, false, true);
            }
        }
        issues
    }
}

/// The relations that are NULL-extended by the join.
fn nullable_sides(span: &JoinSpan<'_>, join_type: JoinType) -> Vec<Range<usize>> {
    match join_type {
        JoinType::Left => vec![span.right.clone()],
        JoinType::Right => vec![span.left.clone()],
        JoinType::Full => vec![span.left.clone(), span.right.clone()],
        JoinType::Join | JoinType::Inner | JoinType::Cross | JoinType::Other => Vec::new(),
    }
}

/// Nullable-side columns the join matches on, from ON equalities and USING.
fn join_columns(scope: &Scope<'_>, span: &JoinSpan<'_>, nullable: &[Range<usize>]) -> Vec<ColumnSite> {
    let is_nullable =
        |site: &ColumnSite| site.local().is_some_and(|i| nullable.iter().any(|r| r.contains(&i)));

    let mut columns = Vec::new();
    if let Some(on) = &span.clause.on {
        for conjunct in on.conjuncts() {
            if let Expr::Binary {
                left,
                op: BinaryOp::Eq,
                right,
            } = conjunct
            {
                columns.extend(
                    [left, right]
                        .into_iter()
                        .filter_map(|side| scope.resolve_expr(side))
                        .filter(|site| is_nullable(site)),
                );
            }
        }
    }
    for column in &span.clause.using {
        for range in nullable {
            if let Some(index) = scope.owner_in(range.clone(), column, true) {
                columns.push(scope.local_site(index, column));
            }
        }
    }
    columns
}

/// The column `conjunct` tests with `IS NULL` (or `IS NOT NULL` when
/// `negated`).
fn null_test(scope: &Scope<'_>, conjunct: &Expr, negated: bool) -> Option<ColumnSite> {
    match conjunct.unparen() {
        Expr::IsNull { expr, negated: n } if *n == negated => scope.resolve_expr(expr),
        _ => None,
    }
}
