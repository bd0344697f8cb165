//! Explicit JOIN syntax.

use crate::analyzer::issue::{Issue, IssueKind};
use crate::analyzer::walk::{Rule, SelectContext};

/// Reports `JOIN` and `INNER JOIN` where the course expects tables listed
/// with commas and joined in WHERE. Outer joins are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForbiddenInnerJoin;

impl Rule for ForbiddenInnerJoin {
    fn kind(&self) -> IssueKind {
        IssueKind::ForbiddenInnerJoin
    }

    fn check(&self, ctx: SelectContext<'_>) -> Vec<Issue> {
        ctx.select
            .joins()
            .into_iter()
            .filter(|join| join.join_type.is_explicit_inner())
            .map(|join| Issue::forbidden_inner_join(join.join_type.as_str(), join.table.label()))
            .collect()
    }
}
