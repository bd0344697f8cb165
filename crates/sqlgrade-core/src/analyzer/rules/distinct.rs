//! DISTINCT next to GROUP BY.

use crate::analyzer::issue::{Issue, IssueKind};
use crate::analyzer::walk::{Rule, SelectContext};

/// Warns about DISTINCT on a grouped SELECT, which already returns one row
/// per group.
#[derive(Debug, Clone, Copy, Default)]
pub struct UselessDistinct;

impl Rule for UselessDistinct {
    fn kind(&self) -> IssueKind {
        IssueKind::UselessDistinct
    }

    fn check(&self, ctx: SelectContext<'_>) -> Vec<Issue> {
        if ctx.select.distinct && !ctx.select.group_by.is_empty() {
            vec![Issue::useless_distinct()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::run;
    use super::*;

    #[test]
    fn test_distinct_with_group_by() {
        let issues = run(
            &UselessDistinct,
            "SELECT DISTINCT name, COUNT(*) FROM student GROUP BY name",
        );
        assert_eq!(issues, vec![Issue::useless_distinct()]);
    }

    #[test]
    fn test_distinct_alone_is_fine() {
        assert!(run(&UselessDistinct, "SELECT DISTINCT name FROM student").is_empty());
        assert!(run(&UselessDistinct, "SELECT COUNT(DISTINCT name) FROM student GROUP BY id").is_empty());
    }
}
