//! Recursive walk over every SELECT block of a query.

use tracing::debug;

use super::issue::{Issue, IssueKind};
use super::scope::Scope;
use crate::ast::{Query, QueryBody, SelectStatement};

/// What a rule sees of one SELECT block.
#[derive(Debug, Clone, Copy)]
pub struct SelectContext<'a> {
    /// The block.
    pub select: &'a SelectStatement,
    /// Its scope, merged over the enclosing blocks.
    pub scope: &'a Scope<'a>,
}

/// A structural check applied to every SELECT block.
pub trait Rule {
    /// The kind of issue this rule reports.
    fn kind(&self) -> IssueKind;

    /// Returns the issues found in one block, not looking into nested
    /// queries.
    fn check(&self, ctx: SelectContext<'_>) -> Vec<Issue>;
}

/// Applies `rule` to every SELECT block of `query`.
pub fn walk_query(query: &Query, scope: &Scope<'_>, rule: &dyn Rule) -> Vec<Issue> {
    let mut issues: Vec<Issue> = query
        .ctes
        .iter()
        .flat_map(|cte| walk_query(&cte.query, scope, rule))
        .collect();
    issues.extend(walk_body(&query.body, scope, rule));
    issues
}

fn walk_body(body: &QueryBody, scope: &Scope<'_>, rule: &dyn Rule) -> Vec<Issue> {
    match body {
        QueryBody::Select(select) => walk_select(select, scope, rule),
        QueryBody::SetOperation { left, right } => {
            let mut issues = walk_body(left, scope, rule);
            issues.extend(walk_body(right, scope, rule));
            issues
        }
        QueryBody::Nested(query) => walk_query(query, scope, rule),
        QueryBody::Other => Vec::new(),
    }
}

fn walk_select(select: &SelectStatement, outer: &Scope<'_>, rule: &dyn Rule) -> Vec<Issue> {
    let scope = outer.enter(select);
    let mut issues = rule.check(SelectContext {
        select,
        scope: &scope,
    });
    if !issues.is_empty() {
        debug!(rule = %rule.kind(), found = issues.len(), "rule reported issues");
    }
    for query in select.subqueries() {
        issues.extend(walk_query(query, &scope, rule));
    }
    issues
}
