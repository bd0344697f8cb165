//! FROM lists that fall apart into unconnected groups.

use crate::analyzer::issue::{Issue, IssueKind};
use crate::analyzer::walk::{Rule, SelectContext};

/// Reports a FROM list whose relations are not all connected by join
/// conditions, i.e. an accidental cartesian product.
///
/// Nodes are the local relations plus one node standing for the enclosing
/// query; a correlated condition connects a relation to that node.
///
/// Groups are listed in FROM order of their first relation, so the first
/// group is the one reached from the first FROM entry. Each group keeps its
/// relations in FROM order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DanglingTables;

impl Rule for DanglingTables {
    fn kind(&self) -> IssueKind {
        IssueKind::DanglingTables
    }

    fn check(&self, ctx: SelectContext<'_>) -> Vec<Issue> {
        let relations = ctx.scope.relations();
        if relations.len() < 2 {
            return Vec::new();
        }

        let outer = relations.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); outer + 1];
        for edge in ctx.scope.join_edges(ctx.select) {
            let a = edge.left.local().unwrap_or(outer);
            let b = edge.right.local().unwrap_or(outer);
            if a != b {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }

        let groups = connected_groups(&adjacency, outer);
        if groups.len() < 2 {
            return Vec::new();
        }

        let labelled = groups
            .into_iter()
            .map(|group| group.into_iter().map(|i| relations[i].label()).collect())
            .collect();
        vec![Issue::dangling_tables(labelled)]
    }
}

/// Expands a frontier from each unreached relation in turn. Nodes at or
/// past `relations` take part in the search but are not listed.
fn connected_groups(adjacency: &[Vec<usize>], relations: usize) -> Vec<Vec<usize>> {
    let mut reached = vec![false; adjacency.len()];
    let mut groups = Vec::new();

    for start in 0..relations {
        if reached[start] {
            continue;
        }
        reached[start] = true;
        let mut frontier = vec![start];
        let mut group = Vec::new();
        while let Some(node) = frontier.pop() {
            if node < relations {
                group.push(node);
            }
            for &next in &adjacency[node] {
                if !reached[next] {
                    reached[next] = true;
                    frontier.push(next);
                }
            }
        }
        group.sort_unstable();
        groups.push(group);
    }
    groups
}
