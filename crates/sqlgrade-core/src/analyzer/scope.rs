//! Name resolution for one SELECT block.
//!
//! A [`Scope`] lists the relations of the block's FROM list and, behind
//! them, every relation of the enclosing blocks. Column references resolve
//! against the local relations first.

use std::ops::Range;

use crate::ast::{BinaryOp, Expr, JoinClause, SelectStatement, TableRef};
use crate::schema::SchemaInfo;

/// A FROM-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// The name columns are qualified with: the alias, else the table name.
    /// Empty for a derived table without alias.
    pub qualifier: String,
    /// The underlying table, for base tables.
    pub table: Option<String>,
}

impl Relation {
    /// Name used in messages.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.table, self.qualifier.is_empty()) {
            (Some(table), _) => table.clone(),
            (None, false) => self.qualifier.clone(),
            (None, true) => String::from("(subquery)"),
        }
    }
}

/// Where a column reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The local relation at this index.
    Local(usize),
    /// A relation of an enclosing block.
    Outer,
}

/// A resolved column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSite {
    /// Where the column lives.
    pub origin: Origin,
    /// The underlying table, when known.
    pub table: Option<String>,
    /// Column name.
    pub column: String,
}

impl ColumnSite {
    /// The local relation index, if the column is local.
    #[must_use]
    pub const fn local(&self) -> Option<usize> {
        match self.origin {
            Origin::Local(index) => Some(index),
            Origin::Outer => None,
        }
    }
}

/// A column-to-column comparison found in WHERE, ON, USING or NATURAL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEdge {
    /// Left column.
    pub left: ColumnSite,
    /// Right column.
    pub right: ColumnSite,
    /// The comparison operator.
    pub op: BinaryOp,
}

/// A JOIN clause with the local relations on each side of it.
#[derive(Debug, Clone)]
pub struct JoinSpan<'a> {
    /// The clause.
    pub clause: &'a JoinClause,
    /// Relations joined so far.
    pub left: Range<usize>,
    /// Relations introduced by the clause.
    pub right: Range<usize>,
}

/// The relations visible in one SELECT block.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    schema: &'a SchemaInfo,
    relations: Vec<Relation>,
    outer: Vec<Relation>,
}

impl<'a> Scope<'a> {
    /// The empty scope of a top-level query.
    #[must_use]
    pub const fn root(schema: &'a SchemaInfo) -> Self {
        Self {
            schema,
            relations: Vec::new(),
            outer: Vec::new(),
        }
    }

    /// The scope of `select` nested inside this one.
    #[must_use]
    pub fn enter(&self, select: &SelectStatement) -> Self {
        let mut relations = Vec::new();
        for table in &select.from {
            collect_relations(table, &mut relations);
        }
        let mut outer = self.relations.clone();
        outer.extend(self.outer.iter().cloned());
        Self {
            schema: self.schema,
            relations,
            outer,
        }
    }

    /// The schema names resolve against.
    #[must_use]
    pub const fn schema(&self) -> &'a SchemaInfo {
        self.schema
    }

    /// Local relations, in FROM order.
    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Resolves a possibly qualified column name.
    ///
    /// A qualifier matches an alias before a table name. An unqualified
    /// column belongs to the first relation whose table has it; when no
    /// table claims it and the block reads a single relation, it belongs to
    /// that relation.
    #[must_use]
    pub fn resolve(&self, qualifier: Option<&str>, column: &str) -> Option<ColumnSite> {
        let found = match qualifier {
            Some(q) => self
                .find(|r| r.qualifier == q)
                .or_else(|| self.find(|r| r.table.as_deref() == Some(q))),
            None => self
                .find(|r| {
                    r.table
                        .as_deref()
                        .is_some_and(|t| self.schema.has_column(t, column))
                })
                .or_else(|| match self.relations.as_slice() {
                    [only] => Some((Origin::Local(0), only)),
                    _ => None,
                }),
        };
        found.map(|(origin, relation)| ColumnSite {
            origin,
            table: relation.table.clone(),
            column: column.to_string(),
        })
    }

    /// Resolves `expr` if it is a plain column reference.
    #[must_use]
    pub fn resolve_expr(&self, expr: &Expr) -> Option<ColumnSite> {
        let (qualifier, column) = expr.as_column()?;
        self.resolve(qualifier, column)
    }

    /// Every column comparison that relates two relations of `select`.
    #[must_use]
    pub fn join_edges(&self, select: &SelectStatement) -> Vec<JoinEdge> {
        let mut edges = Vec::new();
        if let Some(filter) = &select.where_clause {
            self.comparison_edges(filter, &mut edges);
        }
        for span in join_spans(select) {
            if let Some(on) = &span.clause.on {
                self.comparison_edges(on, &mut edges);
            }
            for column in &span.clause.using {
                edges.extend(self.shared_column_edge(&span, column, true));
            }
            if span.clause.natural {
                self.natural_edges(&span, &mut edges);
            }
        }
        edges
    }

    /// The local relation on `range` that owns `column`, per the schema.
    /// With `fallback`, a single-relation range owns every column.
    #[must_use]
    pub fn owner_in(&self, range: Range<usize>, column: &str, fallback: bool) -> Option<usize> {
        let single = (fallback && range.len() == 1).then_some(range.start);
        range
            .clone()
            .find(|&index| {
                self.relations
                    .get(index)
                    .and_then(|r| r.table.as_deref())
                    .is_some_and(|t| self.schema.has_column(t, column))
            })
            .or(single)
    }

    /// A site for `column` on the local relation at `index`.
    #[must_use]
    pub fn local_site(&self, index: usize, column: &str) -> ColumnSite {
        ColumnSite {
            origin: Origin::Local(index),
            table: self.relations.get(index).and_then(|r| r.table.clone()),
            column: column.to_string(),
        }
    }

    fn find(&self, matches: impl Fn(&Relation) -> bool) -> Option<(Origin, &Relation)> {
        self.relations
            .iter()
            .enumerate()
            .find(|(_, r)| matches(r))
            .map(|(index, r)| (Origin::Local(index), r))
            .or_else(|| {
                self.outer
                    .iter()
                    .find(|r| matches(r))
                    .map(|r| (Origin::Outer, r))
            })
    }

    fn comparison_edges(&self, expr: &Expr, edges: &mut Vec<JoinEdge>) {
        if let Expr::Binary { left, op, right } = expr {
            if op.is_comparison() {
                if let (Some(l), Some(r)) = (self.resolve_expr(left), self.resolve_expr(right)) {
                    edges.push(JoinEdge {
                        left: l,
                        right: r,
                        op: *op,
                    });
                }
            }
        }
        for child in expr.children() {
            self.comparison_edges(child, edges);
        }
    }

    fn shared_column_edge(
        &self,
        span: &JoinSpan<'_>,
        column: &str,
        fallback: bool,
    ) -> Option<JoinEdge> {
        let left = self.owner_in(span.left.clone(), column, fallback)?;
        let right = self.owner_in(span.right.clone(), column, fallback)?;
        Some(JoinEdge {
            left: self.local_site(left, column),
            right: self.local_site(right, column),
            op: BinaryOp::Eq,
        })
    }

    fn natural_edges(&self, span: &JoinSpan<'_>, edges: &mut Vec<JoinEdge>) {
        for index in span.right.clone() {
            let Some(table) = self.relations.get(index).and_then(|r| r.table.as_deref()) else {
                continue;
            };
            for column in self.schema.columns_of(table).unwrap_or_default() {
                if let Some(left) = self.owner_in(span.left.clone(), column, false) {
                    edges.push(JoinEdge {
                        left: self.local_site(left, column),
                        right: self.local_site(index, column),
                        op: BinaryOp::Eq,
                    });
                }
            }
        }
    }
}

fn collect_relations(table: &TableRef, out: &mut Vec<Relation>) {
    match table {
        TableRef::Table { name, alias } => out.push(Relation {
            qualifier: alias.clone().unwrap_or_else(|| name.clone()),
            table: Some(name.clone()),
        }),
        TableRef::Subquery { alias, .. } => out.push(Relation {
            qualifier: alias.clone().unwrap_or_default(),
            table: None,
        }),
        TableRef::Join { left, join } => {
            collect_relations(left, out);
            collect_relations(&join.table, out);
        }
        TableRef::Other => {}
    }
}

/// Every JOIN clause of `select` with the relation indices on each side.
#[must_use]
pub fn join_spans(select: &SelectStatement) -> Vec<JoinSpan<'_>> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for table in &select.from {
        offset = collect_spans(table, offset, &mut spans);
    }
    spans
}

fn collect_spans<'a>(table: &'a TableRef, start: usize, spans: &mut Vec<JoinSpan<'a>>) -> usize {
    match table {
        TableRef::Table { .. } | TableRef::Subquery { .. } => start + 1,
        TableRef::Join { left, join } => {
            let mid = collect_spans(left, start, spans);
            let end = collect_spans(&join.table, mid, spans);
            spans.push(JoinSpan {
                clause: join.as_ref(),
                left: start..mid,
                right: mid..end,
            });
            end
        }
        TableRef::Other => start,
    }
}
