//! Lowering from the `sqlparser` syntax tree.

use sqlparser::ast as sql;

use crate::ast::{
    BinaryOp, Cte, Expr, FunctionCall, JoinClause, JoinType, Query, QueryBody, SelectColumn,
    SelectStatement, Statement, TableRef, UnaryOp,
};

pub(super) fn statement(stmt: &sql::Statement) -> Statement {
    match stmt {
        sql::Statement::Query(q) => Statement::Query(Box::new(query(q))),
        other => Statement::Other {
            kind: other
                .to_string()
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_uppercase(),
        },
    }
}

fn ident(ident: &sql::Ident) -> String {
    ident.value.to_lowercase()
}

/// The last part of a possibly schema-qualified name.
fn object_name(name: &sql::ObjectName) -> Option<String> {
    name.0.last()?.as_ident().map(ident)
}

fn query(query: &sql::Query) -> Query {
    let ctes = query
        .with
        .as_ref()
        .map(|with| {
            with.cte_tables
                .iter()
                .map(|cte| Cte {
                    name: ident(&cte.alias.name),
                    query: self::query(&cte.query),
                })
                .collect()
        })
        .unwrap_or_default();
    Query {
        ctes,
        body: body(&query.body),
    }
}

fn body(body: &sql::SetExpr) -> QueryBody {
    match body {
        sql::SetExpr::Select(s) => QueryBody::Select(Box::new(select(s))),
        sql::SetExpr::Query(q) => QueryBody::Nested(Box::new(query(q))),
        sql::SetExpr::SetOperation { left, right, .. } => QueryBody::SetOperation {
            left: Box::new(self::body(left)),
            right: Box::new(self::body(right)),
        },
        _ => QueryBody::Other,
    }
}

fn select(select: &sql::Select) -> SelectStatement {
    let group_by = match &select.group_by {
        sql::GroupByExpr::Expressions(exprs, _) => exprs.iter().map(expr).collect(),
        _ => Vec::new(),
    };
    SelectStatement {
        distinct: matches!(
            select.distinct,
            Some(sql::Distinct::Distinct | sql::Distinct::On(_))
        ),
        columns: select.projection.iter().map(select_item).collect(),
        from: select.from.iter().map(table_with_joins).collect(),
        where_clause: select.selection.as_ref().map(expr),
        group_by,
        having: select.having.as_ref().map(expr),
    }
}

fn select_item(item: &sql::SelectItem) -> SelectColumn {
    match item {
        sql::SelectItem::UnnamedExpr(e) => SelectColumn::new(expr(e)),
        sql::SelectItem::ExprWithAlias { expr: e, alias } => {
            SelectColumn::with_alias(expr(e), ident(alias))
        }
        sql::SelectItem::QualifiedWildcard(kind, _) => {
            let table = match kind {
                sql::SelectItemQualifiedWildcardKind::ObjectName(name) => object_name(name),
                sql::SelectItemQualifiedWildcardKind::Expr(_) => None,
            };
            SelectColumn::new(Expr::Wildcard { table })
        }
        sql::SelectItem::Wildcard(_) => SelectColumn::new(Expr::Wildcard { table: None }),
    }
}

fn table_with_joins(from: &sql::TableWithJoins) -> TableRef {
    from.joins
        .iter()
        .fold(table_factor(&from.relation), |left, j| TableRef::Join {
            left: Box::new(left),
            join: Box::new(join(j)),
        })
}

fn table_factor(factor: &sql::TableFactor) -> TableRef {
    match factor {
        sql::TableFactor::Table { name, alias, .. } => {
            object_name(name).map_or(TableRef::Other, |name| TableRef::Table {
                name,
                alias: alias.as_ref().map(|a| ident(&a.name)),
            })
        }
        sql::TableFactor::Derived {
            subquery, alias, ..
        } => TableRef::Subquery {
            query: Box::new(query(subquery)),
            alias: alias.as_ref().map(|a| ident(&a.name)),
        },
        sql::TableFactor::NestedJoin {
            table_with_joins: nested,
            ..
        } => table_with_joins(nested),
        _ => TableRef::Other,
    }
}

fn join(join: &sql::Join) -> JoinClause {
    let (join_type, constraint) = match &join.join_operator {
        sql::JoinOperator::Join(c) => (JoinType::Join, Some(c)),
        sql::JoinOperator::Inner(c) => (JoinType::Inner, Some(c)),
        sql::JoinOperator::Left(c) | sql::JoinOperator::LeftOuter(c) => (JoinType::Left, Some(c)),
        sql::JoinOperator::Right(c) | sql::JoinOperator::RightOuter(c) => {
            (JoinType::Right, Some(c))
        }
        sql::JoinOperator::FullOuter(c) => (JoinType::Full, Some(c)),
        sql::JoinOperator::CrossJoin(..) => (JoinType::Cross, None),
        _ => (JoinType::Other, None),
    };

    let mut clause = JoinClause {
        join_type,
        table: table_factor(&join.relation),
        on: None,
        using: Vec::new(),
        natural: false,
    };
    match constraint {
        Some(sql::JoinConstraint::On(on)) => clause.on = Some(expr(on)),
        Some(sql::JoinConstraint::Using(columns)) => {
            clause.using = columns.iter().filter_map(object_name).collect();
        }
        Some(sql::JoinConstraint::Natural) => clause.natural = true,
        _ => {}
    }
    clause
}

fn boxed(e: &sql::Expr) -> Box<Expr> {
    Box::new(expr(e))
}

fn expr(e: &sql::Expr) -> Expr {
    match e {
        sql::Expr::Identifier(id) => Expr::column(ident(id)),
        sql::Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [.., table, column] => Expr::qualified_column(ident(table), ident(column)),
            [column] => Expr::column(ident(column)),
            [] => Expr::Other,
        },
        sql::Expr::Value(value) => Expr::Literal(value.to_string()),
        sql::Expr::BinaryOp { left, op, right } => Expr::Binary {
            left: boxed(left),
            op: binary_op(op),
            right: boxed(right),
        },
        sql::Expr::UnaryOp { op, expr: operand } => Expr::Unary {
            op: match op {
                sql::UnaryOperator::Not => UnaryOp::Not,
                sql::UnaryOperator::Minus => UnaryOp::Neg,
                _ => UnaryOp::Other,
            },
            operand: boxed(operand),
        },
        sql::Expr::Nested(inner) => Expr::Paren(boxed(inner)),
        sql::Expr::IsNull(inner) => Expr::IsNull {
            expr: boxed(inner),
            negated: false,
        },
        sql::Expr::IsNotNull(inner) => Expr::IsNull {
            expr: boxed(inner),
            negated: true,
        },
        sql::Expr::Subquery(q) => Expr::Subquery(Box::new(query(q))),
        sql::Expr::Exists { subquery, negated } => Expr::Exists {
            query: Box::new(query(subquery)),
            negated: *negated,
        },
        sql::Expr::InSubquery {
            expr: inner,
            subquery,
            negated,
        } => Expr::InSubquery {
            expr: boxed(inner),
            query: Box::new(query(subquery)),
            negated: *negated,
        },
        sql::Expr::InList {
            expr: inner,
            list,
            negated,
        } => Expr::InList {
            expr: boxed(inner),
            list: list.iter().map(expr).collect(),
            negated: *negated,
        },
        sql::Expr::Between {
            expr: inner,
            negated,
            low,
            high,
        } => Expr::Between {
            expr: boxed(inner),
            low: boxed(low),
            high: boxed(high),
            negated: *negated,
        },
        sql::Expr::Function(f) => Expr::Function(function(f)),
        sql::Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => Expr::Case {
            operand: operand.as_deref().map(boxed),
            branches: conditions
                .iter()
                .map(|when| (expr(&when.condition), expr(&when.result)))
                .collect(),
            else_result: else_result.as_deref().map(boxed),
        },
        sql::Expr::Cast { expr: inner, .. } => Expr::Cast(boxed(inner)),
        sql::Expr::Like {
            negated,
            expr: inner,
            pattern,
            ..
        }
        | sql::Expr::ILike {
            negated,
            expr: inner,
            pattern,
            ..
        }
        | sql::Expr::SimilarTo {
            negated,
            expr: inner,
            pattern,
            ..
        } => Expr::Like {
            expr: boxed(inner),
            pattern: boxed(pattern),
            negated: *negated,
        },
        sql::Expr::IsDistinctFrom(left, right) | sql::Expr::IsNotDistinctFrom(left, right) => {
            Expr::Compound(vec![expr(left), expr(right)])
        }
        sql::Expr::IsTrue(inner)
        | sql::Expr::IsNotTrue(inner)
        | sql::Expr::IsFalse(inner)
        | sql::Expr::IsNotFalse(inner)
        | sql::Expr::IsUnknown(inner)
        | sql::Expr::IsNotUnknown(inner)
        | sql::Expr::Collate { expr: inner, .. } => Expr::Compound(vec![expr(inner)]),
        sql::Expr::Tuple(items) => Expr::Compound(items.iter().map(expr).collect()),
        _ => Expr::Other,
    }
}

fn function(f: &sql::Function) -> FunctionCall {
    let mut call = FunctionCall {
        name: f.name.to_string().to_lowercase(),
        args: Vec::new(),
        distinct: false,
    };
    if let sql::FunctionArguments::List(list) = &f.args {
        call.distinct = matches!(
            list.duplicate_treatment,
            Some(sql::DuplicateTreatment::Distinct)
        );
        call.args = list
            .args
            .iter()
            .map(|arg| match arg {
                sql::FunctionArg::Unnamed(sql::FunctionArgExpr::Expr(e)) => expr(e),
                sql::FunctionArg::Unnamed(sql::FunctionArgExpr::Wildcard) => {
                    Expr::Wildcard { table: None }
                }
                _ => Expr::Other,
            })
            .collect();
    }
    call
}

fn binary_op(op: &sql::BinaryOperator) -> BinaryOp {
    match op {
        sql::BinaryOperator::Plus => BinaryOp::Add,
        sql::BinaryOperator::Minus => BinaryOp::Sub,
        sql::BinaryOperator::Multiply => BinaryOp::Mul,
        sql::BinaryOperator::Divide => BinaryOp::Div,
        sql::BinaryOperator::Modulo => BinaryOp::Mod,
        sql::BinaryOperator::StringConcat => BinaryOp::Concat,
        sql::BinaryOperator::Eq => BinaryOp::Eq,
        sql::BinaryOperator::NotEq => BinaryOp::NotEq,
        sql::BinaryOperator::Lt => BinaryOp::Lt,
        sql::BinaryOperator::LtEq => BinaryOp::LtEq,
        sql::BinaryOperator::Gt => BinaryOp::Gt,
        sql::BinaryOperator::GtEq => BinaryOp::GtEq,
        sql::BinaryOperator::And => BinaryOp::And,
        sql::BinaryOperator::Or => BinaryOp::Or,
        _ => BinaryOp::Other,
    }
}
