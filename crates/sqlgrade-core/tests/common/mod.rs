#![allow(dead_code)]

use sqlgrade_core::{Analyzer, Issue, IssueKind, ResultSet, SchemaInfo, Value};

/// `student(id, name)` and `enrollment(student_id, course)` with
/// `enrollment.student_id -> student.id`.
pub fn student_schema() -> SchemaInfo {
    SchemaInfo::builder()
        .table("student", &["id", "name"])
        .primary_key("student", &["id"])
        .table("enrollment", &["student_id", "course"])
        .foreign_key("enrollment", &["student_id"], "student", &[])
        .build()
}

pub fn analyze(sql: &str) -> Vec<Issue> {
    Analyzer::new(student_schema()).analyze(sql)
}

pub fn kinds(issues: &[Issue]) -> Vec<IssueKind> {
    issues.iter().map(|issue| issue.kind).collect()
}

pub fn find(issues: &[Issue], kind: IssueKind) -> Option<&Issue> {
    issues.iter().find(|issue| issue.kind == kind)
}

/// A result set with generated column names.
pub fn rs(rows: Vec<Vec<Value>>) -> ResultSet {
    let width = rows.first().map_or(0, Vec::len);
    let columns = (0..width).map(|i| format!("c{i}")).collect();
    ResultSet::new(columns, rows)
}

/// A result set from JSON in the `{"columns": [...], "values": [...]}`
/// shape.
pub fn rs_json(json: &str) -> ResultSet {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("bad result set: {json}\nError: {e}"))
}

/// Reorders the columns of every row: new column `i` is old column
/// `order[i]`.
pub fn permute_columns(set: &ResultSet, order: &[usize]) -> ResultSet {
    ResultSet::new(
        order.iter().map(|&i| set.columns[i].clone()).collect(),
        set.rows
            .iter()
            .map(|row| order.iter().map(|&i| row[i].clone()).collect())
            .collect(),
    )
}
