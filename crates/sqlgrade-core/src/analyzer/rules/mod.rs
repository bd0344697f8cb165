//! The structural rules.

mod dangling_tables;
mod distinct;
mod group_by;
mod incomplete_join;
mod inner_join;
mod outer_join;

pub use dangling_tables::DanglingTables;
pub use distinct::UselessDistinct;
pub use group_by::IncompleteGroupBy;
pub use incomplete_join::IncompleteJoin;
pub use inner_join::ForbiddenInnerJoin;
pub use outer_join::NullFilteredOuterJoin;

#[cfg(test)]
pub(crate) mod testing {
    use super::super::issue::Issue;
    use super::super::scope::Scope;
    use super::super::walk::{walk_query, Rule};
    use crate::ast::Statement;
    use crate::parser::parse_statements;
    use crate::schema::SchemaInfo;

    /// `student(id, name)`, `course(code, title)` and
    /// `enrollment(student_id, course_code)` with foreign keys to both.
    pub fn school() -> SchemaInfo {
        SchemaInfo::builder()
            .table("student", &["id", "name"])
            .primary_key("student", &["id"])
            .table("course", &["code", "title"])
            .primary_key("course", &["code"])
            .table("enrollment", &["student_id", "course_code", "grade"])
            .foreign_key("enrollment", &["student_id"], "student", &[])
            .foreign_key("enrollment", &["course_code"], "course", &[])
            .build()
    }

    /// Runs one rule over the first statement of `sql`.
    pub fn run(rule: &dyn Rule, sql: &str) -> Vec<Issue> {
        let schema = school();
        let statements = parse_statements(sql).unwrap();
        let Statement::Query(query) = &statements[0] else {
            panic!("expected a query");
        };
        walk_query(query, &Scope::root(&schema), rule)
    }
}
