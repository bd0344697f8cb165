//! # sqlgrade-core
//!
//! Grading and feedback for SQL exercises.
//!
//! This crate provides:
//! - A result-set equivalence check that ignores row order, column order and
//!   column names, but requires one column correspondence for all rows
//! - A static analyzer that reports structural problems in a query (missing
//!   joins, cartesian products, incomplete grouping, ...) without running it
//!
//! Neither part performs I/O. Result sets come from whatever engine runs
//! the queries; the schema is described by the host.
//!
//! ## Comparing results
//!
//! ```rust
//! use sqlgrade_core::{is_equivalent, ResultSet, Value};
//!
//! let expected = ResultSet::new(
//!     vec!["x".into(), "y".into()],
//!     vec![
//!         vec![Value::from("A"), Value::from(1)],
//!         vec![Value::from("B"), Value::from(2)],
//!     ],
//! );
//! let actual = ResultSet::new(
//!     vec!["y".into(), "x".into()],
//!     vec![
//!         vec![Value::from(2), Value::from("B")],
//!         vec![Value::from(1), Value::from("A")],
//!     ],
//! );
//!
//! assert!(is_equivalent(&expected, &actual));
//! ```
//!
//! ## Analyzing queries
//!
//! ```rust
//! use sqlgrade_core::{Analyzer, IssueKind, SchemaInfo};
//!
//! let schema = SchemaInfo::builder()
//!     .table("student", &["id", "name"])
//!     .primary_key("student", &["id"])
//!     .table("enrollment", &["student_id", "course"])
//!     .foreign_key("enrollment", &["student_id"], "student", &[])
//!     .build();
//!
//! let issues = Analyzer::new(schema).analyze("SELECT * FROM student, enrollment");
//!
//! assert_eq!(issues[0].kind, IssueKind::DanglingTables);
//! assert_eq!(issues[1].kind, IssueKind::IncompleteJoin);
//! ```

pub mod analyzer;
pub mod ast;
pub mod error;
pub mod parser;
pub mod result;
pub mod schema;
pub mod value;

pub use analyzer::{Analyzer, AnalyzerOptions, Issue, IssueKind, IssuePayload, Severity};
pub use error::{AnalyzeError, Result};
pub use parser::{parse_statements, ParseError};
pub use result::{is_equivalent, Correspondence, Permutation, ResultSet};
pub use schema::{ForeignKey, JoinCondition, SchemaBuilder, SchemaInfo, TableColumns, TableMetadata};
pub use value::{Hash, Value};
