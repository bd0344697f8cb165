//! SQLite host adapter for `sqlgrade`.
//!
//! This crate connects the pure engines of `sqlgrade-core` to a live SQLite
//! exercise database:
//!
//! - **Introspection** - reads tables, primary keys and foreign keys and
//!   derives the analyzer's [`SchemaInfo`](sqlgrade_core::SchemaInfo)
//! - **Execution** - runs a query into a [`ResultSet`](sqlgrade_core::ResultSet)
//! - **Grading** - compares a submission with the reference query and
//!   attaches the analyzer's findings
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlgrade_core::AnalyzerOptions;
//! use sqlgrade_sqlite::Grader;
//! use sqlx::sqlite::SqlitePool;
//!
//! let pool = SqlitePool::connect("sqlite:school.db").await?;
//! let grader = Grader::new(pool, AnalyzerOptions::default()).await?;
//! let verdict = grader
//!     .grade(
//!         "SELECT name FROM student",
//!         "SELECT s.name FROM student s",
//!     )
//!     .await?;
//! assert!(verdict.passed());
//! ```

pub mod error;
pub mod execute;
pub mod grader;
pub mod introspect;

pub use error::{GradeError, Result};
pub use execute::fetch_result_set;
pub use grader::{Grader, Verdict};
pub use introspect::{introspect, read_tables};
