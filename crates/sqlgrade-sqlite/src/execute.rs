//! Query execution.
//!
//! Runs a query and converts its output into a [`ResultSet`], keeping the
//! storage class SQLite reports for each individual value.

use sqlgrade_core::ast::Statement as SqlStatement;
use sqlgrade_core::{parse_statements, ResultSet, Value};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::debug;

use crate::error::{GradeError, Result};

/// Runs `sql` and collects its columns and rows.
///
/// Column names come from the prepared statement, so a query returning no
/// rows still reports its width. Anything but a query is refused, and the
/// connection runs with `query_only` set while `sql` executes.
///
/// # Errors
///
/// Returns [`GradeError::NotAQuery`] for statements that are not queries, and
/// a database error if the query cannot be prepared or executed, tries to
/// write, or yields a value that cannot be decoded.
pub async fn fetch_result_set(pool: &SqlitePool, sql: &str) -> Result<ResultSet> {
    ensure_query(sql)?;

    let mut conn = pool.acquire().await?;
    sqlx::query("PRAGMA query_only = ON").execute(&mut *conn).await?;
    let fetched = fetch_on(&mut conn, sql).await;
    sqlx::query("PRAGMA query_only = OFF").execute(&mut *conn).await?;
    fetched
}

/// Text that does not parse is left to SQLite to report.
fn ensure_query(sql: &str) -> Result<()> {
    let Ok(statements) = parse_statements(sql) else {
        return Ok(());
    };
    for statement in &statements {
        if let SqlStatement::Other { kind } = statement {
            debug!(kind = %kind, "Refusing statement");
            return Err(GradeError::NotAQuery(kind.clone()));
        }
    }
    Ok(())
}

async fn fetch_on(conn: &mut SqliteConnection, sql: &str) -> Result<ResultSet> {
    let statement = Executor::prepare(&mut *conn, sql).await?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();

    let rows = sqlx::query(sql).fetch_all(&mut *conn).await?;
    let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;

    debug!(columns = columns.len(), rows = rows.len(), "Fetched result set");
    Ok(ResultSet::new(columns, rows))
}

fn decode_row(row: &SqliteRow) -> Result<Vec<Value>> {
    (0..row.len()).map(|index| decode_value(row, index)).collect()
}

/// Decodes by the value's storage class, not the column's declared type.
fn decode_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let value = match raw.type_info().name() {
        "INTEGER" => Value::Integer(row.try_get_unchecked(index)?),
        "REAL" => Value::Real(row.try_get_unchecked(index)?),
        "BLOB" => Value::Blob(row.try_get_unchecked(index)?),
        _ => Value::Text(row.try_get_unchecked(index)?),
    };
    Ok(value)
}
