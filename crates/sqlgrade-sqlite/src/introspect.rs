//! Reads table metadata from a live SQLite database.

use sqlgrade_core::{ForeignKey, SchemaInfo, TableMetadata};
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use crate::error::Result;

/// Reads every user table and view with its columns, primary key and
/// foreign keys, and derives the analyzer's schema from them.
///
/// # Errors
///
/// Returns an error if a catalog query fails.
pub async fn introspect(pool: &SqlitePool) -> Result<SchemaInfo> {
    let tables = read_tables(pool).await?;
    let schema = SchemaInfo::from_tables(&tables);
    info!(
        tables = schema.tables().len(),
        join_conditions = schema.join_conditions().len(),
        "Introspected schema"
    );
    Ok(schema)
}

/// Reads the raw table metadata, one entry per table or view, by name.
///
/// # Errors
///
/// Returns an error if a catalog query fails.
pub async fn read_tables(pool: &SqlitePool) -> Result<Vec<TableMetadata>> {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master \
         WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let mut tables = Vec::with_capacity(names.len());
    for (name,) in names {
        let columns: Vec<(String, i64)> =
            sqlx::query_as("SELECT name, pk FROM pragma_table_info(?) ORDER BY cid")
                .bind(&name)
                .fetch_all(pool)
                .await?;

        let mut primary_key: Vec<(i64, String)> = columns
            .iter()
            .filter(|(_, pk)| *pk > 0)
            .map(|(column, pk)| (*pk, column.clone()))
            .collect();
        primary_key.sort();

        let references: Vec<(i64, String, String, Option<String>)> = sqlx::query_as(
            r#"SELECT id, "table", "from", "to" FROM pragma_foreign_key_list(?) ORDER BY id, seq"#,
        )
        .bind(&name)
        .fetch_all(pool)
        .await?;

        debug!(
            table = %name,
            columns = columns.len(),
            foreign_key_columns = references.len(),
            "Read table"
        );

        tables.push(TableMetadata {
            foreign_keys: group_foreign_keys(references),
            primary_key: primary_key.into_iter().map(|(_, column)| column).collect(),
            columns: columns.into_iter().map(|(column, _)| column).collect(),
            name,
        });
    }
    Ok(tables)
}

/// Folds `pragma_foreign_key_list` rows (one per column) into constraints.
/// A constraint whose target columns are implicit gets no
/// `references_columns`.
fn group_foreign_keys(rows: Vec<(i64, String, String, Option<String>)>) -> Vec<ForeignKey> {
    let mut keys: Vec<(i64, ForeignKey, bool)> = Vec::new();
    for (id, table, from, to) in rows {
        if keys.last().is_none_or(|(last, _, _)| *last != id) {
            keys.push((
                id,
                ForeignKey {
                    references_table: table,
                    ..ForeignKey::default()
                },
                false,
            ));
        }
        if let Some((_, key, implicit)) = keys.last_mut() {
            key.columns.push(from);
            match to {
                Some(column) => key.references_columns.push(column),
                None => *implicit = true,
            }
        }
    }
    keys.into_iter()
        .map(|(_, mut key, implicit)| {
            if implicit {
                key.references_columns.clear();
            }
            key
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_composite_and_implicit_keys() {
        let keys = group_foreign_keys(vec![
            (0, "offering".into(), "course".into(), Some("course".into())),
            (0, "offering".into(), "term".into(), Some("term".into())),
            (1, "student".into(), "student_id".into(), None),
        ]);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].columns, vec!["course", "term"]);
        assert_eq!(keys[0].references_columns, vec!["course", "term"]);
        assert_eq!(keys[1].references_table, "student");
        assert!(keys[1].references_columns.is_empty());
    }
}
