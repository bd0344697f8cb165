//! Schema metadata the analyzer checks queries against.
//!
//! The host describes its tables as [`TableMetadata`] (columns, primary key
//! and foreign keys) and [`SchemaInfo::from_tables`] derives the two inputs
//! the rules need: the declared [`JoinCondition`]s and the per-table column
//! lists. All names are stored in lower case.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A declared equality between a column of one table and a column of
/// another, usually taken from a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinCondition {
    /// Referencing table.
    pub table1: String,
    /// Referencing column.
    pub column1: String,
    /// Referenced table.
    pub table2: String,
    /// Referenced column.
    pub column2: String,
}

impl JoinCondition {
    /// Creates a join condition.
    #[must_use]
    pub fn new(
        table1: impl Into<String>,
        column1: impl Into<String>,
        table2: impl Into<String>,
        column2: impl Into<String>,
    ) -> Self {
        Self {
            table1: table1.into().to_lowercase(),
            column1: column1.into().to_lowercase(),
            table2: table2.into().to_lowercase(),
            column2: column2.into().to_lowercase(),
        }
    }

    /// Returns `true` if `left = right` states this condition, with the two
    /// sides in either order. Each side is `(table, column)`.
    #[must_use]
    pub fn is_stated_by(&self, left: (&str, &str), right: (&str, &str)) -> bool {
        let first = (self.table1.as_str(), self.column1.as_str());
        let second = (self.table2.as_str(), self.column2.as_str());
        (left == first && right == second) || (left == second && right == first)
    }

    /// Returns `true` for a foreign key from a table to itself.
    #[must_use]
    pub fn is_self_reference(&self) -> bool {
        self.table1 == self.table2
    }
}

/// A table and its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumns {
    /// Table name.
    pub table: String,
    /// Column names.
    pub columns: Vec<String>,
}

impl TableColumns {
    /// Returns `true` if the table has a column named `column`.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// A foreign key constraint on a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForeignKey {
    /// Columns in the referencing table.
    pub columns: Vec<String>,
    /// Referenced table.
    pub references_table: String,
    /// Referenced columns. Empty means the referenced table's primary key.
    pub references_columns: Vec<String>,
}

/// What the host knows about one table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableMetadata {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<String>,
    /// Primary key columns, in key order.
    pub primary_key: Vec<String>,
    /// Foreign key constraints declared on this table.
    pub foreign_keys: Vec<ForeignKey>,
}

/// Join conditions and column lists for one database schema.
///
/// Deserializing goes through [`SchemaInfo::new`], so a hand-written JSON
/// schema is case-folded like everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SchemaDocument")]
pub struct SchemaInfo {
    /// Declared join conditions.
    pub join_conditions: Vec<JoinCondition>,
    /// Tables with their columns.
    pub tables: Vec<TableColumns>,
}

impl SchemaInfo {
    /// Creates schema info from already extracted parts, lower-casing every
    /// name.
    #[must_use]
    pub fn new(join_conditions: Vec<JoinCondition>, tables: Vec<TableColumns>) -> Self {
        Self {
            join_conditions: join_conditions
                .into_iter()
                .map(|c| JoinCondition::new(c.table1, c.column1, c.table2, c.column2))
                .collect(),
            tables: tables
                .into_iter()
                .map(|t| TableColumns {
                    table: t.table.to_lowercase(),
                    columns: t.columns.iter().map(|c| c.to_lowercase()).collect(),
                })
                .collect(),
        }
    }

    /// Creates a builder for declaring a schema by hand.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Derives join conditions and column lists from table metadata.
    ///
    /// Composite foreign keys pair their columns up positionally. A foreign
    /// key whose target columns cannot be determined is skipped.
    #[must_use]
    pub fn from_tables(tables: &[TableMetadata]) -> Self {
        let mut join_conditions: Vec<JoinCondition> = Vec::new();

        for table in tables {
            for fk in &table.foreign_keys {
                let targets = if fk.references_columns.is_empty() {
                    tables
                        .iter()
                        .find(|t| t.name.eq_ignore_ascii_case(&fk.references_table))
                        .map(|t| t.primary_key.clone())
                        .unwrap_or_default()
                } else {
                    fk.references_columns.clone()
                };

                if targets.is_empty() || targets.len() != fk.columns.len() {
                    warn!(
                        table = %table.name,
                        references = %fk.references_table,
                        "skipping foreign key with unresolvable target columns"
                    );
                    continue;
                }

                for (from, to) in fk.columns.iter().zip(&targets) {
                    let condition =
                        JoinCondition::new(&table.name, from, &fk.references_table, to);
                    if !join_conditions.contains(&condition) {
                        join_conditions.push(condition);
                    }
                }
            }
        }

        let tables = tables
            .iter()
            .map(|t| TableColumns {
                table: t.name.to_lowercase(),
                columns: t.columns.iter().map(|c| c.to_lowercase()).collect(),
            })
            .collect();

        Self {
            join_conditions,
            tables,
        }
    }

    /// Declared join conditions.
    #[must_use]
    pub fn join_conditions(&self) -> &[JoinCondition] {
        &self.join_conditions
    }

    /// Tables with their columns.
    #[must_use]
    pub fn tables(&self) -> &[TableColumns] {
        &self.tables
    }

    /// Columns of `table`, if the table is known.
    #[must_use]
    pub fn columns_of(&self, table: &str) -> Option<&[String]> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| t.columns.as_slice())
    }

    /// Returns `true` if `table` is known and has `column`.
    #[must_use]
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .iter()
            .any(|t| t.table == table && t.has_column(column))
    }
}

/// The serialized shape of [`SchemaInfo`], before case folding.
#[derive(Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    join_conditions: Vec<JoinCondition>,
    #[serde(default)]
    tables: Vec<TableColumns>,
}

impl From<SchemaDocument> for SchemaInfo {
    fn from(document: SchemaDocument) -> Self {
        Self::new(document.join_conditions, document.tables)
    }
}

/// Builder for [`SchemaInfo`].
///
/// ```
/// use sqlgrade_core::SchemaInfo;
///
/// let schema = SchemaInfo::builder()
///     .table("student", &["id", "name"])
///     .primary_key("student", &["id"])
///     .table("enrollment", &["student_id", "course"])
///     .foreign_key("enrollment", &["student_id"], "student", &[])
///     .build();
///
/// assert_eq!(schema.join_conditions().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    tables: Vec<TableMetadata>,
}

impl SchemaBuilder {
    /// Adds a table with its columns.
    #[must_use]
    pub fn table(mut self, name: &str, columns: &[&str]) -> Self {
        self.tables.push(TableMetadata {
            name: name.to_string(),
            columns: columns.iter().map(ToString::to_string).collect(),
            ..TableMetadata::default()
        });
        self
    }

    /// Sets the primary key of a previously added table.
    #[must_use]
    pub fn primary_key(mut self, table: &str, columns: &[&str]) -> Self {
        if let Some(meta) = self.find(table) {
            meta.primary_key = columns.iter().map(ToString::to_string).collect();
        }
        self
    }

    /// Adds a foreign key to a previously added table. Leave
    /// `references_columns` empty to reference the primary key.
    #[must_use]
    pub fn foreign_key(
        mut self,
        table: &str,
        columns: &[&str],
        references_table: &str,
        references_columns: &[&str],
    ) -> Self {
        if let Some(meta) = self.find(table) {
            meta.foreign_keys.push(ForeignKey {
                columns: columns.iter().map(ToString::to_string).collect(),
                references_table: references_table.to_string(),
                references_columns: references_columns.iter().map(ToString::to_string).collect(),
            });
        }
        self
    }

    /// Builds the schema info.
    #[must_use]
    pub fn build(self) -> SchemaInfo {
        SchemaInfo::from_tables(&self.tables)
    }

    fn find(&mut self, table: &str) -> Option<&mut TableMetadata> {
        self.tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(table))
    }
}
