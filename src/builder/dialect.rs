//! Dialect strategy for the shared SQL generator.

use std::fmt;

use crate::error::{OrmshiftError, OrmshiftResult};
use crate::schema::{Column, ColumnType, Table, TableName};

/// How `@name` placeholders are rewritten for the target driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// Keep `@name` placeholders and pass name/value pairs through.
    Named,
    /// Number each distinct name `$1`, `$2`, ... in first-appearance order.
    /// With `coerce_bools`, booleans are bound as `0`/`1` integers.
    Positional { coerce_bools: bool },
    /// Replace every placeholder occurrence with a bare `?`.
    Anonymous,
}

/// Per-dialect hooks used by [`SqlBuilder`](super::SqlBuilder).
///
/// A dialect is chosen once when a builder or database is constructed.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Short dialect name (`postgres`, `sqlite`, `sqlserver`).
    fn name(&self) -> &'static str;

    /// Native type name for an abstract column type.
    fn column_type(&self, column_type: ColumnType) -> &'static str;

    /// Generic text type, used for unsized varchar columns.
    fn text_type(&self) -> &'static str;

    /// DDL fragment for one column (`"name" TYPE [NOT NULL] ...`).
    fn column_definition(&self, column: &Column) -> String;

    fn param_style(&self) -> ParamStyle;

    /// Query returning one table name per row in its first column.
    ///
    /// Tables in [`Dialect::default_schema`] are listed unqualified, others
    /// as `schema.table`.
    fn list_tables_sql(&self) -> &'static str;

    /// Schema that unqualified table names resolve to.
    fn default_schema(&self) -> &'static str;

    /// Strip a leading default-schema qualifier, ignoring case.
    fn unqualified<'a>(&self, table: &'a str) -> &'a str {
        match table.split_once('.') {
            Some((schema, rest)) if schema.eq_ignore_ascii_case(self.default_schema()) => rest,
            _ => table,
        }
    }

    /// Quote a single identifier part.
    fn quote_identifier(&self, part: &str) -> String {
        format!("\"{}\"", part.replace('"', "\"\""))
    }

    /// Quote a possibly schema-qualified table name part by part.
    fn quote_table(&self, table: &TableName) -> String {
        table
            .parts()
            .map(|p| self.quote_identifier(p))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Type declaration for a column, including the varchar size.
    fn type_declaration(&self, column: &Column) -> String {
        match column.column_type() {
            ColumnType::Varchar if column.size() > 0 => {
                format!("{}({})", self.column_type(ColumnType::Varchar), column.size())
            }
            ColumnType::Varchar => self.text_type().to_string(),
            other => self.column_type(other).to_string(),
        }
    }

    /// Reject table layouts the dialect cannot express.
    fn check_table(&self, _table: &Table) -> OrmshiftResult<()> {
        Ok(())
    }

    /// Table-level primary key clause, if any.
    fn primary_key_clause(&self, table: &Table) -> Option<String> {
        named_primary_key(self, table)
    }

    /// Clause appended to a SELECT for pagination.
    fn pagination(&self, rows: u64, offset: u64) -> String {
        let mut sql = format!(" LIMIT {}", rows);
        if offset > 0 {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        sql
    }

    /// Zero-row query whose result metadata lists the table's columns.
    fn describe_columns_sql(&self, table: &TableName) -> String {
        format!("SELECT * FROM {} WHERE 1=0", self.quote_table(table))
    }
}

/// Comma-joined, quoted primary key column list, or `None` without keys.
pub(crate) fn primary_key_list<D: Dialect + ?Sized>(dialect: &D, table: &Table) -> Option<String> {
    let cols: Vec<String> = table
        .primary_key_columns()
        .map(|c| dialect.quote_identifier(c.name().as_str()))
        .collect();
    if cols.is_empty() {
        None
    } else {
        Some(cols.join(", "))
    }
}

/// `CONSTRAINT "PK_<table>" PRIMARY KEY (...)`.
pub(crate) fn named_primary_key<D: Dialect + ?Sized>(dialect: &D, table: &Table) -> Option<String> {
    let cols = primary_key_list(dialect, table)?;
    let constraint = format!("PK_{}", table.name().as_str().replace('.', "_"));
    Some(format!(
        "CONSTRAINT {} PRIMARY KEY ({})",
        dialect.quote_identifier(&constraint),
        cols
    ))
}

pub(crate) fn unsupported_table<D: Dialect + ?Sized>(
    dialect: &D,
    table: &Table,
    reason: impl Into<String>,
) -> OrmshiftError {
    OrmshiftError::UnsupportedTable {
        table: table.name().to_string(),
        dialect: dialect.name(),
        reason: reason.into(),
    }
}
