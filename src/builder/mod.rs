//! Dialect-polymorphic SQL builder.
//!
//! [`SqlBuilder`] owns the shared generator: quoted column lists, `@name`
//! placeholders, `WHERE a = @a AND b = @b` clauses and `CREATE TABLE`
//! assembly. Everything that differs between databases goes through the
//! [`Dialect`] chosen at construction.
//!
//! ```
//! use ormshift::builder::{Postgres, SqlBuilder};
//! use ormshift::schema::{ColumnsValues, TableName};
//!
//! let builder = SqlBuilder::for_dialect(Postgres);
//! let table = TableName::new("product").unwrap();
//! let values = ColumnsValues::new().with("sku", "Z").unwrap().with("id", 1).unwrap();
//!
//! let (sql, args) = builder.insert_with_values(&table, &values);
//! assert_eq!(sql, r#"INSERT INTO "product" ("id", "sku") VALUES (@id, @sku)"#);
//! assert_eq!(args.len(), 2);
//! ```

pub mod dialect;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;


use std::sync::Arc;

pub use dialect::{Dialect, ParamStyle};
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use sqlserver::SqlServer;

use crate::error::{OrmshiftError, OrmshiftResult};
use crate::parser::bind_named_args;
use crate::schema::{Column, ColumnName, ColumnType, ColumnsValues, Table, TableName};
use crate::value::{NamedArg, Value};

/// Arguments after named-placeholder translation.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundArgs {
    /// Values in placeholder index order.
    Positional(Vec<Value>),
    /// Name/value pairs passed through unchanged.
    Named(Vec<NamedArg>),
}

/// SQL text plus the arguments in the form its driver expects.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    pub args: BoundArgs,
}

impl BoundQuery {
    /// Values in binding order.
    pub fn values(&self) -> Vec<Value> {
        match &self.args {
            BoundArgs::Positional(values) => values.clone(),
            BoundArgs::Named(args) => args.iter().map(|a| a.value.clone()).collect(),
        }
    }
}

/// Shared DDL/DML generator bound to one dialect.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    dialect: Arc<dyn Dialect>,
}

impl SqlBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self { dialect }
    }

    pub fn for_dialect<D: Dialect + 'static>(dialect: D) -> Self {
        Self::new(Arc::new(dialect))
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Quote an identifier; dotted names are quoted part by part.
    pub fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|p| self.dialect.quote_identifier(p))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn column_type_as_string(&self, column_type: ColumnType) -> &'static str {
        self.dialect.column_type(column_type)
    }

    // ---------------------------------------------------------------------
    // DDL
    // ---------------------------------------------------------------------

    /// Fails with `UnsupportedTable` when the dialect cannot express the
    /// table's key layout.
    pub fn create_table(&self, table: &Table) -> OrmshiftResult<String> {
        self.dialect.check_table(table)?;
        let mut defs: Vec<String> = table
            .columns()
            .iter()
            .map(|c| self.dialect.column_definition(c))
            .collect();
        if let Some(pk) = self.dialect.primary_key_clause(table) {
            defs.push(pk);
        }
        Ok(format!(
            "CREATE TABLE {} ({})",
            self.dialect.quote_table(table.name()),
            defs.join(", ")
        ))
    }

    pub fn drop_table(&self, table: &TableName) -> String {
        format!("DROP TABLE {}", self.dialect.quote_table(table))
    }

    pub fn alter_table_add_column(&self, table: &TableName, column: &Column) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.dialect.quote_table(table),
            self.dialect.column_definition(column)
        )
    }

    pub fn alter_table_drop_column(&self, table: &TableName, column: &ColumnName) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.dialect.quote_table(table),
            self.dialect.quote_identifier(column.as_str())
        )
    }

    // ---------------------------------------------------------------------
    // DML
    // ---------------------------------------------------------------------

    pub fn insert(&self, table: &TableName, columns: &[ColumnName]) -> String {
        let placeholders: Vec<String> = columns.iter().map(placeholder).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.dialect.quote_table(table),
            self.column_list(columns),
            placeholders.join(", ")
        )
    }

    pub fn insert_with_values(&self, table: &TableName, values: &ColumnsValues) -> (String, Vec<NamedArg>) {
        (self.insert(table, &values.to_columns()), values.to_named_args())
    }

    pub fn update(&self, table: &TableName, columns: &[ColumnName], where_columns: &[ColumnName]) -> String {
        let assignments: Vec<String> = columns.iter().map(|c| self.equals(c)).collect();
        format!(
            "UPDATE {} SET {}{}",
            self.dialect.quote_table(table),
            assignments.join(", "),
            self.where_clause(where_columns)
        )
    }

    /// Arguments are the SET values followed by the WHERE values, each
    /// sorted by column name.
    ///
    /// A column may appear on only one side: both would share one `@name`
    /// placeholder and so one bound value. Fails with `ConflictingColumn`
    /// otherwise.
    pub fn update_with_values(
        &self,
        table: &TableName,
        values: &ColumnsValues,
        where_values: &ColumnsValues,
    ) -> OrmshiftResult<(String, Vec<NamedArg>)> {
        let columns = values.to_columns();
        if let Some(column) = columns.iter().find(|c| where_values.contains(c.as_str())) {
            return Err(OrmshiftError::ConflictingColumn {
                column: column.to_string(),
                table: table.to_string(),
            });
        }
        let sql = self.update(table, &columns, &where_values.to_columns());
        let mut args = values.to_named_args();
        args.extend(where_values.to_named_args());
        Ok((sql, args))
    }

    pub fn delete(&self, table: &TableName, where_columns: &[ColumnName]) -> String {
        format!(
            "DELETE FROM {}{}",
            self.dialect.quote_table(table),
            self.where_clause(where_columns)
        )
    }

    pub fn delete_with_values(&self, table: &TableName, where_values: &ColumnsValues) -> (String, Vec<NamedArg>) {
        (
            self.delete(table, &where_values.to_columns()),
            where_values.to_named_args(),
        )
    }

    /// An empty column list selects `*`.
    pub fn select(&self, table: &TableName, columns: &[ColumnName], where_columns: &[ColumnName]) -> String {
        let projection = if columns.is_empty() {
            "*".to_string()
        } else {
            self.column_list(columns)
        };
        format!(
            "SELECT {} FROM {}{}",
            projection,
            self.dialect.quote_table(table),
            self.where_clause(where_columns)
        )
    }

    pub fn select_with_values(
        &self,
        table: &TableName,
        columns: &[ColumnName],
        where_values: &ColumnsValues,
    ) -> (String, Vec<NamedArg>) {
        (
            self.select(table, columns, &where_values.to_columns()),
            where_values.to_named_args(),
        )
    }

    /// Append the dialect's pagination clause for a 1-based page number.
    ///
    /// Pages before the first are clamped to offset 0; zero rows per page
    /// leaves the statement unchanged.
    pub fn select_with_pagination(&self, select_sql: &str, rows_per_page: u64, page_number: u64) -> String {
        let sql = select_sql.trim_end().trim_end_matches(';');
        if rows_per_page == 0 {
            return sql.to_string();
        }
        let offset = rows_per_page.saturating_mul(page_number.saturating_sub(1));
        format!("{}{}", sql, self.dialect.pagination(rows_per_page, offset))
    }

    /// Translate `@name` placeholders into the dialect's parameter style.
    pub fn interoperate_sql_command_with_named_args(&self, sql: &str, args: &[NamedArg]) -> BoundQuery {
        bind_named_args(sql, args, self.dialect.param_style())
    }

    fn column_list(&self, columns: &[ColumnName]) -> String {
        columns
            .iter()
            .map(|c| self.dialect.quote_identifier(c.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn equals(&self, column: &ColumnName) -> String {
        format!(
            "{} = {}",
            self.dialect.quote_identifier(column.as_str()),
            placeholder(column)
        )
    }

    fn where_clause(&self, columns: &[ColumnName]) -> String {
        if columns.is_empty() {
            return String::new();
        }
        let conditions: Vec<String> = columns.iter().map(|c| self.equals(c)).collect();
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn placeholder(column: &ColumnName) -> String {
    format!("@{}", column)
}
