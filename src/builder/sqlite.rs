use super::dialect::{Dialect, ParamStyle, named_primary_key, unsupported_table};
use crate::error::OrmshiftResult;
use crate::schema::{Column, ColumnType, Table};

/// SQLite dialect.
///
/// SQLite has no boolean storage class, so booleans are bound as `0`/`1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn column_type(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Monetary => "REAL",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Decimal => "REAL",
            ColumnType::Boolean => "INTEGER",
            ColumnType::Binary => "BLOB",
        }
    }

    fn text_type(&self) -> &'static str {
        "TEXT"
    }

    fn column_definition(&self, column: &Column) -> String {
        let name = self.quote_identifier(column.name().as_str());
        // AUTOINCREMENT is only legal on an INTEGER PRIMARY KEY column.
        if column.is_auto_increment() {
            return format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", name);
        }
        let mut def = format!("{} {}", name, self.type_declaration(column));
        if column.is_not_null() {
            def.push_str(" NOT NULL");
        }
        def
    }

    fn param_style(&self) -> ParamStyle {
        ParamStyle::Positional { coerce_bools: true }
    }

    fn list_tables_sql(&self) -> &'static str {
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'"
    }

    fn default_schema(&self) -> &'static str {
        "main"
    }

    /// An AUTOINCREMENT column is the whole primary key, so it must be the
    /// only auto-increment column and the only key column.
    fn check_table(&self, table: &Table) -> OrmshiftResult<()> {
        let auto = table.columns().iter().filter(|c| c.is_auto_increment()).count();
        if auto > 1 {
            return Err(unsupported_table(
                self,
                table,
                "at most one auto-increment column is allowed",
            ));
        }
        if auto == 1 && table.primary_key_columns().any(|c| !c.is_auto_increment()) {
            return Err(unsupported_table(
                self,
                table,
                "an auto-increment column cannot share the primary key with other columns",
            ));
        }
        Ok(())
    }

    fn primary_key_clause(&self, table: &Table) -> Option<String> {
        if table.has_auto_increment() {
            None
        } else {
            named_primary_key(self, table)
        }
    }
}
