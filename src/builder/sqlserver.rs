use super::dialect::{Dialect, ParamStyle, unsupported_table};
use crate::error::OrmshiftResult;
use crate::schema::{Column, ColumnType, Table};

/// SQL Server dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn column_type(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer => "BIGINT",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Monetary => "MONEY",
            ColumnType::DateTime => "DATETIME2",
            ColumnType::Decimal => "FLOAT",
            ColumnType::Boolean => "BIT",
            ColumnType::Binary => "VARBINARY(MAX)",
        }
    }

    fn text_type(&self) -> &'static str {
        "VARCHAR(MAX)"
    }

    fn column_definition(&self, column: &Column) -> String {
        let mut def = format!(
            "{} {}",
            self.quote_identifier(column.name().as_str()),
            self.type_declaration(column)
        );
        if column.is_auto_increment() {
            def.push_str(" IDENTITY (1, 1)");
        }
        if column.is_not_null() {
            def.push_str(" NOT NULL");
        }
        def
    }

    fn param_style(&self) -> ParamStyle {
        ParamStyle::Named
    }

    fn list_tables_sql(&self) -> &'static str {
        "SELECT CASE WHEN TABLE_SCHEMA = 'dbo' THEN TABLE_NAME \
         ELSE TABLE_SCHEMA + '.' + TABLE_NAME END AS table_name \
         FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_TYPE = 'BASE TABLE'"
    }

    fn default_schema(&self) -> &'static str {
        "dbo"
    }

    fn check_table(&self, table: &Table) -> OrmshiftResult<()> {
        if table.columns().iter().filter(|c| c.is_auto_increment()).count() > 1 {
            return Err(unsupported_table(
                self,
                table,
                "at most one IDENTITY column is allowed",
            ));
        }
        Ok(())
    }

    fn quote_identifier(&self, part: &str) -> String {
        format!("[{}]", part.replace(']', "]]"))
    }

    // OFFSET ... FETCH requires an ORDER BY in the statement.
    fn pagination(&self, rows: u64, offset: u64) -> String {
        format!(" OFFSET {} ROWS FETCH NEXT {} ROWS ONLY", offset, rows)
    }
}
