use super::dialect::{Dialect, ParamStyle, primary_key_list};
use crate::schema::{Column, ColumnType, Table};

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn column_type(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer => "BIGINT",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Monetary => "NUMERIC(17,2)",
            ColumnType::DateTime => "TIMESTAMP",
            ColumnType::Decimal => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Binary => "BYTEA",
        }
    }

    fn text_type(&self) -> &'static str {
        "TEXT"
    }

    fn column_definition(&self, column: &Column) -> String {
        let mut def = self.quote_identifier(column.name().as_str());
        def.push(' ');
        if column.is_auto_increment() {
            def.push_str("BIGSERIAL");
        } else {
            def.push_str(&self.type_declaration(column));
        }
        if column.is_not_null() {
            def.push_str(" NOT NULL");
        }
        def
    }

    fn param_style(&self) -> ParamStyle {
        ParamStyle::Positional {
            coerce_bools: false,
        }
    }

    fn list_tables_sql(&self) -> &'static str {
        "SELECT CASE WHEN schemaname = 'public' THEN tablename::text \
         ELSE schemaname::text || '.' || tablename::text END AS table_name \
         FROM pg_catalog.pg_tables \
         WHERE schemaname NOT IN ('pg_catalog', 'information_schema')"
    }

    fn default_schema(&self) -> &'static str {
        "public"
    }

    fn primary_key_clause(&self, table: &Table) -> Option<String> {
        if table.has_auto_increment() {
            primary_key_list(self, table).map(|cols| format!("PRIMARY KEY ({})", cols))
        } else {
            super::dialect::named_primary_key(self, table)
        }
    }
}
