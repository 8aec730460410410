//! Schema introspection.
//!
//! Existence checks answer with a plain boolean: any query or decoding error
//! is reported as "not found". Use [`DbSchema::table_names`] when a failure
//! must be told apart from absence.

use std::sync::Arc;

use tracing::debug;

use crate::builder::Dialect;
use crate::engine::Executor;
use crate::error::OrmshiftResult;
use crate::schema::TableName;

/// Answers existence questions about tables and columns.
#[derive(Clone)]
pub struct DbSchema {
    executor: Arc<dyn Executor>,
    dialect: Arc<dyn Dialect>,
}

impl std::fmt::Debug for DbSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSchema")
            .field("dialect", &self.dialect.name())
            .finish()
    }
}

impl DbSchema {
    pub fn new(executor: Arc<dyn Executor>, dialect: Arc<dyn Dialect>) -> Self {
        Self { executor, dialect }
    }

    /// All table names reported by the dialect's listing query.
    pub async fn table_names(&self) -> OrmshiftResult<Vec<String>> {
        let rows = self.executor.query(self.dialect.list_tables_sql(), &[]).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    /// Whether a table named `name` (ignoring case) exists.
    ///
    /// A qualifier naming the dialect's default schema is optional:
    /// `public.history` and `history` are the same table on PostgreSQL.
    pub async fn has_table(&self, name: &str) -> bool {
        let wanted = self.dialect.unqualified(name);
        match self.table_names().await {
            Ok(names) => names
                .iter()
                .any(|n| self.dialect.unqualified(n).eq_ignore_ascii_case(wanted)),
            Err(e) => {
                debug!("has_table({}) treated as missing: {}", name, e);
                false
            }
        }
    }

    /// Whether `table` has a column named `column` (ignoring case).
    ///
    /// Table names that are not valid identifiers are never sent to the
    /// database.
    pub async fn has_column(&self, table: &str, column: &str) -> bool {
        let Ok(table_name) = TableName::new(table) else {
            debug!("has_column: invalid table name {:?}", table);
            return false;
        };
        let sql = self.dialect.describe_columns_sql(&table_name);
        match self.executor.columns(&sql).await {
            Ok(columns) => columns.iter().any(|c| c.eq_ignore_ascii_case(column)),
            Err(e) => {
                debug!("has_column({}, {}) treated as missing: {}", table, column, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Sqlite;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    async fn schema_with(ddl: &str) -> (SqlitePool, DbSchema) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        pool.exec_script(ddl).await.unwrap();
        let schema = DbSchema::new(Arc::new(pool.clone()), Arc::new(Sqlite));
        (pool, schema)
    }

    #[tokio::test]
    async fn test_has_table_ignores_case() {
        let (_pool, schema) = schema_with("CREATE TABLE Product (id INTEGER)").await;
        assert!(schema.has_table("product").await);
        assert!(schema.has_table("PRODUCT").await);
        assert!(!schema.has_table("customer").await);
        assert_eq!(schema.table_names().await.unwrap(), vec!["Product".to_string()]);
    }

    #[tokio::test]
    async fn test_has_column() {
        let (_pool, schema) = schema_with("CREATE TABLE product (id INTEGER, Sku TEXT)").await;
        assert!(schema.has_column("product", "sku").await);
        assert!(schema.has_column("PRODUCT", "ID").await);
        assert!(!schema.has_column("product", "price").await);
        assert!(!schema.has_column("customer", "id").await);
    }

    #[tokio::test]
    async fn test_has_table_accepts_default_schema() {
        let (_pool, schema) = schema_with("CREATE TABLE main.history (id INTEGER)").await;
        assert!(schema.has_table("history").await);
        assert!(schema.has_table("main.history").await);
        assert!(schema.has_table("MAIN.History").await);
        assert!(!schema.has_table("aux.history").await);
        assert!(schema.has_column("main.history", "id").await);
    }

    #[tokio::test]
    async fn test_invalid_table_name_is_false() {
        let (_pool, schema) = schema_with("CREATE TABLE product (id INTEGER)").await;
        assert!(!schema.has_column("product; DROP TABLE product", "id").await);
        assert!(schema.has_table("product").await);
    }

    #[tokio::test]
    async fn test_errors_collapse_to_false() {
        let (pool, schema) = schema_with("CREATE TABLE product (id INTEGER)").await;
        pool.close().await;
        assert!(!schema.has_table("product").await);
        assert!(!schema.has_column("product", "id").await);
        assert!(schema.table_names().await.is_err());
    }
}
