//! Statement execution for ormshift.
//!
//! [`Executor`] is the thin execution handle the builder, introspector and
//! migrator talk to. It is implemented for sqlx PostgreSQL and SQLite pools.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPool, PgRow, Postgres};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Column, Row as _, Statement, TypeInfo};

use crate::error::OrmshiftResult;
use crate::value::Value;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Identity of the last inserted row, where the driver reports one.
    pub last_insert_id: Option<i64>,
}

/// A fetched row with its column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Case-insensitive lookup by column name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(|i| self.values.get(i))
    }
}

/// Execution handle over an open database.
///
/// Arguments are positional and bound in order; see
/// [`SqlBuilder::interoperate_sql_command_with_named_args`](crate::builder::SqlBuilder::interoperate_sql_command_with_named_args)
/// for turning `@name` placeholders into that form.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a statement that returns no rows.
    async fn exec(&self, sql: &str, args: &[Value]) -> OrmshiftResult<ExecResult>;

    /// Run a query and fetch every row.
    async fn query(&self, sql: &str, args: &[Value]) -> OrmshiftResult<Vec<Row>>;

    /// Prepare `sql` and return its result column names without fetching.
    async fn columns(&self, sql: &str) -> OrmshiftResult<Vec<String>>;

    /// Run a script of one or more statements without arguments.
    async fn exec_script(&self, sql: &str) -> OrmshiftResult<()>;

    /// Liveness check.
    async fn ping(&self) -> OrmshiftResult<()>;
}

// -------------------------------------------------------------------------
// PostgreSQL
// -------------------------------------------------------------------------

fn bind_pg<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
        Value::DateTime(v) => query.bind(*v),
    }
}

fn pg_row_values(row: &PgRow) -> Row {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());

    for (i, column) in row.columns().iter().enumerate() {
        columns.push(column.name().to_string());
        let value = match column.type_info().name() {
            "BOOL" => row.try_get::<Option<bool>, _>(i).map(Value::from),
            "INT2" => row
                .try_get::<Option<i16>, _>(i)
                .map(|v| Value::from(v.map(i64::from))),
            "INT4" => row
                .try_get::<Option<i32>, _>(i)
                .map(|v| Value::from(v.map(i64::from))),
            "INT8" => row.try_get::<Option<i64>, _>(i).map(Value::from),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(i)
                .map(|v| Value::from(v.map(f64::from))),
            "FLOAT8" => row.try_get::<Option<f64>, _>(i).map(Value::from),
            "BYTEA" => row.try_get::<Option<Vec<u8>>, _>(i).map(Value::from),
            "TIMESTAMP" => row
                .try_get::<Option<chrono::NaiveDateTime>, _>(i)
                .map(Value::from),
            _ => row.try_get::<Option<String>, _>(i).map(Value::from),
        };
        values.push(value.unwrap_or(Value::Null));
    }

    Row::new(columns, values)
}

#[async_trait]
impl Executor for PgPool {
    async fn exec(&self, sql: &str, args: &[Value]) -> OrmshiftResult<ExecResult> {
        let mut query = sqlx::query(sql);
        for arg in args {
            query = bind_pg(query, arg);
        }
        let result = query.execute(self).await?;
        Ok(ExecResult {
            rows_affected: result.rows_affected(),
            last_insert_id: None,
        })
    }

    async fn query(&self, sql: &str, args: &[Value]) -> OrmshiftResult<Vec<Row>> {
        let mut query = sqlx::query(sql);
        for arg in args {
            query = bind_pg(query, arg);
        }
        let rows = query.fetch_all(self).await?;
        Ok(rows.iter().map(pg_row_values).collect())
    }

    async fn columns(&self, sql: &str) -> OrmshiftResult<Vec<String>> {
        let statement = sqlx::Executor::prepare(self, sql).await?;
        Ok(statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect())
    }

    async fn exec_script(&self, sql: &str) -> OrmshiftResult<()> {
        sqlx::raw_sql(sql).execute(self).await?;
        Ok(())
    }

    async fn ping(&self) -> OrmshiftResult<()> {
        sqlx::query("SELECT 1").execute(self).await?;
        Ok(())
    }
}

// -------------------------------------------------------------------------
// SQLite
// -------------------------------------------------------------------------

fn bind_sqlite<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
        Value::DateTime(v) => query.bind(*v),
    }
}

fn sqlite_row_values(row: &SqliteRow) -> Row {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());

    for (i, column) in row.columns().iter().enumerate() {
        columns.push(column.name().to_string());
        // SQLite types are per value; fall back through the storage classes.
        let value = match column.type_info().name() {
            "NULL" => Ok(Value::Null),
            "BOOLEAN" => row.try_get::<Option<bool>, _>(i).map(Value::from),
            "INTEGER" => row.try_get::<Option<i64>, _>(i).map(Value::from),
            "REAL" => row.try_get::<Option<f64>, _>(i).map(Value::from),
            "BLOB" => row.try_get::<Option<Vec<u8>>, _>(i).map(Value::from),
            _ => row
                .try_get::<Option<String>, _>(i)
                .map(Value::from)
                .or_else(|_| row.try_get::<Option<i64>, _>(i).map(Value::from))
                .or_else(|_| row.try_get::<Option<f64>, _>(i).map(Value::from)),
        };
        values.push(value.unwrap_or(Value::Null));
    }

    Row::new(columns, values)
}

#[async_trait]
impl Executor for SqlitePool {
    async fn exec(&self, sql: &str, args: &[Value]) -> OrmshiftResult<ExecResult> {
        let mut query = sqlx::query(sql);
        for arg in args {
            query = bind_sqlite(query, arg);
        }
        let result = query.execute(self).await?;
        Ok(ExecResult {
            rows_affected: result.rows_affected(),
            last_insert_id: Some(result.last_insert_rowid()),
        })
    }

    async fn query(&self, sql: &str, args: &[Value]) -> OrmshiftResult<Vec<Row>> {
        let mut query = sqlx::query(sql);
        for arg in args {
            query = bind_sqlite(query, arg);
        }
        let rows = query.fetch_all(self).await?;
        Ok(rows.iter().map(sqlite_row_values).collect())
    }

    async fn columns(&self, sql: &str) -> OrmshiftResult<Vec<String>> {
        let statement = sqlx::Executor::prepare(self, sql).await?;
        Ok(statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect())
    }

    async fn exec_script(&self, sql: &str) -> OrmshiftResult<()> {
        sqlx::raw_sql(sql).execute(self).await?;
        Ok(())
    }

    async fn ping(&self) -> OrmshiftResult<()> {
        sqlx::query("SELECT 1").execute(self).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[test]
    fn test_row_lookup() {
        let row = Row::new(
            vec!["ID".into(), "sku".into()],
            vec![Value::Int(1), Value::Text("Z".into())],
        );
        assert_eq!(row.get_by_name("id"), Some(&Value::Int(1)));
        assert_eq!(row.get(1), Some(&Value::Text("Z".into())));
        assert_eq!(row.get_by_name("missing"), None);
    }

    #[tokio::test]
    async fn test_sqlite_exec_and_query() {
        let pool = memory_pool().await;
        pool.exec_script("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, score REAL)")
            .await
            .unwrap();

        let result = pool
            .exec(
                "INSERT INTO t (name, score) VALUES ($1, $2)",
                &[Value::from("alpha"), Value::from(1.5)],
            )
            .await
            .unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.last_insert_id, Some(1));

        let rows = pool
            .query("SELECT id, name, score FROM t WHERE name = $1", &[Value::from("alpha")])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_by_name("id"), Some(&Value::Int(1)));
        assert_eq!(rows[0].get_by_name("name"), Some(&Value::Text("alpha".into())));
        assert_eq!(rows[0].get_by_name("score"), Some(&Value::Float(1.5)));
    }

    #[tokio::test]
    async fn test_sqlite_columns_of_empty_result() {
        let pool = memory_pool().await;
        pool.exec_script("CREATE TABLE t (id INTEGER, label TEXT)")
            .await
            .unwrap();

        let columns = pool.columns("SELECT * FROM t WHERE 1=0").await.unwrap();
        assert_eq!(columns, vec!["id".to_string(), "label".to_string()]);
        assert!(pool.columns("SELECT * FROM missing WHERE 1=0").await.is_err());
    }

    #[tokio::test]
    async fn test_sqlite_ping() {
        let pool = memory_pool().await;
        assert!(pool.ping().await.is_ok());
        pool.close().await;
        assert!(pool.ping().await.is_err());
    }
}
