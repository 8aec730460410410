//! # ormshift
//!
//! Dialect-polymorphic SQL generation, schema introspection and versioned
//! migrations for PostgreSQL, SQLite and SQL Server.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use ormshift::prelude::*;
//!
//! let db = Database::connect("sqlite://app.db").await?;
//!
//! let mut product = Table::named("product")?;
//! product.add_column(ColumnParams::new("id", ColumnType::Integer).primary_key().auto_increment())?;
//! product.add_column(ColumnParams::new("sku", ColumnType::Varchar).size(50).not_null())?;
//! db.exec(&db.sql_builder().create_table(&product)?, &[]).await?;
//!
//! let values = ColumnsValues::new().with("sku", "Z-100")?;
//! let (sql, args) = db.sql_builder().insert_with_values(product.name(), &values);
//! db.exec(&sql, &args).await?;
//! ```
//!
//! SQL is always written with `@name` placeholders; each dialect rewrites
//! them into what its driver expects:
//!
//! | Dialect    | Placeholder | Identifier quoting |
//! |------------|-------------|--------------------|
//! | PostgreSQL | `$1`        | `"name"`           |
//! | SQLite     | `$1`        | `"name"`           |
//! | SQL Server | `@name`     | `[name]`           |
//!
//! ```
//! use ormshift::builder::{SqlBuilder, SqlServer};
//!
//! let builder = SqlBuilder::for_dialect(SqlServer);
//! assert_eq!(builder.quote_identifier("order"), "[order]");
//! ```

pub mod builder;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod introspect;
pub mod migrate;
pub mod parser;
pub mod schema;
pub mod value;

pub mod prelude {
    pub use crate::builder::{BoundQuery, Dialect, Postgres, SqlBuilder, SqlServer, Sqlite};
    pub use crate::config::Config;
    pub use crate::database::{Database, DriverRegistry};
    pub use crate::engine::{ExecResult, Executor, Row};
    pub use crate::error::*;
    pub use crate::introspect::DbSchema;
    pub use crate::migrate::{
        Migration, MigrationStatus, Migrator, MigratorConfig, SqlMigration, load_sql_migrations,
    };
    pub use crate::schema::{
        Column, ColumnName, ColumnParams, ColumnType, ColumnsValues, Table, TableName,
    };
    pub use crate::value::{NamedArg, Value, named};
}

/// Connect with the default driver registry.
///
/// Shorthand for [`database::Database::connect`].
pub async fn connect(url: &str) -> error::OrmshiftResult<database::Database> {
    database::Database::connect(url).await
}
