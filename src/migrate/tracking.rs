//! Reads and writes the migration tracking table.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;

use super::config::MigratorConfig;
use crate::database::Database;
use crate::error::OrmshiftResult;
use crate::schema::{ColumnName, ColumnParams, ColumnType, ColumnsValues, Table, TableName};

/// One row per applied migration: identity plus applied-at timestamp.
#[derive(Debug, Clone)]
pub(crate) struct TrackingTable {
    table: TableName,
    name_column: ColumnName,
    applied_at_column: ColumnName,
    name_max_length: u32,
}

impl TrackingTable {
    pub(crate) fn from_config(config: &MigratorConfig) -> OrmshiftResult<Self> {
        let (table, name_column, applied_at_column) = config.validate()?;
        Ok(Self {
            table,
            name_column,
            applied_at_column,
            name_max_length: config.name_max_length,
        })
    }

    pub(crate) fn name_max_length(&self) -> u32 {
        self.name_max_length
    }

    fn definition(&self) -> OrmshiftResult<Table> {
        Table::new(self.table.clone())
            .with_column(
                ColumnParams::new(self.name_column.as_str(), ColumnType::Varchar)
                    .size(self.name_max_length)
                    .primary_key(),
            )?
            .with_column(
                ColumnParams::new(self.applied_at_column.as_str(), ColumnType::DateTime).not_null(),
            )
    }

    /// Create the table unless it already exists.
    pub(crate) async fn ensure(&self, db: &Database) -> OrmshiftResult<()> {
        if db.db_schema().has_table(self.table.as_str()).await {
            return Ok(());
        }
        let sql = db.sql_builder().create_table(&self.definition()?)?;
        db.exec(&sql, &[]).await?;
        info!("Created migration tracking table '{}'", self.table);
        Ok(())
    }

    pub(crate) async fn load(&self, db: &Database) -> OrmshiftResult<BTreeSet<String>> {
        let builder = db.sql_builder();
        let sql = format!(
            "{} ORDER BY {}",
            builder.select(&self.table, std::slice::from_ref(&self.name_column), &[]),
            builder.quote_identifier(self.name_column.as_str())
        );
        let rows = db.query(&sql, &[]).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    pub(crate) async fn record(&self, db: &Database, name: &str) -> OrmshiftResult<()> {
        let values = ColumnsValues::new()
            .with(self.name_column.as_str(), name)?
            .with(self.applied_at_column.as_str(), Utc::now().naive_utc())?;
        let (sql, args) = db.sql_builder().insert_with_values(&self.table, &values);
        db.exec(&sql, &args).await?;
        Ok(())
    }

    pub(crate) async fn remove(&self, db: &Database, name: &str) -> OrmshiftResult<()> {
        let filter = ColumnsValues::new().with(self.name_column.as_str(), name)?;
        let (sql, args) = db.sql_builder().delete_with_values(&self.table, &filter);
        db.exec(&sql, &args).await?;
        Ok(())
    }
}
