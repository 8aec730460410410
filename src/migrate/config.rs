//! Tracking table configuration.

use serde::{Deserialize, Serialize};

use crate::error::{OrmshiftError, OrmshiftResult};
use crate::schema::{ColumnName, TableName};

pub const DEFAULT_TABLE_NAME: &str = "__ormshift_migrations";
pub const DEFAULT_NAME_COLUMN: &str = "name";
pub const DEFAULT_APPLIED_AT_COLUMN: &str = "applied_at";
pub const DEFAULT_NAME_MAX_LENGTH: u32 = 250;

/// Where and how applied migrations are recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    pub table_name: String,
    pub name_column: String,
    pub applied_at_column: String,
    pub name_max_length: u32,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            applied_at_column: DEFAULT_APPLIED_AT_COLUMN.to_string(),
            name_max_length: DEFAULT_NAME_MAX_LENGTH,
        }
    }
}

impl MigratorConfig {
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    pub fn with_name_column(mut self, name: &str) -> Self {
        self.name_column = name.to_string();
        self
    }

    pub fn with_applied_at_column(mut self, name: &str) -> Self {
        self.applied_at_column = name.to_string();
        self
    }

    pub fn with_name_max_length(mut self, len: u32) -> Self {
        self.name_max_length = len;
        self
    }

    /// Validate identifiers and limits, returning the parsed names.
    pub fn validate(&self) -> OrmshiftResult<(TableName, ColumnName, ColumnName)> {
        let table = TableName::new(&self.table_name)?;
        let name_column = ColumnName::new(&self.name_column)?;
        let applied_at_column = ColumnName::new(&self.applied_at_column)?;

        if name_column.eq_ignore_case(applied_at_column.as_str()) {
            return Err(OrmshiftError::DuplicateColumn {
                column: applied_at_column.to_string(),
                table: table.to_string(),
            });
        }
        if self.name_max_length == 0 {
            return Err(OrmshiftError::Config(
                "name_max_length must be greater than zero".to_string(),
            ));
        }

        Ok((table, name_column, applied_at_column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MigratorConfig::default();
        assert_eq!(config.table_name, "__ormshift_migrations");
        assert_eq!(config.name_column, "name");
        assert_eq!(config.applied_at_column, "applied_at");
        assert_eq!(config.name_max_length, 250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: MigratorConfig = toml::from_str("table_name = \"app.schema_history\"").unwrap();
        assert_eq!(config.table_name, "app.schema_history");
        assert_eq!(config.name_column, "name");
    }

    #[test]
    fn test_invalid_config() {
        let bad_table = MigratorConfig::default().with_table_name("bad-name");
        assert!(matches!(
            bad_table.validate(),
            Err(OrmshiftError::InvalidIdentifier(_))
        ));

        let same_columns = MigratorConfig::default().with_applied_at_column("NAME");
        assert!(matches!(
            same_columns.validate(),
            Err(OrmshiftError::DuplicateColumn { .. })
        ));

        let zero = MigratorConfig::default().with_name_max_length(0);
        assert!(matches!(zero.validate(), Err(OrmshiftError::Config(_))));
    }
}
