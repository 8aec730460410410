//! Table descriptions.

use super::column::{Column, ColumnParams};
use super::ident::TableName;
use crate::error::{OrmshiftError, OrmshiftResult};

/// A table: validated name plus ordered, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: TableName,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: TableName) -> Self {
        Self {
            name,
            columns: Vec::new(),
        }
    }

    /// Validate and create an empty table in one step.
    pub fn named(name: &str) -> OrmshiftResult<Self> {
        Ok(Self::new(TableName::new(name)?))
    }

    /// Append a column.
    ///
    /// Fails with `InvalidIdentifier` for a malformed name and with
    /// `DuplicateColumn` when a column of the same name (ignoring case)
    /// already exists.
    pub fn add_column(&mut self, params: ColumnParams) -> OrmshiftResult<&Column> {
        let column = Column::new(params)?;
        if self.column(column.name().as_str()).is_some() {
            return Err(OrmshiftError::DuplicateColumn {
                column: column.name().to_string(),
                table: self.name.to_string(),
            });
        }
        self.columns.push(column);
        Ok(&self.columns[self.columns.len() - 1])
    }

    /// Chaining variant of [`Table::add_column`].
    pub fn with_column(mut self, params: ColumnParams) -> OrmshiftResult<Self> {
        self.add_column(params)?;
        Ok(self)
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name().eq_ignore_case(name))
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_primary_key())
    }

    pub fn has_auto_increment(&self) -> bool {
        self.columns.iter().any(|c| c.is_auto_increment())
    }
}
