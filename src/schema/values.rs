//! Column → value mappings with deterministic ordering.

use std::collections::BTreeMap;

use super::ident::ColumnName;
use crate::error::OrmshiftResult;
use crate::value::{NamedArg, Value};

/// A mapping from column name to value.
///
/// Column names are matched ignoring case, like [`Table`](super::Table)
/// columns and `@name` placeholders. Every derived list is sorted by the
/// case-folded name, so generated SQL and its argument list line up
/// regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnsValues {
    entries: BTreeMap<String, (ColumnName, Value)>,
}

fn fold(column: &str) -> String {
    column.to_ascii_lowercase()
}

impl ColumnsValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `column`.
    ///
    /// A name differing only in case replaces the existing entry, spelling
    /// included.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> OrmshiftResult<&mut Self> {
        let name = ColumnName::new(column)?;
        self.entries.insert(fold(column), (name, value.into()));
        Ok(self)
    }

    /// Chaining variant of [`ColumnsValues::set`].
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> OrmshiftResult<Self> {
        self.set(column, value)?;
        Ok(self)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries.get(&fold(column)).map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.entries.contains_key(&fold(column))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_columns(&self) -> Vec<ColumnName> {
        self.entries.values().map(|(name, _)| name.clone()).collect()
    }

    pub fn to_named_args(&self) -> Vec<NamedArg> {
        self.entries
            .values()
            .map(|(name, value)| NamedArg::new(name.as_str(), value.clone()))
            .collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.values().map(|(_, v)| v.clone()).collect()
    }
}
