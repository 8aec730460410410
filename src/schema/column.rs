//! Column descriptions.

use std::fmt;
use std::str::FromStr;

use super::ident::ColumnName;
use crate::error::{OrmshiftError, OrmshiftResult};

/// Abstract column type. Each dialect maps it to its own native type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Varchar,
    Monetary,
    DateTime,
    Decimal,
    Boolean,
    Binary,
}

impl ColumnType {
    pub const ALL: [ColumnType; 7] = [
        ColumnType::Integer,
        ColumnType::Varchar,
        ColumnType::Monetary,
        ColumnType::DateTime,
        ColumnType::Decimal,
        ColumnType::Boolean,
        ColumnType::Binary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Varchar => "varchar",
            ColumnType::Monetary => "monetary",
            ColumnType::DateTime => "datetime",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Binary => "binary",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = OrmshiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ColumnType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| OrmshiftError::InvalidColumnType(s.to_string()))
    }
}

/// Parameters for [`Column::new`] and `Table::add_column`.
#[derive(Debug, Clone)]
pub struct ColumnParams {
    pub name: String,
    pub column_type: ColumnType,
    pub size: u32,
    pub primary_key: bool,
    pub not_null: bool,
    pub auto_increment: bool,
}

impl ColumnParams {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            size: 0,
            primary_key: false,
            not_null: false,
            auto_increment: false,
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Mark as primary key. Primary key columns are always `NOT NULL`.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// An immutable column description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: ColumnName,
    column_type: ColumnType,
    size: u32,
    primary_key: bool,
    not_null: bool,
    auto_increment: bool,
}

impl Column {
    pub fn new(params: ColumnParams) -> OrmshiftResult<Self> {
        Ok(Self {
            name: ColumnName::new(&params.name)?,
            column_type: params.column_type,
            size: params.size,
            primary_key: params.primary_key,
            not_null: params.not_null,
            auto_increment: params.auto_increment,
        })
    }

    pub fn name(&self) -> &ColumnName {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Declared size; only meaningful for [`ColumnType::Varchar`].
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_parse() {
        assert_eq!("VarChar".parse::<ColumnType>().unwrap(), ColumnType::Varchar);
        assert_eq!("datetime".parse::<ColumnType>().unwrap(), ColumnType::DateTime);
        assert!(matches!(
            "uuid".parse::<ColumnType>(),
            Err(OrmshiftError::InvalidColumnType(_))
        ));
    }

    #[test]
    fn test_column_new_validates_name() {
        let col = Column::new(ColumnParams::new("id", ColumnType::Integer).primary_key()).unwrap();
        assert!(col.is_primary_key());
        assert!(col.is_not_null());
        assert!(!col.is_auto_increment());

        let err = Column::new(ColumnParams::new("2nd", ColumnType::Integer)).unwrap_err();
        assert!(matches!(err, OrmshiftError::InvalidIdentifier(_)));
    }
}
