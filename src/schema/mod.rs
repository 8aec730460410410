//! Identifier and value model.
//!
//! Callers describe tables abstractly:
//!
//! ```
//! use ormshift::schema::{ColumnParams, ColumnType, Table};
//!
//! let mut table = Table::named("product").unwrap();
//! table.add_column(ColumnParams::new("id", ColumnType::Integer).primary_key().auto_increment()).unwrap();
//! table.add_column(ColumnParams::new("sku", ColumnType::Varchar).size(50).not_null()).unwrap();
//! assert_eq!(table.columns().len(), 2);
//! ```

pub mod column;
pub mod ident;
pub mod table;
pub mod values;

pub use column::{Column, ColumnParams, ColumnType};
pub use ident::{ColumnName, TableName};
pub use table::Table;
pub use values::ColumnsValues;
