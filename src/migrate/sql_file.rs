//! Migrations stored as SQL scripts on disk.
//!
//! A migrations directory holds pairs of files:
//!
//! ```text
//! migrations/
//!   001_create_product.up.sql
//!   001_create_product.down.sql
//!   002_add_customer.up.sql
//! ```
//!
//! The identity is the part of the file name before `.up.sql`, unless the
//! up script starts with a `-- migration: <name>` header.

use std::fs;
use std::path::Path;

use async_trait::async_trait;

use super::migrator::Migration;
use crate::database::Database;
use crate::error::{BoxError, OrmshiftError, OrmshiftResult};

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";

/// A migration whose steps are SQL scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlMigration {
    pub name: String,
    pub up_sql: String,
    pub down_sql: Option<String>,
}

impl SqlMigration {
    pub fn new(name: impl Into<String>, up_sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            up_sql: up_sql.into(),
            down_sql: None,
        }
    }

    pub fn with_down(mut self, down_sql: impl Into<String>) -> Self {
        self.down_sql = Some(down_sql.into());
        self
    }
}

#[async_trait]
impl Migration for SqlMigration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn up(&self, db: &Database) -> Result<(), BoxError> {
        db.exec_script(&self.up_sql).await?;
        Ok(())
    }

    async fn down(&self, db: &Database) -> Result<(), BoxError> {
        let Some(down_sql) = &self.down_sql else {
            return Err(format!("migration '{}' has no down script", self.name).into());
        };
        db.exec_script(down_sql).await?;
        Ok(())
    }
}

/// Name declared by a leading `-- migration: <name>` comment, if any.
///
/// Only the comment block at the top of the script is searched.
fn header_name(content: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if let Some(name) = line.strip_prefix("-- migration:") {
            let name = name.trim();
            return (!name.is_empty()).then(|| name.to_string());
        }
        if !line.is_empty() && !line.starts_with("--") {
            break;
        }
    }
    None
}

/// Load every `*.up.sql` in `dir`, sorted by file name, with its optional
/// `*.down.sql` partner.
pub fn load_sql_migrations(dir: impl AsRef<Path>) -> OrmshiftResult<Vec<SqlMigration>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(OrmshiftError::Config(format!(
            "Migrations directory not found: {}",
            dir.display()
        )));
    }

    let mut stems = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(stem) = file_name.strip_suffix(UP_SUFFIX) {
            if !stem.is_empty() && entry.path().is_file() {
                stems.push(stem.to_string());
            }
        }
    }
    stems.sort();

    let mut migrations = Vec::with_capacity(stems.len());
    for stem in stems {
        let up_sql = fs::read_to_string(dir.join(format!("{}{}", stem, UP_SUFFIX)))?;
        let down_path = dir.join(format!("{}{}", stem, DOWN_SUFFIX));
        let down_sql = if down_path.is_file() {
            Some(fs::read_to_string(down_path)?)
        } else {
            None
        };
        let name = header_name(&up_sql).unwrap_or(stem);

        if migrations.iter().any(|m: &SqlMigration| m.name == name) {
            return Err(OrmshiftError::DuplicateMigration(name));
        }
        migrations.push(SqlMigration {
            name,
            up_sql,
            down_sql,
        });
    }

    Ok(migrations)
}
