//! Versioned schema migrations.
//!
//! Implement [`Migration`] (or load [`SqlMigration`]s from a directory),
//! register them on a [`Migrator`] and apply them:
//!
//! ```rust,ignore
//! use ormshift::prelude::*;
//!
//! let db = Database::connect("sqlite://app.db").await?;
//! let mut migrator = Migrator::new(db, MigratorConfig::default()).await?;
//! for migration in load_sql_migrations("migrations")? {
//!     migrator.add(migration)?;
//! }
//! migrator.apply_all_migrations().await?;
//! ```
//!
//! Applied identities are kept in a tracking table, one row per migration,
//! so re-running against the same database only applies new migrations.

pub mod config;
mod migrator;
mod sql_file;
mod tracking;

pub use config::MigratorConfig;
pub use migrator::{Migration, MigrationStatus, Migrator};
pub use sql_file::{SqlMigration, load_sql_migrations};
