//! Error types for ormshift.

use thiserror::Error;

/// Boxed error used as the cause of a failed migration step.
///
/// Migration bodies may fail with any error type; `?` on an
/// [`OrmshiftError`] converts into it as well.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for ormshift operations.
#[derive(Debug, Error)]
pub enum OrmshiftError {
    /// A table or column name does not match the identifier grammar.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// A column with the same (case-insensitive) name already exists.
    #[error("Column '{column}' already exists in table '{table}'")]
    DuplicateColumn { column: String, table: String },

    /// An update names the same column in its SET and WHERE lists.
    #[error("Column '{column}' appears in both SET and WHERE of an update on '{table}'")]
    ConflictingColumn { column: String, table: String },

    /// The table layout cannot be expressed in the target dialect.
    #[error("Table '{table}' cannot be created on {dialect}: {reason}")]
    UnsupportedTable {
        table: String,
        dialect: &'static str,
        reason: String,
    },

    /// A required collaborator is missing or not usable.
    #[error("Missing dependency {dependency}: {reason}")]
    NilDependency {
        dependency: &'static str,
        reason: String,
    },

    /// A migration's `up` step failed.
    #[error("Failed to apply migration '{name}': {source}")]
    MigrationApplyFailure {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A migration's `down` step failed.
    #[error("Failed to revert migration '{name}': {source}")]
    MigrationRevertFailure {
        name: String,
        #[source]
        source: BoxError,
    },

    /// Creating, reading or writing the tracking table failed.
    #[error("Migration tracking error: {0}")]
    TrackingFailure(#[source] Box<OrmshiftError>),

    /// The database driver rejected a query or statement.
    #[error("Query error: {0}")]
    QueryFailure(String),

    /// The same migration name was registered twice.
    #[error("Migration '{0}' is already registered")]
    DuplicateMigration(String),

    /// Unknown column type name.
    #[error("Invalid column type: '{0}'")]
    InvalidColumnType(String),

    /// No driver is registered for the URL scheme.
    #[error("Unsupported driver: '{0}'")]
    UnsupportedDriver(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrmshiftError {
    /// Wrap an error raised while maintaining the tracking table.
    pub fn tracking(err: OrmshiftError) -> Self {
        Self::TrackingFailure(Box::new(err))
    }

    /// Build a missing-dependency error.
    pub fn nil_dependency(dependency: &'static str, reason: impl Into<String>) -> Self {
        Self::NilDependency {
            dependency,
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for OrmshiftError {
    fn from(e: sqlx::Error) -> Self {
        OrmshiftError::QueryFailure(e.to_string())
    }
}

/// Result type alias for ormshift operations.
pub type OrmshiftResult<T> = Result<T, OrmshiftError>;
