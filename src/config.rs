//! Project configuration (`ormshift.toml`).
//!
//! ```toml
//! database_url = "sqlite://app.db"
//! migrations_dir = "migrations"
//!
//! [migrations]
//! table_name = "__ormshift_migrations"
//! name_max_length = 250
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OrmshiftError, OrmshiftResult};
use crate::migrate::MigratorConfig;

pub const CONFIG_FILE_NAME: &str = "ormshift.toml";

/// Settings shared by the CLI and embedding applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection URL, e.g. `postgres://localhost/app` or `sqlite://app.db`.
    pub database_url: Option<String>,

    /// Directory holding `*.up.sql` / `*.down.sql` migration scripts.
    pub migrations_dir: PathBuf,

    /// Tracking table settings.
    pub migrations: MigratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            migrations_dir: PathBuf::from("migrations"),
            migrations: MigratorConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> OrmshiftResult<Self> {
        toml::from_str(content).map_err(|e| OrmshiftError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> OrmshiftResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| OrmshiftError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from `explicit` if given, else the first file found among
    /// `./ormshift.toml` and the user config directory. Falls back to
    /// defaults when no file exists.
    ///
    /// An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> OrmshiftResult<Self> {
        if let Some(path) = explicit {
            debug!("Loading config from {}", path.display());
            return Self::from_file(path);
        }
        for path in Self::search_paths() {
            if path.is_file() {
                debug!("Loading config from {}", path.display());
                return Self::from_file(&path);
            }
        }
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Candidate locations in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("ormshift").join("config.toml"));
        }
        paths
    }
}
