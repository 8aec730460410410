//! Versioned migration runner.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use super::config::MigratorConfig;
use super::tracking::TrackingTable;
use crate::database::Database;
use crate::error::{BoxError, OrmshiftError, OrmshiftResult};

/// A reversible schema change with a stable identity.
///
/// The name is the key under which the migration is recorded as applied, so
/// it must not change once the migration has shipped.
#[async_trait]
pub trait Migration: Send + Sync {
    fn name(&self) -> &str;

    async fn up(&self, db: &Database) -> Result<(), BoxError>;

    async fn down(&self, db: &Database) -> Result<(), BoxError>;
}

/// Registration entry as reported by [`Migrator::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub name: String,
    pub applied: bool,
}

/// Applies and reverts registered migrations, recording each applied
/// identity in the tracking table.
///
/// Mutating operations take `&mut self`; share a `Migrator` across tasks
/// only behind external synchronization.
pub struct Migrator {
    db: Database,
    config: MigratorConfig,
    tracking: TrackingTable,
    migrations: Vec<Box<dyn Migration>>,
    applied: BTreeSet<String>,
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("config", &self.config)
            .field("registered", &self.migrations.len())
            .field("applied", &self.applied)
            .finish()
    }
}

impl Migrator {
    /// Validate the configuration and database, make sure the tracking table
    /// exists and load the identities already recorded there.
    pub async fn new(db: Database, config: MigratorConfig) -> OrmshiftResult<Self> {
        let tracking = TrackingTable::from_config(&config)?;
        db.validate().await?;

        tracking.ensure(&db).await.map_err(OrmshiftError::tracking)?;
        let applied = tracking.load(&db).await.map_err(OrmshiftError::tracking)?;
        debug!("Loaded {} applied migration(s)", applied.len());

        Ok(Self {
            db,
            config,
            tracking,
            migrations: Vec::new(),
            applied,
        })
    }

    /// Register a migration. Registration order is execution order.
    pub fn add<M: Migration + 'static>(&mut self, migration: M) -> OrmshiftResult<&mut Self> {
        self.add_boxed(Box::new(migration))
    }

    pub fn add_boxed(&mut self, migration: Box<dyn Migration>) -> OrmshiftResult<&mut Self> {
        let name = migration.name();
        if name.is_empty() || name.chars().count() > self.tracking.name_max_length() as usize {
            return Err(OrmshiftError::Config(format!(
                "Migration name '{}' must be 1 to {} characters long",
                name,
                self.tracking.name_max_length()
            )));
        }
        if self.migrations.iter().any(|m| m.name() == name) {
            return Err(OrmshiftError::DuplicateMigration(name.to_string()));
        }
        self.migrations.push(migration);
        Ok(self)
    }

    /// Run `up` for every registered migration not yet applied, in
    /// registration order.
    ///
    /// Stops at the first failure; migrations applied before it stay applied
    /// and later ones are not attempted.
    pub async fn apply_all_migrations(&mut self) -> OrmshiftResult<()> {
        for migration in &self.migrations {
            let name = migration.name();
            if self.applied.contains(name) {
                debug!("Migration '{}' already applied", name);
                continue;
            }

            info!("Applying migration '{}'", name);
            migration
                .up(&self.db)
                .await
                .map_err(|source| OrmshiftError::MigrationApplyFailure {
                    name: name.to_string(),
                    source,
                })?;
            self.tracking
                .record(&self.db, name)
                .await
                .map_err(OrmshiftError::tracking)?;
            self.applied.insert(name.to_string());
        }
        Ok(())
    }

    /// Run `down` for the last registered migration that is applied.
    ///
    /// "Last" follows registration order, not the time of application.
    /// Does nothing when no registered migration is applied.
    pub async fn revert_last_applied_migration(&mut self) -> OrmshiftResult<()> {
        let Some(migration) = self
            .migrations
            .iter()
            .rev()
            .find(|m| self.applied.contains(m.name()))
        else {
            info!("No applied migration to revert");
            return Ok(());
        };
        let name = migration.name().to_string();

        info!("Reverting migration '{}'", name);
        migration
            .down(&self.db)
            .await
            .map_err(|source| OrmshiftError::MigrationRevertFailure {
                name: name.clone(),
                source,
            })?;
        self.tracking
            .remove(&self.db, &name)
            .await
            .map_err(OrmshiftError::tracking)?;
        self.applied.remove(&name);
        Ok(())
    }

    pub fn is_applied(&self, name: &str) -> bool {
        self.applied.contains(name)
    }

    /// Every recorded identity, sorted, including ones not registered here.
    pub fn applied_migrations(&self) -> Vec<&str> {
        self.applied.iter().map(String::as_str).collect()
    }

    /// Registered migrations in order with their applied state.
    pub fn status(&self) -> Vec<MigrationStatus> {
        self.migrations
            .iter()
            .map(|m| MigrationStatus {
                name: m.name().to_string(),
                applied: self.applied.contains(m.name()),
            })
            .collect()
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Script {
        name: &'static str,
        up: &'static str,
        down: &'static str,
    }

    #[async_trait]
    impl Migration for Script {
        fn name(&self) -> &str {
            self.name
        }

        async fn up(&self, db: &Database) -> Result<(), BoxError> {
            db.exec_script(self.up).await?;
            Ok(())
        }

        async fn down(&self, db: &Database) -> Result<(), BoxError> {
            db.exec_script(self.down).await?;
            Ok(())
        }
    }

    fn create(name: &'static str, table: &'static str) -> Script {
        let (up, down) = match table {
            "product" => ("CREATE TABLE product (id INTEGER)", "DROP TABLE product"),
            "customer" => ("CREATE TABLE customer (id INTEGER)", "DROP TABLE customer"),
            "invoice" => ("CREATE TABLE invoice (id INTEGER)", "DROP TABLE invoice"),
            _ => unreachable!(),
        };
        Script { name, up, down }
    }

    fn broken(name: &'static str) -> Script {
        Script {
            name,
            up: "CREATE TABLE broken (",
            down: "DROP TABLE never_created",
        }
    }

    async fn memory_db() -> Database {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    async fn migrator(db: &Database) -> Migrator {
        Migrator::new(db.clone(), MigratorConfig::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_new_creates_tracking_table_once() {
        let db = memory_db().await;
        assert!(!db.db_schema().has_table("__ormshift_migrations").await);

        let first = migrator(&db).await;
        assert!(db.db_schema().has_table("__ormshift_migrations").await);
        assert!(db.db_schema().has_column("__ormshift_migrations", "applied_at").await);
        assert!(first.applied_migrations().is_empty());

        // Second construction finds the existing table.
        let second = migrator(&db).await;
        assert!(second.applied_migrations().is_empty());
    }

    #[tokio::test]
    async fn test_apply_is_idempotent_across_instances() {
        let db = memory_db().await;

        let mut first = migrator(&db).await;
        first.add(create("m1", "product")).unwrap();
        first.add(create("m2", "customer")).unwrap();
        first.apply_all_migrations().await.unwrap();
        assert!(first.is_applied("m1"));
        assert!(first.is_applied("m2"));

        let mut second = migrator(&db).await;
        second.add(create("m1", "product")).unwrap();
        second.add(create("m2", "customer")).unwrap();
        assert_eq!(second.applied_migrations(), vec!["m1", "m2"]);
        // Running `up` again would fail on the existing tables.
        second.apply_all_migrations().await.unwrap();
        second.apply_all_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn test_revert_last_applied_only() {
        let db = memory_db().await;
        let mut migrator = migrator(&db).await;
        migrator.add(create("m1", "product")).unwrap();
        migrator.add(create("m2", "customer")).unwrap();
        migrator.apply_all_migrations().await.unwrap();

        migrator.revert_last_applied_migration().await.unwrap();
        assert!(migrator.is_applied("m1"));
        assert!(!migrator.is_applied("m2"));
        assert!(db.db_schema().has_table("product").await);
        assert!(!db.db_schema().has_table("customer").await);

        migrator.revert_last_applied_migration().await.unwrap();
        assert!(migrator.applied_migrations().is_empty());

        // Nothing left to revert.
        migrator.revert_last_applied_migration().await.unwrap();

        let reloaded = Migrator::new(db.clone(), MigratorConfig::default())
            .await
            .unwrap();
        assert!(reloaded.applied_migrations().is_empty());
    }

    #[tokio::test]
    async fn test_apply_stops_at_first_failure() {
        let db = memory_db().await;
        let mut migrator = migrator(&db).await;
        migrator.add(create("m1", "product")).unwrap();
        migrator.add(broken("m2")).unwrap();
        migrator.add(create("m3", "invoice")).unwrap();

        let err = migrator.apply_all_migrations().await.unwrap_err();
        assert!(matches!(err, OrmshiftError::MigrationApplyFailure { ref name, .. } if name == "m2"));
        assert!(migrator.is_applied("m1"));
        assert!(!migrator.is_applied("m2"));
        assert!(!migrator.is_applied("m3"));
        assert!(!db.db_schema().has_table("invoice").await);

        let status = migrator.status();
        assert_eq!(
            status,
            vec![
                MigrationStatus { name: "m1".into(), applied: true },
                MigrationStatus { name: "m2".into(), applied: false },
                MigrationStatus { name: "m3".into(), applied: false },
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_down_keeps_migration_applied() {
        let db = memory_db().await;
        let mut migrator = migrator(&db).await;
        migrator
            .add(Script {
                name: "m1",
                up: "CREATE TABLE product (id INTEGER)",
                down: "DROP TABLE never_created",
            })
            .unwrap();
        migrator.apply_all_migrations().await.unwrap();

        let err = migrator.revert_last_applied_migration().await.unwrap_err();
        assert!(matches!(err, OrmshiftError::MigrationRevertFailure { ref name, .. } if name == "m1"));
        assert!(migrator.is_applied("m1"));
    }

    #[tokio::test]
    async fn test_registration_rules() {
        let db = memory_db().await;
        let mut migrator = Migrator::new(
            db.clone(),
            MigratorConfig::default().with_name_max_length(5),
        )
        .await
        .unwrap();

        migrator.add(create("m1", "product")).unwrap();
        assert!(matches!(
            migrator.add(create("m1", "customer")),
            Err(OrmshiftError::DuplicateMigration(name)) if name == "m1"
        ));
        assert!(matches!(
            migrator.add(create("too_long", "customer")),
            Err(OrmshiftError::Config(_))
        ));
        assert_eq!(migrator.status().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_tracking_table() {
        let db = memory_db().await;
        let config = MigratorConfig::default()
            .with_table_name("schema_history")
            .with_name_column("version");
        let mut migrator = Migrator::new(db.clone(), config).await.unwrap();
        migrator.add(create("m1", "product")).unwrap();
        migrator.apply_all_migrations().await.unwrap();

        let rows = db
            .query("SELECT version FROM schema_history", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0).and_then(|v| v.as_str()), Some("m1"));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let db = memory_db().await;
        let err = Migrator::new(db, MigratorConfig::default().with_table_name("bad name"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrmshiftError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_qualified_tracking_table_found_on_reconstruction() {
        let db = memory_db().await;
        let config = MigratorConfig::default().with_table_name("main.history");

        let mut first = Migrator::new(db.clone(), config.clone()).await.unwrap();
        first.add(create("m1", "product")).unwrap();
        first.apply_all_migrations().await.unwrap();

        let second = Migrator::new(db.clone(), config).await.unwrap();
        assert_eq!(second.applied_migrations(), vec!["m1"]);
    }

    #[tokio::test]
    async fn test_record_failure_is_tracking_failure() {
        let db = memory_db().await;
        let mut migrator = migrator(&db).await;
        migrator
            .add(Script {
                name: "m1",
                up: "CREATE TABLE product (id INTEGER); DROP TABLE __ormshift_migrations",
                down: "DROP TABLE product",
            })
            .unwrap();
        migrator.add(create("m2", "customer")).unwrap();

        let err = migrator.apply_all_migrations().await.unwrap_err();
        assert!(matches!(err, OrmshiftError::TrackingFailure(_)));
        assert!(!migrator.is_applied("m1"));
        assert!(!migrator.is_applied("m2"));
        assert!(!db.db_schema().has_table("customer").await);
    }

    #[tokio::test]
    async fn test_remove_failure_is_tracking_failure() {
        let db = memory_db().await;
        let mut migrator = migrator(&db).await;
        migrator
            .add(Script {
                name: "m1",
                up: "CREATE TABLE product (id INTEGER)",
                down: "DROP TABLE product; DROP TABLE __ormshift_migrations",
            })
            .unwrap();
        migrator.apply_all_migrations().await.unwrap();

        let err = migrator.revert_last_applied_migration().await.unwrap_err();
        assert!(matches!(err, OrmshiftError::TrackingFailure(_)));
        assert!(migrator.is_applied("m1"));
    }

    #[tokio::test]
    async fn test_tracking_table_creation_failure() {
        let db = memory_db().await;
        // A view is not listed as a table, so creation is attempted and fails.
        db.exec_script("CREATE VIEW __ormshift_migrations AS SELECT 1 AS name")
            .await
            .unwrap();

        let err = Migrator::new(db, MigratorConfig::default()).await.unwrap_err();
        assert!(matches!(err, OrmshiftError::TrackingFailure(_)));
    }
}
