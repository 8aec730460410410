//! ormshift: migration runner CLI
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations from ./migrations
//! ormshift --database-url sqlite://app.db migrate up
//!
//! # Revert the last applied migration
//! ormshift migrate down
//!
//! # Show migration state as JSON
//! ormshift migrate status --json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use ormshift::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ormshift")]
#[command(version)]
#[command(about = "Versioned schema migrations for PostgreSQL and SQLite", long_about = None)]
#[command(after_help = "EXAMPLES:
    ormshift --database-url sqlite://app.db migrate up
    ormshift --dir db/migrations migrate status --json
    ormshift tables")]
struct Cli {
    /// Database connection URL
    #[arg(long, global = true, env = "ORMSHIFT_DATABASE_URL")]
    database_url: Option<String>,

    /// Path to ormshift.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Migrations directory
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// List tables in the database
    Tables {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Revert the last applied migration
    Down,
    /// Show applied and pending migrations
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "ormshift=debug" } else { "ormshift=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let url = cli
        .database_url
        .clone()
        .or_else(|| config.database_url.clone())
        .context("No database URL. Use --database-url, set ORMSHIFT_DATABASE_URL or add database_url to ormshift.toml")?;
    let db = Database::connect(&url)
        .await
        .with_context(|| format!("Failed to connect to {}", url))?;

    match cli.command {
        Commands::Tables { json } => list_tables(&db, json).await,
        Commands::Migrate { action } => {
            let dir = cli.dir.clone().unwrap_or_else(|| config.migrations_dir.clone());
            let mut migrator = build_migrator(db, &config, &dir).await?;
            match action {
                MigrateAction::Up => migrate_up(&mut migrator).await,
                MigrateAction::Down => migrate_down(&mut migrator).await,
                MigrateAction::Status { json } => migrate_status(&migrator, json),
            }
        }
    }
}

async fn build_migrator(db: Database, config: &Config, dir: &Path) -> Result<Migrator> {
    let mut migrator = Migrator::new(db, config.migrations.clone()).await?;
    for migration in load_sql_migrations(dir)? {
        migrator.add(migration)?;
    }
    Ok(migrator)
}

async fn migrate_up(migrator: &mut Migrator) -> Result<()> {
    let pending: Vec<String> = migrator
        .status()
        .into_iter()
        .filter(|s| !s.applied)
        .map(|s| s.name)
        .collect();

    if pending.is_empty() {
        println!("{}", "No migrations to apply.".green());
        return Ok(());
    }
    println!("{} {} migration(s) to apply", "Found:".cyan(), pending.len());

    let result = migrator.apply_all_migrations().await;
    for name in &pending {
        if migrator.is_applied(name) {
            println!("  {} {}", "✓".green(), name);
        }
    }
    result?;

    println!("{}", "All migrations applied.".green().bold());
    Ok(())
}

async fn migrate_down(migrator: &mut Migrator) -> Result<()> {
    let Some(last) = migrator
        .status()
        .into_iter()
        .rev()
        .find(|s| s.applied)
    else {
        println!("{}", "No applied migration to revert.".yellow());
        return Ok(());
    };

    migrator.revert_last_applied_migration().await?;
    println!("  {} Reverted {}", "✓".green(), last.name.cyan());
    Ok(())
}

fn migrate_status(migrator: &Migrator, json: bool) -> Result<()> {
    let status = migrator.status();
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "  Migration table: {}",
        migrator.config().table_name.green()
    );
    println!();
    if status.is_empty() {
        println!("  {} No migrations found", "○".dimmed());
        return Ok(());
    }
    for entry in &status {
        if entry.applied {
            println!("  {} {}", "✓".green(), entry.name);
        } else {
            println!("  {} {} {}", "○".dimmed(), entry.name, "(pending)".yellow());
        }
    }
    Ok(())
}

async fn list_tables(db: &Database, json: bool) -> Result<()> {
    let tables = db.db_schema().table_names().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
    } else if tables.is_empty() {
        println!("{}", "(no tables)".dimmed());
    } else {
        for table in &tables {
            println!("  {}", table.cyan());
        }
    }
    Ok(())
}
