//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STORE_DATABASE_URL` - `PostgreSQL` connection string for the `store` schema
//! - `IDENTITY_DATABASE_URL` - `PostgreSQL` connection string for the `identity` schema
//!
//! Both fall back to `DATABASE_URL`.
//!
//! # Migration Files
//!
//! Catalog/order migrations: `crates/storefront/migrations/store/`
//! Identity migrations: `crates/storefront/migrations/identity/`
//!
//! Both sets may target the same database. They share the `_sqlx_migrations`
//! bookkeeping table, so each run ignores versions that belong to the other
//! set.

use sqlx::migrate::Migrator;
use thiserror::Error;

use sportsstore_storefront::db;

use super::{MissingDatabaseUrl, database_url};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] MissingDatabaseUrl),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run `store` schema migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the connection fails, or a
/// migration fails.
pub async fn store() -> Result<(), MigrationError> {
    run(
        "store",
        "STORE_DATABASE_URL",
        sqlx::migrate!("../storefront/migrations/store"),
    )
    .await
}

/// Run `identity` schema migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the connection fails, or a
/// migration fails.
pub async fn identity() -> Result<(), MigrationError> {
    run(
        "identity",
        "IDENTITY_DATABASE_URL",
        sqlx::migrate!("../storefront/migrations/identity"),
    )
    .await
}

async fn run(
    name: &str,
    url_key: &'static str,
    mut migrator: Migrator,
) -> Result<(), MigrationError> {
    let database_url = database_url(url_key)?;

    tracing::info!("Connecting to {name} database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running {name} migrations...");
    migrator.set_ignore_missing(true).run(&pool).await?;

    tracing::info!("{name} migrations complete!");
    Ok(())
}
