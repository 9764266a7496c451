//! Database operations for the storefront `PostgreSQL` databases.
//!
//! Two schemas, each reached through its own connection string:
//!
//! ## Schema `store` (`STORE_DATABASE_URL`)
//!
//! - `product` - The catalog
//! - `order` - Order headers with shipping details
//! - `order_line` - Order lines, referencing `product` by foreign key
//! - `session` - Tower-sessions storage (only with `STORE_SESSION_STORE=postgres`)
//!
//! ## Schema `identity` (`IDENTITY_DATABASE_URL`)
//!
//! - `user` - Login names and argon2 password hashes
//! - `role` - Role names
//! - `user_role` - Role membership
//!
//! # Store handles
//!
//! Repositories borrow a pool and are built inside each handler, so a handle
//! lives exactly as long as the request that created it.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/{store,identity}/`
//! and run via:
//! ```bash
//! cargo run -p sportsstore-cli -- migrate all
//! ```

pub mod identity;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use identity::IdentityRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique name, dangling product reference).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The caller passed an entity that cannot be stored as given.
    #[error("invalid entity: {0}")]
    Invalid(String),
}

impl RepositoryError {
    /// Map unique and foreign-key violations to `Conflict`, everything else
    /// to `Database`.
    pub(crate) fn from_constraint(err: sqlx::Error, context: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{context}: already exists"));
        }
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_foreign_key_violation()
        {
            return Self::Conflict(format!("{context}: referenced row is missing or in use"));
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create a pool that connects on first use.
///
/// Used by tests that exercise routes which never touch the database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string cannot be parsed.
pub fn create_lazy_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy(database_url.expose_secret())
}
