//! Subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;

/// Missing database configuration.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: {0} (or DATABASE_URL)")]
pub struct MissingDatabaseUrl(pub &'static str);

/// Read a database URL, falling back to `DATABASE_URL` like the server does.
///
/// # Errors
///
/// Returns `MissingDatabaseUrl` when neither variable is set.
pub fn database_url(key: &'static str) -> Result<SecretString, MissingDatabaseUrl> {
    std::env::var(key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl(key))
}
