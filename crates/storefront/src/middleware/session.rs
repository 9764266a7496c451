//! Session middleware configuration.
//!
//! Sessions live in memory by default. With `STORE_SESSION_STORE=postgres`
//! they are kept in `store.session` so they survive restarts and can be
//! shared between instances.

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StoreConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sportsstore_session";

/// Idle time after which a session (and its cart) is dropped, in seconds.
const SESSION_IDLE_SECONDS: i64 = 20 * 60;

/// Build the `PostgreSQL` session store over the catalog pool.
///
/// The table is created by the `store` migrations, not by the store itself.
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (never the case for the
/// hardcoded "store" and "session").
#[must_use]
pub fn postgres_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
        .with_schema_name("store")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name")
}

/// How often the server purges expired rows from `store.session`.
pub const EXPIRED_SESSION_SWEEP: Duration = Duration::from_secs(5 * 60);

/// Delete expired sessions from the `PostgreSQL` store every `period`.
///
/// The memory store drops expired sessions itself; the table does not.
pub fn spawn_expired_session_cleanup(store: PostgresStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = store.continuously_delete_expired(period).await {
            tracing::error!(error = %e, "Expired session cleanup stopped");
        }
    })
}

/// Create the session layer over any session store.
///
/// # Arguments
///
/// * `store` - Where session records are kept
/// * `config` - Storefront configuration (for cookie security)
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StoreConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_IDLE_SECONDS),
        ))
        .with_secure(config.uses_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
