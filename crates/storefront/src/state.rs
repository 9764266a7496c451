//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StoreConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Handlers build their
/// repositories from the pools it hands out; nothing else is shared.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StoreConfig,
    catalog_pool: PgPool,
    identity_pool: PgPool,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog_pool` - Pool for the `store` schema (products, orders, sessions)
    /// * `identity_pool` - Pool for the `identity` schema
    #[must_use]
    pub fn new(config: StoreConfig, catalog_pool: PgPool, identity_pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog_pool,
                identity_pool,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Pool for products, orders and sessions.
    #[must_use]
    pub fn catalog_pool(&self) -> &PgPool {
        &self.inner.catalog_pool
    }

    /// Pool for users and roles.
    #[must_use]
    pub fn identity_pool(&self) -> &PgPool {
        &self.inner.identity_pool
    }
}
