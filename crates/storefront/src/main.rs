//! Sports Store storefront binary.
//!
//! Serves the catalog, cart, checkout and admin area on port 3000.
//!
//! # Startup
//!
//! 1. Configuration from the environment (`.env` honoured)
//! 2. Sentry, then tracing (text locally, JSON with `STORE_LOG_JSON`)
//! 3. Pools for the `store` and `identity` databases
//! 4. Seeding: sample catalog and admin user, when missing
//! 5. Session store (memory or `PostgreSQL`) and the router
//!
//! Migrations are NOT run here. Run them explicitly via:
//! `cargo run -p sportsstore-cli -- migrate all`

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use axum::middleware as axum_middleware;
use sentry::integrations::tracing as sentry_tracing;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::MemoryStore;
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sportsstore_storefront::config::{SessionStoreKind, StoreConfig};
use sportsstore_storefront::middleware::{
    EXPIRED_SESSION_SWEEP, create_session_layer, postgres_store, request_id_middleware,
    spawn_expired_session_cleanup,
};
use sportsstore_storefront::state::AppState;
use sportsstore_storefront::{db, routes, seed};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StoreConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
///
/// Events under the credentials target are kept out of Sentry.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    sentry_event_kind(*metadata.level(), metadata.target())
}

fn sentry_event_kind(level: tracing::Level, target: &str) -> sentry_tracing::EventFilter {
    if target == seed::CREDENTIALS_TARGET {
        return sentry_tracing::EventFilter::Ignore;
    }
    match level {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            format!(
                "sportsstore_storefront=info,{}=info,tower_http=debug",
                seed::CREDENTIALS_TARGET
            )
            .into()
        });

    let use_json = std::env::var("STORE_LOG_JSON").is_ok();
    let json_layer =
        use_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!use_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Wrap the application in request id, tracing and Sentry layers.
fn instrument(app: Router) -> Router {
    app.layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StoreConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let catalog_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create store database pool");
    let identity_pool = db::create_pool(&config.identity_database_url)
        .await
        .expect("Failed to create identity database pool");
    tracing::info!("Database pools created");

    seed::ensure_catalog_populated(&catalog_pool)
        .await
        .expect("Failed to seed catalog");
    // Outside development the admin password must be configured.
    seed::ensure_identity_populated(
        &identity_pool,
        config.admin_password.as_ref(),
        config.environment.is_development(),
    )
    .await
        .expect("Failed to seed identity store");

    let addr = config.socket_addr();
    let session_kind = config.session_store;
    let state = AppState::new(config, catalog_pool, identity_pool);

    let app = match session_kind {
        SessionStoreKind::Memory => {
            let layer = create_session_layer(MemoryStore::default(), state.config());
            routes::app(state, layer)
        }
        SessionStoreKind::Postgres => {
            let store = postgres_store(state.catalog_pool());
            spawn_expired_session_cleanup(store.clone(), EXPIRED_SESSION_SWEEP);
            let layer = create_session_layer(store, state.config());
            routes::app(state, layer)
        }
    };
    tracing::info!(store = ?session_kind, "Session store selected");

    let app = instrument(app);

    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::sentry_tracing::EventFilter;

    #[test]
    fn test_credentials_never_reach_sentry() {
        for level in [tracing::Level::ERROR, tracing::Level::WARN, tracing::Level::INFO] {
            assert_eq!(
                sentry_event_kind(level, seed::CREDENTIALS_TARGET).bits(),
                EventFilter::Ignore.bits()
            );
        }
    }

    #[test]
    fn test_sentry_event_kinds() {
        assert_eq!(
            sentry_event_kind(tracing::Level::WARN, "sportsstore_storefront::routes").bits(),
            EventFilter::Event.bits()
        );
        assert_eq!(
            sentry_event_kind(tracing::Level::INFO, "sportsstore_storefront::seed").bits(),
            EventFilter::Breadcrumb.bits()
        );
        assert_eq!(
            sentry_event_kind(tracing::Level::TRACE, "sportsstore_storefront::db").bits(),
            EventFilter::Ignore.bits()
        );
    }
}
