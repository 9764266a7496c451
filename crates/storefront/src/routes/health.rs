//! Health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable unless both databases answer.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let catalog = sqlx::query("SELECT 1").execute(state.catalog_pool()).await;
    let identity = sqlx::query("SELECT 1").execute(state.identity_pool()).await;

    match (catalog, identity) {
        (Ok(_), Ok(_)) => StatusCode::OK,
        (catalog, identity) => {
            tracing::warn!(
                catalog_ok = catalog.is_ok(),
                identity_ok = identity.is_ok(),
                "Readiness check failed"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
