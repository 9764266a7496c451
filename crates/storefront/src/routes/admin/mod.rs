//! Admin area: catalog and order management.
//!
//! Every handler takes [`RequireAdmin`], so anonymous visitors are sent to
//! the login page and users outside the admin role get 403. Paths under
//! `/admin` that match no route get the admin shell with a 404 status after
//! the same check, so the admin area never reveals which paths exist to
//! anyone who cannot use it.

pub mod orders;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::OriginalUri,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{any, get, post},
};
use tower_sessions::Session;

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::session::{CurrentUser, keys};
use crate::state::AppState;

/// Admin page chrome: who is logged in and any one-shot message.
#[derive(Clone, Default)]
pub struct AdminChrome {
    pub user_name: String,
    pub message: Option<String>,
}

impl AdminChrome {
    /// Build the chrome, taking the pending message out of the session.
    pub async fn take(session: &Session, user: &CurrentUser) -> Self {
        let message = session
            .remove::<String>(keys::ADMIN_MESSAGE)
            .await
            .ok()
            .flatten();
        Self {
            user_name: user.user_name.clone(),
            message,
        }
    }
}

/// Queue a message for the next admin page.
pub async fn flash(session: &Session, message: String) {
    if let Err(e) = session.insert(keys::ADMIN_MESSAGE, message).await {
        tracing::warn!(error = %e, "Failed to store admin message");
    }
}

/// Admin "not found" page.
#[derive(Template, WebTemplate)]
#[template(path = "admin/not_found.html")]
pub struct AdminNotFoundTemplate {
    pub admin: AdminChrome,
    pub path: String,
}

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/products", get(products::index).post(products::save))
        .route("/products/new", get(products::new))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/ship", post(orders::ship))
        .route("/orders/{id}/reset", post(orders::reset))
        // Claims every other admin path so two-segment paths never fall
        // through to the public `/{category}/{page}` route.
        .route("/{*rest}", any(fallback))
        .fallback(fallback)
}

/// `/admin`: the product list is the admin home.
async fn index(RequireAdmin(_user): RequireAdmin) -> Redirect {
    Redirect::to("/admin/products")
}

/// Catch-all for unknown admin paths.
async fn fallback(
    RequireAdmin(user): RequireAdmin,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let page = AdminNotFoundTemplate {
        admin: AdminChrome::take(&session, &user).await,
        path: uri.path().to_owned(),
    };
    (StatusCode::NOT_FOUND, page).into_response()
}
