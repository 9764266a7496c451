//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET  /                           - Page 1, every category
//! GET  /{segment}                  - "Page{n}" or a category name
//! GET  /{category}/{page}          - "{category}/Page{n}"
//! GET  /Products/{page}            - "Products/Page{n}"
//! GET  /Home, /Home/Index          - Same as /
//!
//! # Cart
//! GET  /cart                       - Cart page
//! POST /cart/add                   - Add a product
//! POST /cart/update                - Set a line's quantity
//! POST /cart/remove                - Remove a line
//!
//! # Checkout
//! GET  /checkout                   - Shipping form
//! POST /checkout                   - Place the order
//! GET  /checkout/complete/{id}     - Confirmation
//!
//! # Account
//! GET  /account/login              - Login page
//! POST /account/login              - Login action
//! POST /account/logout             - Logout action
//!
//! # Admin (requires the Admins role)
//! GET  /admin                      - Redirect to /admin/products
//! ...  /admin/products, /admin/orders (see `admin`)
//! ANY  /admin/*                    - Admin "not found" page
//!
//! # Health
//! GET  /health                     - Liveness
//! GET  /health/ready               - Readiness (both databases)
//! ```
//!
//! Static paths win over the segment routes, so a category can never be
//! named `cart`, `checkout`, `account`, `admin`, `health`, `Home` or
//! `Products`.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_sessions::{SessionManagerLayer, SessionStore};

use sportsstore_core::Cart;

use crate::error::AppError;
use crate::middleware::status_page_middleware;
use crate::models::session::CurrentUser;
use crate::state::AppState;

/// Directory static assets are served from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Header data every full page renders: cart summary and login state.
#[derive(Clone, Default)]
pub struct PageChrome {
    pub cart_items: u32,
    pub cart_total: String,
    pub user_name: Option<String>,
    pub is_admin: bool,
}

impl PageChrome {
    #[must_use]
    pub fn new(cart: &Cart, user: Option<&CurrentUser>) -> Self {
        Self {
            cart_items: cart.item_count(),
            cart_total: cart.total_value().display(),
            user_name: user.map(|u| u.user_name.clone()),
            is_admin: user.is_some_and(CurrentUser::is_admin),
        }
    }
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/Home", get(catalog::index))
        .route("/Home/Index", get(catalog::index))
        .route("/Products/{page}", get(catalog::products_page))
        .route("/{segment}", get(catalog::segment))
        .route("/{category}/{page}", get(catalog::category_page))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place_order))
        .route("/complete/{id}", get(checkout::complete))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
        .nest("/admin", admin::routes())
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .fallback(not_found)
}

/// Assemble the application: static files, sessions, routes, status pages.
///
/// Generic over the session store so the binary can choose memory or
/// `PostgreSQL` at startup and tests can use memory.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    routes()
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            status_page_middleware,
        ))
        .layer(session_layer)
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("page".to_owned())
}
