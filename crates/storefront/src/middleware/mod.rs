//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (add unique ID to each request)
//! 4. Static files (served before any session work)
//! 5. Session layer (tower-sessions, memory or `PostgreSQL` store)
//! 6. Status pages (HTML for non-HTML error responses)
//! 7. Routes, with authentication and the cart as extractors

pub mod auth;
pub mod cart;
pub mod request_id;
pub mod session;
pub mod status_pages;

pub use auth::{OptionalUser, RequireAdmin, clear_current_user, set_current_user};
pub use cart::SessionCart;
pub use request_id::request_id_middleware;
pub use session::{
    EXPIRED_SESSION_SWEEP, SESSION_COOKIE_NAME, create_session_layer, postgres_store,
    spawn_expired_session_cleanup,
};
pub use status_pages::status_page_middleware;
