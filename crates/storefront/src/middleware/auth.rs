//! Authentication middleware and extractors.
//!
//! The logged-in user is a [`CurrentUser`] stored in the session at login.
//! Admin routes take [`RequireAdmin`]; pages that only show who is logged in
//! take [`OptionalUser`].

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::session::{CurrentUser, keys};

/// Path of the login page.
pub const LOGIN_PATH: &str = "/account/login";

/// Extractor that requires a logged-in member of the admin role.
///
/// Anonymous visitors are redirected to the login page with the requested
/// path as `return_url`; logged-in users without the role get 403.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(user): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.user_name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

/// Rejection when admin access is required but not granted.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not logged in; carries the path to come back to.
    RedirectToLogin(String),
    /// Logged in without the admin role.
    Forbidden,
    /// The session layer is missing from the stack.
    NoSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(return_url) => Redirect::to(&login_url(&return_url)).into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::NoSession)?;

        let user: CurrentUser = session
            .get(keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                // Nested routers see a stripped uri; return to the full one.
                let uri = parts
                    .extensions
                    .get::<OriginalUri>()
                    .map_or(&parts.uri, |original| &original.0);
                let return_url = uri
                    .path_and_query()
                    .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned());
                AuthRejection::RedirectToLogin(return_url)
            })?;

        if !user.is_admin() {
            tracing::warn!(user = %user.user_name, path = %parts.uri.path(), "Admin access denied");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAdmin`, this never rejects the request.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Login page URL that returns to `return_url` afterwards.
#[must_use]
pub fn login_url(return_url: &str) -> String {
    format!("{LOGIN_PATH}?return_url={}", urlencoding::encode(return_url))
}

/// Accept a post-login redirect target only if it stays on this site.
///
/// Local means a path starting with a single `/`; `//host` and `/\host` are
/// treated by browsers as other origins and are refused. Browsers drop tabs
/// and newlines while parsing, so `/\t/host` is `//host` to them: control
/// characters and backslashes are refused anywhere in the value.
#[must_use]
pub fn safe_return_url(candidate: Option<&str>) -> Option<&str> {
    let url = candidate?.trim();
    if url.chars().any(|c| c.is_control() || c == '\\') {
        return None;
    }
    let mut chars = url.chars();
    match (chars.next(), chars.next()) {
        (Some('/'), None) => Some(url),
        (Some('/'), Some(second)) if second != '/' => Some(url),
        _ => None,
    }
}

/// Log a user in: rotate the session id, then store the user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// The cart stays in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(keys::CURRENT_USER).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_url() {
        assert_eq!(safe_return_url(Some("/admin/products")), Some("/admin/products"));
        assert_eq!(safe_return_url(Some("/")), Some("/"));
        assert_eq!(safe_return_url(Some("//evil.example")), None);
        assert_eq!(safe_return_url(Some("/\\evil.example")), None);
        assert_eq!(safe_return_url(Some("/\t/evil.example")), None);
        assert_eq!(safe_return_url(Some("/\n/evil.example")), None);
        assert_eq!(safe_return_url(Some("/\r\n/evil.example")), None);
        assert_eq!(safe_return_url(Some("/Soccer\\..\\evil")), None);
        assert_eq!(safe_return_url(Some("/Soccer/Page2")), Some("/Soccer/Page2"));
        assert_eq!(safe_return_url(Some("https://evil.example")), None);
        assert_eq!(safe_return_url(Some("")), None);
        assert_eq!(safe_return_url(None), None);
    }

    #[test]
    fn test_login_url_encodes_return_path() {
        assert_eq!(
            login_url("/admin/orders?x=1"),
            "/account/login?return_url=%2Fadmin%2Forders%3Fx%3D1"
        );
    }
}
