//! Account route handlers: login and logout.
//!
//! Login checks the name and password against the identity store and keeps a
//! [`CurrentUser`] in the session. Only members of the admin role have
//! anything to log in for; the rest of the site is anonymous.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::safe_return_url;
use crate::middleware::{OptionalUser, SessionCart, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::PageChrome;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Where a successful login goes when no `return_url` was given.
const DEFAULT_AFTER_LOGIN: &str = "/admin";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub user_name: String,
    pub password: String,
    pub return_url: Option<String>,
}

/// Query parameters of the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub return_url: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/login.html")]
pub struct LoginTemplate {
    pub chrome: PageChrome,
    pub user_name: String,
    pub return_url: String,
    pub error: Option<String>,
}

fn after_login(return_url: Option<&str>) -> String {
    safe_return_url(return_url)
        .unwrap_or(DEFAULT_AFTER_LOGIN)
        .to_owned()
}

/// Display the login page.
#[instrument(skip(cart, user))]
pub async fn login_page(
    Query(query): Query<LoginQuery>,
    cart: SessionCart,
    user: OptionalUser,
) -> LoginTemplate {
    LoginTemplate {
        chrome: PageChrome::new(&cart, user.0.as_ref()),
        user_name: String::new(),
        return_url: after_login(query.return_url.as_deref()),
        error: None,
    }
}

/// Handle login form submission.
///
/// A wrong name or password re-renders the form with 401. Other failures
/// propagate as errors.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    cart: SessionCart,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let return_url = after_login(form.return_url.as_deref());

    let user = match AuthService::new(state.identity_pool())
        .login(&form.user_name, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!(user_name = %form.user_name, "Login failed");
            let page = LoginTemplate {
                chrome: PageChrome::new(&cart, None),
                user_name: form.user_name,
                return_url,
                error: Some("Invalid name or password".to_owned()),
            };
            return Ok((StatusCode::UNAUTHORIZED, page).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    set_sentry_user(&current.id, &current.user_name);
    tracing::info!(user_id = %current.id, user_name = %current.user_name, "Logged in");

    Ok(Redirect::to(&return_url).into_response())
}

/// Handle logout. The cart is kept.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
