//! Identity user management commands.
//!
//! # Environment Variables
//!
//! - `IDENTITY_DATABASE_URL` - `PostgreSQL` connection string (or `DATABASE_URL`)
//! - `STORE_USER_PASSWORD` - Password for the new user; generated when unset

use thiserror::Error;

use sportsstore_storefront::{db, seed};
use sportsstore_storefront::services::auth::{AuthError, AuthService, generate_password};

use super::{MissingDatabaseUrl, database_url};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Config(#[from] MissingDatabaseUrl),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// User already exists.
    #[error("User already exists: {0}")]
    UserExists(String),

    #[error(transparent)]
    Auth(AuthError),
}

/// Create a user with the given roles.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError::InvalidEmail` for an address without `@` and `.`,
/// `UserError::UserExists` when the name is taken, and `UserError::Auth` when
/// the name or password is rejected.
pub async fn create(
    user_name: &str,
    email: Option<&str>,
    roles: &[String],
) -> Result<i32, UserError> {
    // Basic email validation
    if let Some(email) = email
        && (!email.contains('@') || !email.contains('.'))
    {
        return Err(UserError::InvalidEmail(email.to_owned()));
    }

    let password = match std::env::var("STORE_USER_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => {
            let generated = generate_password();
            tracing::info!(
                target: seed::CREDENTIALS_TARGET,
                "Generated password for {user_name}: {generated} (shown only once)"
            );
            generated
        }
    };

    let database_url = database_url("IDENTITY_DATABASE_URL")?;

    tracing::info!("Connecting to identity database...");
    let pool = db::create_pool(&database_url).await?;

    let roles: Vec<&str> = roles.iter().map(String::as_str).collect();
    tracing::info!("Creating user: {} (roles: {:?})", user_name, roles);

    let user = AuthService::new(&pool)
        .create_user(user_name, email, &password, &roles)
        .await
        .map_err(|e| match e {
            AuthError::UserAlreadyExists => UserError::UserExists(user_name.to_owned()),
            other => UserError::Auth(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Name: {}, Roles: {}",
        user.id,
        user.user_name,
        user.roles.join(", ")
    );

    Ok(user.id.as_i32())
}
