//! Authentication service.
//!
//! Password login against the identity store, plus user creation for the
//! seeder and the CLI.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;

use crate::db::IdentityRepository;
use crate::db::RepositoryError;
use crate::models::user::IdentityUser;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum user name length, matching the column width.
const MAX_USER_NAME_LENGTH: usize = 256;

/// Length of generated passwords.
const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Authentication service.
pub struct AuthService<'a> {
    identity: IdentityRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service over the identity pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            identity: IdentityRepository::new(pool),
        }
    }

    /// Create a user with a password and role memberships.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUserName` if the name is blank or too long.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the name is taken.
    pub async fn create_user(
        &self,
        user_name: &str,
        email: Option<&str>,
        password: &str,
        roles: &[&str],
    ) -> Result<IdentityUser, AuthError> {
        let user_name = validate_user_name(user_name)?;
        validate_password(password)?;
        let password_hash = off_runtime(password, hash_password).await?;

        self.identity
            .create(user_name, email, &password_hash, roles)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with user name and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the name or password is wrong.
    pub async fn login(&self, user_name: &str, password: &str) -> Result<IdentityUser, AuthError> {
        let (user, password_hash) = self
            .identity
            .get_with_password_hash(user_name.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        off_runtime(password, move |password| verify_password(password, &password_hash)).await?;

        Ok(user)
    }
}

/// Generate a random alphanumeric password.
#[must_use]
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

fn validate_user_name(user_name: &str) -> Result<&str, AuthError> {
    let trimmed = user_name.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidUserName("user name is required".to_owned()));
    }
    if trimmed.len() > MAX_USER_NAME_LENGTH {
        return Err(AuthError::InvalidUserName(format!(
            "user name must be at most {MAX_USER_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Run an Argon2 operation on the blocking pool so a burst of logins does not
/// stall the request workers.
async fn off_runtime<T, F>(password: &str, op: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce(&str) -> Result<T, AuthError> + Send + 'static,
{
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || op(&password))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
