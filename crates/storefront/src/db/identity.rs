//! Identity repository: users, roles and role membership.
//!
//! Lives in the `identity` schema, reached through its own pool.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sportsstore_core::UserId;

use super::RepositoryError;
use crate::models::user::IdentityUser;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    user_name: String,
    email: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, roles: Vec<String>) -> (IdentityUser, String) {
        (
            IdentityUser {
                id: UserId::new(self.id),
                user_name: self.user_name,
                email: self.email,
                roles,
                created_at: self.created_at,
            },
            self.password_hash,
        )
    }
}

/// Repository for identity database operations.
pub struct IdentityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IdentityRepository<'a> {
    /// Create a new identity repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, user_name: &str) -> Result<Option<IdentityUser>, RepositoryError> {
        Ok(self
            .get_with_password_hash(user_name)
            .await?
            .map(|(user, _)| user))
    }

    /// Get a user and their password hash by login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_password_hash(
        &self,
        user_name: &str,
    ) -> Result<Option<(IdentityUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, user_name, email, password_hash, created_at
            FROM identity."user"
            WHERE user_name = $1
            "#,
        )
        .bind(user_name)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let roles = self.roles_for(UserId::new(row.id)).await?;
        Ok(Some(row.into_user(roles)))
    }

    /// Names of the roles a user belongs to, sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn roles_for(&self, user_id: UserId) -> Result<Vec<String>, RepositoryError> {
        let roles = sqlx::query_scalar(
            r"
            SELECT r.name
            FROM identity.user_role ur
            JOIN identity.role r ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.name
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(roles)
    }

    /// Create a user with a password hash and role memberships.
    ///
    /// Roles that do not exist yet are created. Everything happens in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_name: &str,
        email: Option<&str>,
        password_hash: &str,
        roles: &[&str],
    ) -> Result<IdentityUser, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO identity."user" (user_name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, user_name, email, password_hash, created_at
            "#,
        )
        .bind(user_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "user name"))?;

        for role in roles {
            sqlx::query(
                r"
                INSERT INTO identity.role (name)
                VALUES ($1)
                ON CONFLICT (name) DO NOTHING
                ",
            )
            .bind(role)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r"
                INSERT INTO identity.user_role (user_id, role_id)
                SELECT $1, id FROM identity.role WHERE name = $2
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(row.id)
            .bind(role)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let mut role_names: Vec<String> = roles.iter().map(|r| (*r).to_owned()).collect();
        role_names.sort();
        role_names.dedup();

        Ok(row.into_user(role_names).0)
    }
}
