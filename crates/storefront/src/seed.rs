//! First-run data for the catalog and identity stores.
//!
//! Both initializers are idempotent: they check for existing data and do
//! nothing when it is present, so they run on every startup.

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::db::{IdentityRepository, RepositoryError};
use crate::models::user::ADMIN_ROLE;
use crate::services::auth::{AuthError, AuthService, generate_password};

/// Login name of the seeded administrator.
pub const ADMIN_USER: &str = "Admin";

/// Log target for a generated admin password. The server's Sentry layer
/// drops events with this target.
pub const CREDENTIALS_TARGET: &str = "sportsstore::credentials";

/// The sample catalog: name, description, category, price in cents.
const SAMPLE_PRODUCTS: [(&str, &str, &str, i64); 9] = [
    ("Kayak", "A boat for one person", "Watersports", 27_500),
    ("Lifejacket", "Protective and fashionable", "Watersports", 4_895),
    ("Soccer Ball", "FIFA-approved size and weight", "Soccer", 1_950),
    ("Corner Flags", "Give your playing field a professional touch", "Soccer", 3_495),
    ("Stadium", "Flat-packed 35,000-seat stadium", "Soccer", 7_950_000),
    ("Thinking Cap", "Improve brain efficiency by 75%", "Chess", 1_600),
    ("Unsteady Chair", "Secretly give your opponent a disadvantage", "Chess", 2_995),
    ("Human Chess Board", "A fun game for the family", "Chess", 7_500),
    ("Bling-Bling King", "Gold-plated, diamond-studded King", "Chess", 120_000),
];

/// Errors from seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("failed to create admin user: {0}")]
    Auth(#[from] AuthError),

    #[error("the Admin user does not exist; set STORE_ADMIN_PASSWORD to create it")]
    AdminPasswordRequired,
}

/// Insert the sample catalog when `store.product` is empty.
///
/// Returns the number of products inserted, 0 when the catalog already had
/// rows.
///
/// # Errors
///
/// Returns `SeedError::Repository` if a query fails; nothing is inserted then.
#[instrument(skip(pool))]
pub async fn ensure_catalog_populated(pool: &PgPool) -> Result<u64, SeedError> {
    let mut tx = pool.begin().await.map_err(RepositoryError::from)?;

    // Serializes concurrent seeders so two fresh instances cannot both insert.
    sqlx::query("LOCK TABLE store.product IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store.product")
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

    if existing > 0 {
        return Ok(0);
    }

    let mut inserted = 0_u64;
    for (name, description, category, cents) in SAMPLE_PRODUCTS {
        sqlx::query(
            r"
            INSERT INTO store.product (name, description, price, category)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(name)
        .bind(description)
        .bind(Decimal::new(cents, 2))
        .bind(category)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;
        inserted += 1;
    }

    tx.commit().await.map_err(RepositoryError::from)?;

    info!(count = inserted, "Seeded sample catalog");
    Ok(inserted)
}

/// Create the administrator account when it does not exist.
///
/// Uses `admin_password` when given. Otherwise, if `allow_generated`, a
/// random password is logged once under [`CREDENTIALS_TARGET`], since it
/// cannot be recovered later. Returns whether a user was created.
///
/// # Errors
///
/// Returns `SeedError::AdminPasswordRequired` if the user is missing, no
/// password is configured and generation is not allowed. Returns other
/// `SeedError` variants if the lookup or creation fails.
#[instrument(skip(pool, admin_password))]
pub async fn ensure_identity_populated(
    pool: &PgPool,
    admin_password: Option<&SecretString>,
    allow_generated: bool,
) -> Result<bool, SeedError> {
    if IdentityRepository::new(pool)
        .get_by_name(ADMIN_USER)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    let generated;
    let password = match admin_password {
        Some(configured) => configured.expose_secret(),
        None if allow_generated => {
            generated = generate_password();
            info!(
                target: CREDENTIALS_TARGET,
                "Generated password for {ADMIN_USER}: {generated} (set STORE_ADMIN_PASSWORD to choose one)"
            );
            generated.as_str()
        }
        None => return Err(SeedError::AdminPasswordRequired),
    };

    match AuthService::new(pool)
        .create_user(ADMIN_USER, None, password, &[ADMIN_ROLE])
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "Seeded admin user");
            Ok(true)
        }
        // Another instance created it between the lookup and the insert.
        Err(AuthError::UserAlreadyExists) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sportsstore_core::Price;

    #[test]
    fn test_sample_catalog_is_listable() {
        let mut names: Vec<&str> = SAMPLE_PRODUCTS.iter().map(|p| p.0).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SAMPLE_PRODUCTS.len());

        for (_, _, category, cents) in SAMPLE_PRODUCTS {
            assert!(!category.is_empty());
            assert!(Price::from_cents(cents).amount() >= Price::MIN_LISTED);
        }
    }
}
