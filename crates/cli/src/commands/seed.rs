//! Seed the catalog and identity databases.
//!
//! Runs the same idempotent initializers the server runs at startup, so it
//! is safe to repeat.

use secrecy::SecretString;
use tracing::info;

use sportsstore_storefront::config::validate_admin_password;
use sportsstore_storefront::{db, seed};

use super::database_url;

/// Insert the sample catalog and the `Admin` user when missing.
///
/// # Errors
///
/// Returns an error if the admin password is rejected, a database URL is
/// missing, or seeding fails.
pub async fn run(admin_password: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let admin_password = match admin_password {
        Some(password) => {
            validate_admin_password(&password, "--admin-password")?;
            Some(SecretString::from(password))
        }
        None => None,
    };

    let catalog_pool = db::create_pool(&database_url("STORE_DATABASE_URL")?).await?;
    let identity_pool = db::create_pool(&database_url("IDENTITY_DATABASE_URL")?).await?;
    info!("Connected to databases");

    let inserted = seed::ensure_catalog_populated(&catalog_pool).await?;
    if inserted == 0 {
        info!("Catalog already has products; left unchanged");
    } else {
        info!(inserted, "Sample catalog inserted");
    }

    if seed::ensure_identity_populated(&identity_pool, admin_password.as_ref(), true).await? {
        info!(user = seed::ADMIN_USER, "Admin user created");
    } else {
        info!(user = seed::ADMIN_USER, "Admin user already exists");
    }

    Ok(())
}
