//! Identity domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use sportsstore_core::UserId;

/// Role whose members may use the admin area.
pub const ADMIN_ROLE: &str = "Admins";

/// A user from the identity store.
#[derive(Debug, Clone)]
pub struct IdentityUser {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique across users.
    pub user_name: String,
    pub email: Option<String>,
    /// Names of the roles the user belongs to, sorted.
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}
