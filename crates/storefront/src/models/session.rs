//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use sportsstore_core::UserId;

use super::user::{ADMIN_ROLE, IdentityUser};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. Roles
/// are captured at login; a role change takes effect on the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    pub user_name: String,
    pub roles: Vec<String>,
}

impl CurrentUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

impl From<&IdentityUser> for CurrentUser {
    fn from(user: &IdentityUser) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the serialized cart.
    pub const CART: &str = "cart";

    /// Key for a one-shot message shown on the next admin page.
    pub const ADMIN_MESSAGE: &str = "admin_message";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        let mut user = CurrentUser {
            id: UserId::new(1),
            user_name: "Admin".to_string(),
            roles: vec![ADMIN_ROLE.to_string()],
        };
        assert!(user.is_admin());

        user.roles = vec!["Customers".to_string()];
        assert!(!user.is_admin());
    }
}
