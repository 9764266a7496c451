//! Domain models for the storefront that do not belong in the core crate.
//!
//! - [`user`] - Identity users and roles
//! - [`session`] - Values kept in the session

pub mod session;
pub mod user;

pub use session::CurrentUser;
pub use user::{ADMIN_ROLE, IdentityUser};
