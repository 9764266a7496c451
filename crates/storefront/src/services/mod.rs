//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password login and identity user creation

pub mod auth;
