//! Sports Store storefront library.
//!
//! The catalog, cart, checkout and admin area as a library, so the binary,
//! the CLI and the integration tests share one router and one set of
//! repositories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
