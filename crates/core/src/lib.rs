//! Sports Store Core - Shared domain types.
//!
//! This crate provides the types shared by every Sports Store component:
//! - `storefront` - Public catalog, cart, checkout and the admin area
//! - `cli` - Migrations, seeding and identity management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. The cart state machine and the paging arithmetic live here
//! so they can be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and prices
//! - [`catalog`] - Products, listing queries and paging
//! - [`cart`] - The session cart
//! - [`order`] - The order aggregate and shipping details
//! - [`validation`] - Form field errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine};
pub use catalog::{PagingInfo, Product, ProductQuery};
pub use order::{Order, OrderLine, ShippingDetails};
pub use types::*;
pub use validation::FieldError;
