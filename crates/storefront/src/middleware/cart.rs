//! The per-request cart context.
//!
//! Handlers that read or change the cart take a [`SessionCart`] argument. It
//! is loaded from the session when the request is extracted; changes are
//! only kept once the handler calls [`SessionCart::save`].

use std::ops::{Deref, DerefMut};

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use sportsstore_core::Cart;

use crate::error::AppError;
use crate::models::session::keys;

/// The visitor's cart, bound to their session.
pub struct SessionCart {
    session: Session,
    cart: Cart,
}

impl SessionCart {
    /// Write the cart back to the session. An empty cart removes the entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn save(&self) -> Result<(), tower_sessions::session::Error> {
        if self.cart.is_empty() {
            self.session.remove::<Cart>(keys::CART).await?;
            return Ok(());
        }
        self.session.insert(keys::CART, &self.cart).await
    }
}

impl Deref for SessionCart {
    type Target = Cart;

    fn deref(&self) -> &Cart {
        &self.cart
    }
}

impl DerefMut for SessionCart {
    fn deref_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }
}

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_owned()))?;

        let cart = match session.get::<Cart>(keys::CART).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable cart");
                Cart::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { session, cart })
    }
}
