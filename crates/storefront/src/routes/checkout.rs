//! Checkout route handlers.
//!
//! Checkout copies the cart into a new order, saves it and empties the cart.
//! The cart is only cleared after the order is stored.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sportsstore_core::validation::message_for;
use sportsstore_core::{FieldError, Order, ShippingDetails};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalUser, SessionCart};
use crate::routes::PageChrome;
use crate::state::AppState;

/// Shown when checking out with nothing in the cart.
pub const EMPTY_CART_MESSAGE: &str = "Sorry, your cart is empty!";

/// Shipping form data. Checkbox fields are absent when unticked.
#[derive(Debug, Default, Deserialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub line1: String,
    pub line2: Option<String>,
    pub line3: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub zip: Option<String>,
    #[serde(default)]
    pub country: String,
    pub gift_wrap: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl From<ShippingForm> for ShippingDetails {
    fn from(form: ShippingForm) -> Self {
        Self {
            name: form.name.trim().to_owned(),
            line1: form.line1.trim().to_owned(),
            line2: non_blank(form.line2),
            line3: non_blank(form.line3),
            city: form.city.trim().to_owned(),
            state: form.state.trim().to_owned(),
            zip: non_blank(form.zip),
            country: form.country.trim().to_owned(),
            gift_wrap: form.gift_wrap.is_some(),
        }
    }
}

/// Checkout form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub chrome: PageChrome,
    pub shipping: ShippingDetails,
    pub errors: Vec<FieldError>,
    pub cart_is_empty: bool,
}

impl CheckoutTemplate {
    /// Message for a field, or empty when it passed.
    #[must_use]
    pub fn error_for(&self, field: &str) -> &'static str {
        message_for(&self.errors, field).unwrap_or("")
    }
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CompletedTemplate {
    pub chrome: PageChrome,
    pub order_id: i32,
}

/// Collect every reason the order cannot be placed yet.
#[must_use]
pub fn checkout_errors(cart_is_empty: bool, shipping: &ShippingDetails) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if cart_is_empty {
        errors.push(FieldError::new("cart", EMPTY_CART_MESSAGE));
    }
    errors.extend(shipping.missing_fields());
    errors
}

/// Display the shipping form.
#[instrument(skip(cart, user))]
pub async fn show(cart: SessionCart, user: OptionalUser) -> CheckoutTemplate {
    CheckoutTemplate {
        chrome: PageChrome::new(&cart, user.0.as_ref()),
        shipping: ShippingDetails::default(),
        errors: Vec::new(),
        cart_is_empty: cart.is_empty(),
    }
}

/// Place the order.
///
/// Invalid input re-renders the form with 422. On success the cart is
/// emptied and the visitor is sent to the confirmation page.
#[instrument(skip(state, cart, user, form))]
pub async fn place_order(
    State(state): State<AppState>,
    mut cart: SessionCart,
    user: OptionalUser,
    Form(form): Form<ShippingForm>,
) -> Result<Response> {
    let shipping = ShippingDetails::from(form);
    let errors = checkout_errors(cart.is_empty(), &shipping);

    if !errors.is_empty() {
        let page = CheckoutTemplate {
            chrome: PageChrome::new(&cart, user.0.as_ref()),
            shipping,
            errors,
            cart_is_empty: cart.is_empty(),
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    let mut order = Order::from_cart(&cart, shipping);
    OrderRepository::new(state.catalog_pool())
        .save(&mut order)
        .await?;

    cart.clear();
    cart.save().await?;

    Ok(Redirect::to(&format!("/checkout/complete/{}", order.id)).into_response())
}

/// Order confirmation page.
#[instrument(skip(cart, user))]
pub async fn complete(
    Path(order_id): Path<i32>,
    cart: SessionCart,
    user: OptionalUser,
) -> CompletedTemplate {
    CompletedTemplate {
        chrome: PageChrome::new(&cart, user.0.as_ref()),
        order_id,
    }
}
