//! Cart route handlers.
//!
//! The cart lives in the session (see [`SessionCart`]). Every change is a
//! form POST that redirects back to the cart page, carrying the listing page
//! the visitor came from as `return_url` so "continue shopping" returns there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use sportsstore_core::{CartLine, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::auth::safe_return_url;
use crate::middleware::{OptionalUser, SessionCart};
use crate::routes::PageChrome;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: i32,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.as_i32(),
            name: line.product.name.clone(),
            quantity: line.quantity,
            price: line.product.price.display(),
            line_total: line.total().display(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: PageChrome,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub return_url: String,
}

/// Query string of the cart page.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub return_url: Option<String>,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<u32>,
    pub return_url: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub quantity: u32,
    pub return_url: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
    pub return_url: Option<String>,
}

/// Where "continue shopping" leads, defaulting to the first listing page.
fn continue_url(return_url: Option<&str>) -> String {
    safe_return_url(return_url).unwrap_or("/").to_owned()
}

/// URL of the cart page that keeps `return_url`.
fn cart_url(return_url: Option<&str>) -> String {
    format!(
        "/cart?return_url={}",
        urlencoding::encode(&continue_url(return_url))
    )
}

/// Display cart page.
#[instrument(skip(cart, user))]
pub async fn show(
    Query(query): Query<CartQuery>,
    cart: SessionCart,
    user: OptionalUser,
) -> CartShowTemplate {
    CartShowTemplate {
        chrome: PageChrome::new(&cart, user.0.as_ref()),
        lines: cart.lines().iter().map(CartLineView::from).collect(),
        total: cart.total_value().display(),
        return_url: continue_url(query.return_url.as_deref()),
    }
}

/// Add a product to the cart.
///
/// The product is looked up so the cart holds a current snapshot of it.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let product = ProductRepository::new(state.catalog_pool())
        .get(ProductId::new(form.product_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    cart.add_item(product, form.quantity.unwrap_or(1));
    cart.save().await?;

    Ok(Redirect::to(&cart_url(form.return_url.as_deref())))
}

/// Set the quantity of a cart line; zero removes it.
#[instrument(skip(cart))]
pub async fn update(mut cart: SessionCart, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    if !cart.set_quantity(ProductId::new(form.product_id), form.quantity) {
        tracing::debug!(product_id = form.product_id, "Update for product not in cart");
    }
    cart.save().await?;

    Ok(Redirect::to(&cart_url(form.return_url.as_deref())))
}

/// Remove a cart line. Removing a product that is not in the cart is a no-op.
#[instrument(skip(cart))]
pub async fn remove(
    mut cart: SessionCart,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    cart.remove_line(ProductId::new(form.product_id));
    cart.save().await?;

    Ok(Redirect::to(&cart_url(form.return_url.as_deref())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_url_keeps_local_return_url() {
        assert_eq!(
            cart_url(Some("/Soccer/Page2")),
            "/cart?return_url=%2FSoccer%2FPage2"
        );
    }

    #[test]
    fn test_cart_url_drops_foreign_return_url() {
        assert_eq!(cart_url(Some("https://evil.example")), "/cart?return_url=%2F");
        assert_eq!(cart_url(None), "/cart?return_url=%2F");
    }
}
