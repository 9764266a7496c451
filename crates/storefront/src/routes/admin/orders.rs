//! Admin order management: review orders and toggle their shipped flag.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tower_sessions::Session;
use tracing::instrument;

use sportsstore_core::{Order, OrderId};

use super::{AdminChrome, flash};
use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Order line display data.
#[derive(Clone)]
pub struct OrderLineView {
    pub product_name: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Order display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub zip: String,
    pub gift_wrap: bool,
    pub lines: Vec<OrderLineView>,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let shipping = &order.shipping;
        let address = [
            Some(shipping.line1.as_str()),
            shipping.line2.as_deref(),
            shipping.line3.as_deref(),
            Some(shipping.city.as_str()),
            Some(shipping.state.as_str()),
            Some(shipping.country.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            id: order.id.as_i32(),
            name: shipping.name.clone(),
            address,
            zip: shipping.zip.clone().unwrap_or_default(),
            gift_wrap: shipping.gift_wrap,
            lines: order
                .lines
                .iter()
                .map(|line| OrderLineView {
                    product_name: line.product.name.clone(),
                    quantity: line.quantity,
                    line_total: (line.product.price * line.quantity).display(),
                })
                .collect(),
            total: order.total_value().display(),
        }
    }
}

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders/index.html")]
pub struct OrderListTemplate {
    pub admin: AdminChrome,
    pub unshipped: Vec<OrderView>,
    pub shipped: Vec<OrderView>,
}

/// Split orders into (unshipped, shipped), keeping id order within each.
#[must_use]
pub fn partition_orders(orders: &[Order]) -> (Vec<OrderView>, Vec<OrderView>) {
    let (shipped, unshipped): (Vec<&Order>, Vec<&Order>) = orders.iter().partition(|o| o.shipped);
    (
        unshipped.into_iter().map(OrderView::from).collect(),
        shipped.into_iter().map(OrderView::from).collect(),
    )
}

/// Orders page.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> Result<OrderListTemplate> {
    let orders = OrderRepository::new(state.catalog_pool()).list().await?;
    let (unshipped, shipped) = partition_orders(&orders);

    Ok(OrderListTemplate {
        admin: AdminChrome::take(&session, &user).await,
        unshipped,
        shipped,
    })
}

async fn set_shipped(
    state: &AppState,
    session: &Session,
    user: &str,
    id: i32,
    shipped: bool,
) -> Result<Redirect> {
    OrderRepository::new(state.catalog_pool())
        .mark_shipped(OrderId::new(id), shipped)
        .await?;

    tracing::info!(order_id = id, shipped, admin = %user, "Order shipping state changed");
    let message = if shipped {
        format!("Order {id} marked as shipped")
    } else {
        format!("Order {id} moved back to unshipped")
    };
    flash(session, message).await;

    Ok(Redirect::to("/admin/orders"))
}

/// Mark an order as shipped.
#[instrument(skip(state, session, user))]
pub async fn ship(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    set_shipped(&state, &session, &user.user_name, id, true).await
}

/// Move an order back to unshipped.
#[instrument(skip(state, session, user))]
pub async fn reset(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    set_shipped(&state, &session, &user.user_name, id, false).await
}
