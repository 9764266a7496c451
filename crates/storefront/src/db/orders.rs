//! Order repository.
//!
//! Orders are aggregates: a header row in `store."order"` plus its lines in
//! `store.order_line`. Lines reference products by id only. Saving an order
//! writes the header and lines and nothing else, so a product that a line
//! points at is never inserted or updated as a side effect.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use sportsstore_core::{
    Order, OrderId, OrderLine, Price, Product, ProductId, ShippingDetails,
};

use super::RepositoryError;

/// What a save will write, worked out before touching the database.
///
/// `referenced_products` lists the products the lines point at. They are
/// foreign keys only: the save checks nothing about them beyond what the
/// `order_line.product_id` constraint enforces and never writes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    existing: Option<OrderId>,
    lines: Vec<(ProductId, i32)>,
    pub referenced_products: Vec<ProductId>,
}

impl SavePlan {
    /// Build the plan for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the order has no lines, a line
    /// has a zero quantity, or a line points at an unsaved product.
    pub fn for_order(order: &Order) -> Result<Self, RepositoryError> {
        if order.lines.is_empty() {
            return Err(RepositoryError::Invalid("order has no lines".to_owned()));
        }

        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            if line.product.id.is_new() {
                return Err(RepositoryError::Invalid(format!(
                    "line for '{}' refers to an unsaved product",
                    line.product.name
                )));
            }
            let quantity = i32::try_from(line.quantity)
                .ok()
                .filter(|q| *q >= 1)
                .ok_or_else(|| {
                    RepositoryError::Invalid(format!(
                        "quantity {} for product {} is out of range",
                        line.quantity, line.product.id
                    ))
                })?;
            lines.push((line.product.id, quantity));
        }

        let mut referenced_products: Vec<ProductId> = lines.iter().map(|(id, _)| *id).collect();
        referenced_products.sort_unstable();
        referenced_products.dedup();

        Ok(Self {
            existing: (!order.is_new()).then_some(order.id),
            lines,
            referenced_products,
        })
    }

    /// Whether the save creates a new header row.
    #[must_use]
    pub const fn is_insert(&self) -> bool {
        self.existing.is_none()
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    name: String,
    line1: String,
    line2: Option<String>,
    line3: Option<String>,
    city: String,
    state: String,
    zip: Option<String>,
    country: String,
    gift_wrap: bool,
    shipped: bool,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    order_id: i32,
    quantity: i32,
    product_id: i32,
    name: String,
    description: String,
    price: Decimal,
    category: String,
}

impl OrderLineRow {
    fn into_line(self) -> Result<(i32, OrderLine), RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order {} has line with quantity {}",
                self.order_id, self.quantity
            ))
        })?;

        Ok((
            self.order_id,
            OrderLine {
                product: Product {
                    id: ProductId::new(self.product_id),
                    name: self.name,
                    description: self.description,
                    price: Price::new(self.price),
                    category: self.category,
                },
                quantity,
            },
        ))
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every order with its lines and each line's product, by id ascending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored quantity is negative.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, name, line1, line2, line3, city, state, zip, country,
                   gift_wrap, shipped
            FROM store."order"
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = headers.iter().map(|h| h.id).collect();
        let line_rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT l.order_id, l.quantity,
                   p.id AS product_id, p.name, p.description, p.price, p.category
            FROM store.order_line l
            JOIN store.product p ON p.id = l.product_id
            WHERE l.order_id = ANY($1)
            ORDER BY l.order_id, l.id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut lines_by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
        for row in line_rows {
            let (order_id, line) = row.into_line()?;
            lines_by_order.entry(order_id).or_default().push(line);
        }

        Ok(headers
            .into_iter()
            .map(|h| Order {
                id: OrderId::new(h.id),
                lines: lines_by_order.remove(&h.id).unwrap_or_default(),
                shipping: ShippingDetails {
                    name: h.name,
                    line1: h.line1,
                    line2: h.line2,
                    line3: h.line3,
                    city: h.city,
                    state: h.state,
                    zip: h.zip,
                    country: h.country,
                    gift_wrap: h.gift_wrap,
                },
                shipped: h.shipped,
            })
            .collect())
    }

    /// Insert the order when its id is new, otherwise update it in place.
    ///
    /// Runs in one transaction: the header and all lines are written, or
    /// nothing is. An update replaces the order's lines. On success the
    /// order's id is set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the order cannot be planned.
    /// Returns `RepositoryError::NotFound` if updating an id with no row.
    /// Returns `RepositoryError::Conflict` if a line's product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn save(&self, order: &mut Order) -> Result<SavePlan, RepositoryError> {
        let plan = SavePlan::for_order(order)?;
        let shipping = &order.shipping;

        let mut tx = self.pool.begin().await?;

        let order_id: OrderId = if let Some(existing) = plan.existing {
            let result = sqlx::query(
                r#"
                UPDATE store."order"
                SET name = $2, line1 = $3, line2 = $4, line3 = $5, city = $6,
                    state = $7, zip = $8, country = $9, gift_wrap = $10,
                    shipped = $11
                WHERE id = $1
                "#,
            )
            .bind(existing)
            .bind(&shipping.name)
            .bind(&shipping.line1)
            .bind(&shipping.line2)
            .bind(&shipping.line3)
            .bind(&shipping.city)
            .bind(&shipping.state)
            .bind(&shipping.zip)
            .bind(&shipping.country)
            .bind(shipping.gift_wrap)
            .bind(order.shipped)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }

            sqlx::query("DELETE FROM store.order_line WHERE order_id = $1")
                .bind(existing)
                .execute(&mut *tx)
                .await?;

            existing
        } else {
            sqlx::query_scalar(
                r#"
                INSERT INTO store."order"
                    (name, line1, line2, line3, city, state, zip, country,
                     gift_wrap, shipped)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id
                "#,
            )
            .bind(&shipping.name)
            .bind(&shipping.line1)
            .bind(&shipping.line2)
            .bind(&shipping.line3)
            .bind(&shipping.city)
            .bind(&shipping.state)
            .bind(&shipping.zip)
            .bind(&shipping.country)
            .bind(shipping.gift_wrap)
            .bind(order.shipped)
            .fetch_one(&mut *tx)
            .await?
        };

        for (product_id, quantity) in &plan.lines {
            sqlx::query(
                r"
                INSERT INTO store.order_line (order_id, product_id, quantity)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(order_id)
            .bind(*product_id)
            .bind(*quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "order line"))?;
        }

        tx.commit().await?;

        order.id = order_id;
        tracing::info!(
            order_id = %order_id,
            inserted = plan.is_insert(),
            lines = plan.lines.len(),
            "Order saved"
        );

        Ok(plan)
    }

    /// Set or clear an order's shipped flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_shipped(&self, id: OrderId, shipped: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"UPDATE store."order" SET shipped = $2 WHERE id = $1"#)
            .bind(id)
            .bind(shipped)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("P{id}"),
            description: String::new(),
            price: Price::from_cents(100),
            category: "Test".to_string(),
        }
    }

    fn order(id: i32, lines: &[(i32, u32)]) -> Order {
        Order {
            id: OrderId::new(id),
            lines: lines
                .iter()
                .map(|(p, q)| OrderLine {
                    product: product(*p),
                    quantity: *q,
                })
                .collect(),
            shipping: ShippingDetails::default(),
            shipped: false,
        }
    }

    #[test]
    fn test_new_order_plans_insert() {
        let plan = SavePlan::for_order(&order(0, &[(1, 2)])).unwrap();
        assert!(plan.is_insert());
        assert_eq!(plan.referenced_products, vec![ProductId::new(1)]);
    }

    #[test]
    fn test_existing_order_plans_update() {
        let plan = SavePlan::for_order(&order(12, &[(1, 2)])).unwrap();
        assert!(!plan.is_insert());
    }

    #[test]
    fn test_referenced_products_are_deduplicated() {
        let plan = SavePlan::for_order(&order(0, &[(3, 1), (1, 1), (3, 2)])).unwrap();
        assert_eq!(
            plan.referenced_products,
            vec![ProductId::new(1), ProductId::new(3)]
        );
    }

    #[test]
    fn test_empty_order_is_rejected() {
        let result = SavePlan::for_order(&order(0, &[]));
        assert!(matches!(result, Err(RepositoryError::Invalid(_))));
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let result = SavePlan::for_order(&order(0, &[(1, 0)]));
        assert!(matches!(result, Err(RepositoryError::Invalid(_))));
    }

    #[test]
    fn test_unsaved_product_is_rejected() {
        let result = SavePlan::for_order(&order(0, &[(0, 1)]));
        assert!(matches!(result, Err(RepositoryError::Invalid(_))));
    }
}
