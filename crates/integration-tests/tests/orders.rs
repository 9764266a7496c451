//! Order persistence tests.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `TEST_DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use sportsstore_core::{Cart, Order, OrderId, Price, Product, ProductId, ShippingDetails};
use sportsstore_integration_tests::{test_pool, unique_name};
use sportsstore_storefront::db::{OrderRepository, ProductRepository, RepositoryError};

async fn saved_product(pool: &sqlx::PgPool, category: &str, name: &str, cents: i64) -> Product {
    let mut product = Product {
        id: ProductId::NEW,
        name: name.to_owned(),
        description: format!("{name} for testing"),
        price: Price::from_cents(cents),
        category: category.to_owned(),
    };
    ProductRepository::new(pool).save(&mut product).await.unwrap();
    product
}

fn shipping(name: &str) -> ShippingDetails {
    ShippingDetails {
        name: name.to_owned(),
        line1: "1 Main St".to_owned(),
        city: "Springfield".to_owned(),
        state: "IL".to_owned(),
        country: "USA".to_owned(),
        gift_wrap: true,
        ..ShippingDetails::default()
    }
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_new_order_is_inserted_with_lines() {
    let pool = test_pool().await;
    let category = unique_name("Watersports");
    let kayak = saved_product(&pool, &category, "Kayak", 27_500).await;
    let jacket = saved_product(&pool, &category, "Lifejacket", 4_895).await;
    let products_before = ProductRepository::new(&pool).count(None).await.unwrap();

    let mut cart = Cart::default();
    cart.add_item(kayak.clone(), 1);
    cart.add_item(jacket.clone(), 2);
    let customer = unique_name("Customer");
    let mut order = Order::from_cart(&cart, shipping(&customer));

    let plan = OrderRepository::new(&pool).save(&mut order).await.unwrap();
    assert!(plan.is_insert());
    assert!(!order.id.is_new());

    // Saving an order never writes the products it refers to.
    assert_eq!(
        ProductRepository::new(&pool).count(None).await.unwrap(),
        products_before
    );

    let orders = OrderRepository::new(&pool).list().await.unwrap();
    let stored = orders.iter().find(|o| o.id == order.id).unwrap();
    assert_eq!(stored.shipping.name, customer);
    assert!(stored.shipping.gift_wrap);
    assert!(!stored.shipped);
    assert_eq!(stored.lines.len(), 2);
    assert_eq!(stored.total_value(), Price::from_cents(27_500 + 2 * 4_895));
    assert!(stored.lines.iter().any(|l| l.product == jacket && l.quantity == 2));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_saving_existing_order_replaces_it() {
    let pool = test_pool().await;
    let category = unique_name("Soccer");
    let ball = saved_product(&pool, &category, "Soccer Ball", 1_950).await;
    let flags = saved_product(&pool, &category, "Corner Flags", 3_495).await;

    let mut cart = Cart::default();
    cart.add_item(ball, 3);
    let mut order = Order::from_cart(&cart, shipping(&unique_name("Customer")));
    let repo = OrderRepository::new(&pool);
    repo.save(&mut order).await.unwrap();
    let id = order.id;

    order.lines.first_mut().unwrap().product = flags.clone();
    order.shipped = true;
    let plan = repo.save(&mut order).await.unwrap();
    assert!(!plan.is_insert());
    assert_eq!(order.id, id);

    let orders = repo.list().await.unwrap();
    assert_eq!(orders.iter().filter(|o| o.id == id).count(), 1);
    let stored = orders.iter().find(|o| o.id == id).unwrap();
    assert!(stored.shipped);
    assert_eq!(stored.lines.len(), 1);
    assert_eq!(stored.lines.first().map(|l| &l.product), Some(&flags));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_mark_shipped_and_reset() {
    let pool = test_pool().await;
    let chair = saved_product(&pool, &unique_name("Chess"), "Unsteady Chair", 2_995).await;

    let mut cart = Cart::default();
    cart.add_item(chair, 1);
    let mut order = Order::from_cart(&cart, shipping(&unique_name("Customer")));
    let repo = OrderRepository::new(&pool);
    repo.save(&mut order).await.unwrap();

    repo.mark_shipped(order.id, true).await.unwrap();
    let shipped = |orders: &[Order]| orders.iter().find(|o| o.id == order.id).map(|o| o.shipped);
    assert_eq!(shipped(&repo.list().await.unwrap()), Some(true));

    repo.mark_shipped(order.id, false).await.unwrap();
    assert_eq!(shipped(&repo.list().await.unwrap()), Some(false));

    assert!(matches!(
        repo.mark_shipped(OrderId::new(i32::MAX), true).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_product_in_an_order_cannot_be_deleted() {
    let pool = test_pool().await;
    let king = saved_product(&pool, &unique_name("Chess"), "Bling-Bling King", 120_000).await;

    let mut cart = Cart::default();
    cart.add_item(king.clone(), 1);
    let mut order = Order::from_cart(&cart, shipping(&unique_name("Customer")));
    OrderRepository::new(&pool).save(&mut order).await.unwrap();

    let result = ProductRepository::new(&pool).delete(king.id).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_order_for_deleted_product_is_rejected() {
    let pool = test_pool().await;
    let cap = saved_product(&pool, &unique_name("Chess"), "Thinking Cap", 1_600).await;
    ProductRepository::new(&pool).delete(cap.id).await.unwrap();

    let mut cart = Cart::default();
    cart.add_item(cap, 1);
    let customer = unique_name("Customer");
    let mut order = Order::from_cart(&cart, shipping(&customer));

    let result = OrderRepository::new(&pool).save(&mut order).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    assert!(order.id.is_new());

    // The header insert was rolled back along with the failed line.
    let headers: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM store."order" WHERE name = $1"#)
        .bind(&customer)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(headers, 0);
}
