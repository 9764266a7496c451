//! Product repository and catalog page tests.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `TEST_DATABASE_URL`. Migrations are applied by the test helpers.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use sportsstore_core::{Price, Product, ProductId, ProductQuery};
use sportsstore_integration_tests::{
    app_with_pool, body_text, get, send, test_config, test_pool, unique_name,
};
use sportsstore_storefront::db::{ProductRepository, RepositoryError};
use sportsstore_storefront::seed;

fn product(category: &str, name: &str, cents: i64) -> Product {
    Product {
        id: ProductId::NEW,
        name: name.to_owned(),
        description: format!("{name} for testing"),
        price: Price::from_cents(cents),
        category: category.to_owned(),
    }
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_save_inserts_then_updates() {
    let pool = test_pool().await;
    let repo = ProductRepository::new(&pool);

    let mut kayak = product(&unique_name("Boats"), "Kayak", 27_500);
    repo.save(&mut kayak).await.unwrap();
    assert!(!kayak.id.is_new());

    kayak.price = Price::from_cents(25_000);
    repo.save(&mut kayak).await.unwrap();

    let stored = repo.get(kayak.id).await.unwrap().unwrap();
    assert_eq!(stored.price, Price::from_cents(25_000));
    assert_eq!(stored.name, "Kayak");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_update_of_missing_product_is_not_found() {
    let pool = test_pool().await;
    let mut ghost = product("Ghosts", "Ghost", 100);
    ghost.id = ProductId::new(i32::MAX);

    let result = ProductRepository::new(&pool).save(&mut ghost).await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_invalid_product_is_rejected() {
    let pool = test_pool().await;
    let mut blank = product("", "", 100);

    let result = ProductRepository::new(&pool).save(&mut blank).await;
    assert!(matches!(result, Err(RepositoryError::Invalid(_))));
    assert!(blank.id.is_new());

    // Too large for NUMERIC(10,2): refused before it reaches the database.
    let mut stadium = product(&unique_name("Soccer"), "Stadium", 12_345_678_900);
    let result = ProductRepository::new(&pool).save(&mut stadium).await;
    assert!(matches!(result, Err(RepositoryError::Invalid(_))));
    assert!(stadium.id.is_new());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_category_pages_are_ordered_by_name() {
    let pool = test_pool().await;
    let repo = ProductRepository::new(&pool);
    let category = unique_name("Chess");

    for name in ["Pawn", "Bishop", "Rook", "King", "Queen"] {
        repo.save(&mut product(&category, name, 1_000)).await.unwrap();
    }

    let first = repo
        .list_page(&ProductQuery::new(Some(category.clone()), 1, 4))
        .await
        .unwrap();
    let names: Vec<&str> = first.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Bishop", "King", "Pawn", "Queen"]);
    assert_eq!(first.paging.total_items, 5);
    assert_eq!(first.paging.total_pages(), 2);

    let second = repo
        .list_page(&ProductQuery::new(Some(category.clone()), 2, 4))
        .await
        .unwrap();
    assert_eq!(second.products.len(), 1);
    assert_eq!(second.products.first().map(|p| p.name.as_str()), Some("Rook"));

    assert!(repo.categories().await.unwrap().contains(&category));
    assert_eq!(repo.count(Some(&category)).await.unwrap(), 5);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_delete_removes_product() {
    let pool = test_pool().await;
    let repo = ProductRepository::new(&pool);
    let mut flag = product(&unique_name("Soccer"), "Corner Flags", 3_495);
    repo.save(&mut flag).await.unwrap();

    repo.delete(flag.id).await.unwrap();
    assert!(repo.get(flag.id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete(flag.id).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_catalog_seeding_is_idempotent() {
    let pool = test_pool().await;

    seed::ensure_catalog_populated(&pool).await.unwrap();
    let count = ProductRepository::new(&pool).count(None).await.unwrap();
    assert!(count > 0);

    assert_eq!(seed::ensure_catalog_populated(&pool).await.unwrap(), 0);
    assert_eq!(ProductRepository::new(&pool).count(None).await.unwrap(), count);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_category_listing_routes() {
    let pool = test_pool().await;
    let category = unique_name("Routes");
    let repo = ProductRepository::new(&pool);
    for name in ["Alpha", "Beta", "Gamma", "Delta", "Epsilon"] {
        repo.save(&mut product(&category, name, 500)).await.unwrap();
    }
    let app = app_with_pool(test_config(), pool);

    let response = send(&app, get(&format!("/{category}"), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Alpha"));
    assert!(!body.contains("Gamma"));

    let response = send(&app, get(&format!("/{category}/Page2"), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Gamma"));

    let response = send(&app, get(&format!("/{category}/Page9"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, get(&format!("/{}", unique_name("Nothing")), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
