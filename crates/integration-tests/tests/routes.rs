//! Router tests that never reach the database.
//!
//! The app is built over lazily connecting pools, so these run anywhere.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};

use sportsstore_integration_tests::{
    body_text, get, lazy_app, location, post_form, send,
};

#[tokio::test]
async fn test_health_is_ok() {
    let app = lazy_app();
    let response = send(&app, get("/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_unknown_path_gets_html_status_page() {
    let app = lazy_app();
    let response = send(&app, get("/Watersports/Page2/extra", None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_owned();
    assert!(content_type.starts_with("text/html"));
    assert!(body_text(response).await.contains("404"));
}

#[tokio::test]
async fn test_wrong_method_gets_status_page() {
    let app = lazy_app();
    let response = send(&app, get("/cart/add", None)).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(body_text(response).await.contains("405"));
}

#[tokio::test]
async fn test_admin_home_redirects_anonymous_to_login() {
    let app = lazy_app();
    let response = send(&app, get("/admin", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("/account/login?return_url=%2Fadmin")
    );
}

#[tokio::test]
async fn test_unknown_admin_path_redirects_anonymous_to_login() {
    let app = lazy_app();
    let response = send(&app, get("/admin/no/such/page", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("/account/login?return_url=%2Fadmin%2Fno%2Fsuch%2Fpage")
    );
}

#[tokio::test]
async fn test_two_segment_admin_paths_stay_in_admin_area() {
    let app = lazy_app();

    for (path, return_url) in [
        ("/admin/whatever", "%2Fadmin%2Fwhatever"),
        ("/admin/Page1", "%2Fadmin%2FPage1"),
    ] {
        let expected = format!("/account/login?return_url={return_url}");
        let response = send(&app, get(path, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some(expected.as_str()), "{path}");
    }
}

#[tokio::test]
async fn test_admin_actions_require_login() {
    let app = lazy_app();
    let response = send(&app, post_form("/admin/products/1/delete", "", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).unwrap().starts_with("/account/login?return_url="));
}

#[tokio::test]
async fn test_login_page_renders() {
    let app = lazy_app();
    let response = send(&app, get("/account/login?return_url=/admin/orders", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("name=\"return_url\""));
    assert!(body.contains("name=\"password\""));
}

#[tokio::test]
async fn test_empty_cart_page() {
    let app = lazy_app();
    let response = send(&app, get("/cart", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_remove_from_cart_redirects_back_to_cart() {
    let app = lazy_app();
    let response = send(
        &app,
        post_form("/cart/remove", "product_id=1&return_url=%2FSoccer", None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart?return_url=%2FSoccer"));
}

#[tokio::test]
async fn test_remove_refuses_offsite_return_url() {
    let app = lazy_app();
    let response = send(
        &app,
        post_form(
            "/cart/remove",
            "product_id=1&return_url=%2F%2Fevil.example",
            None,
        ),
    )
    .await;

    assert_eq!(location(&response), Some("/cart?return_url=%2F"));
}

#[tokio::test]
async fn test_cart_page_refuses_return_url_with_control_characters() {
    let app = lazy_app();
    let response = send(&app, get("/cart?return_url=%2F%09%2Fevil.example", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(!body.contains("evil.example"));
    assert!(body.contains("href=\"/\">Continue shopping"));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_rejected() {
    let app = lazy_app();
    let form = "name=Joe&line1=1+Main+St&city=Springfield&state=IL&country=USA";
    let response = send(&app, post_form("/checkout", form, None)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Sorry, your cart is empty!"));
}

#[tokio::test]
async fn test_checkout_confirmation_shows_order_id() {
    let app = lazy_app();
    let response = send(&app, get("/checkout/complete/42", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("#42"));
}

#[tokio::test]
async fn test_logout_returns_to_store() {
    let app = lazy_app();
    let response = send(&app, post_form("/account/logout", "", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
}
