//! Cart merging and payment submission.

use reqwest::{Method, StatusCode};
use teeforge_integration_tests::{FAILURE_MESSAGE, TestApp};

async fn add_to_cart(app: &TestApp, id: &str, quantity: &str) -> reqwest::Response {
    app.post_form("/cart/add", &[("item_id", id), ("quantity", quantity)])
        .await
}

async fn pay(app: &TestApp, method: &str) -> reqwest::Response {
    app.post_form(
        "/checkout",
        &[
            ("name", "Thandi Nkosi"),
            ("email", "thandi@example.com"),
            ("method", method),
        ],
    )
    .await
}

#[tokio::test]
async fn test_cart_merges_lines_by_id() {
    let app = TestApp::spawn().await;
    app.login_customer().await;

    add_to_cart(&app, "7", "1").await;
    add_to_cart(&app, "7", "2").await;
    add_to_cart(&app, "8", "1").await;

    let body = app.get("/cart").await.text().await.expect("body");
    assert_eq!(body.matches("Sunset tee").count(), 1);
    assert!(body.contains("R899.97"));
    assert!(body.contains("R950.47"));

    app.post_form("/cart/remove", &[("item_id", "7")]).await;
    let body = app.get("/cart").await.text().await.expect("body");
    assert!(!body.contains("Sunset tee"));
    assert!(body.contains("Ocean tee"));
}

#[tokio::test]
async fn test_cash_payment_is_completed_and_cart_cleared() {
    let app = TestApp::spawn().await;
    app.login_customer().await;
    add_to_cart(&app, "7", "1").await;

    let response = pay(&app, "CASH").await;
    let body = response.text().await.expect("body");
    assert!(body.contains("Payment created (id 1001). Follow instructions for CASH."));

    let payments = app.backend.calls_to(&Method::POST, "/api/payments");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].body["amount"], 299.99);
    assert_eq!(payments[0].body["paymentMethod"], "CASH");
    assert_eq!(payments[0].body["paymentStatus"], "COMPLETED");
    assert!(app.backend.calls_to(&Method::GET, "/api/payment-info").is_empty());

    let cart = app.get("/cart").await.text().await.expect("body");
    assert!(!cart.contains("Sunset tee"));
}

#[tokio::test]
async fn test_bank_transfer_is_pending_with_bank_details() {
    let app = TestApp::spawn().await;
    app.login_customer().await;
    add_to_cart(&app, "7", "1").await;

    let response = pay(&app, "BANK_TRANSFER").await;
    let body = response.text().await.expect("body");
    assert!(body.contains("Follow instructions for BANK_TRANSFER."));
    assert!(body.contains("62001234567"));

    let payments = app.backend.calls_to(&Method::POST, "/api/payments");
    assert_eq!(payments[0].body["amount"], 299.99);
    assert_eq!(payments[0].body["paymentStatus"], "PENDING");
}

#[tokio::test]
async fn test_failed_payment_keeps_cart() {
    let app = TestApp::spawn().await;
    app.login_customer().await;
    add_to_cart(&app, "7", "1").await;
    app.backend.fail("/api/payments");

    let response = pay(&app, "CASH").await;
    assert_eq!(response.url().path(), "/checkout");
    let body = response.text().await.expect("body");
    assert!(body.contains("Failed to create payment. Please try again."));

    // One attempt, no retry.
    assert_eq!(app.backend.calls_to(&Method::POST, "/api/payments").len(), 1);

    let cart = app.get("/cart").await.text().await.expect("body");
    assert!(cart.contains("Sunset tee"));
}

#[tokio::test]
async fn test_empty_cart_is_not_submitted() {
    let app = TestApp::spawn().await;
    app.login_customer().await;

    let response = pay(&app, "CASH").await;
    let body = response.text().await.expect("body");
    assert!(body.contains("Cart is empty"));
    assert!(app.backend.calls_to(&Method::POST, "/api/payments").is_empty());
}

#[tokio::test]
async fn test_price_comes_from_backend_not_form() {
    let app = TestApp::spawn().await;
    app.login_customer().await;

    app.post_form(
        "/cart/add",
        &[
            ("item_id", "7"),
            ("name", "Free tee"),
            ("unit_price", "0.01"),
            ("quantity", "1"),
        ],
    )
    .await;

    let body = app.get("/cart").await.text().await.expect("body");
    assert!(body.contains("Sunset tee"));
    assert!(body.contains("R299.99"));
    assert!(!body.contains("Free tee"));
    assert!(!body.contains("R0.01"));

    pay(&app, "CASH").await;
    let payments = app.backend.calls_to(&Method::POST, "/api/payments");
    assert_eq!(payments[0].body["amount"], 299.99);
}

#[tokio::test]
async fn test_unknown_tshirt_is_not_added() {
    let app = TestApp::spawn().await;
    app.login_customer().await;

    let body = add_to_cart(&app, "404", "1").await.text().await.expect("body");
    assert!(body.contains("That t-shirt is not available"));
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_tshirt_lookup_failure_leaves_cart_alone() {
    let app = TestApp::spawn().await;
    app.login_customer().await;
    app.backend.fail("/tshirt/getAll");

    let body = add_to_cart(&app, "7", "1").await.text().await.expect("body");
    assert!(body.contains(FAILURE_MESSAGE));
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_oversized_line_is_rejected_and_cart_still_renders() {
    let app = TestApp::spawn().await;
    app.login_customer().await;
    app.backend
        .insert_tshirt(9, "Gold tee", "79228162514264337593543950335");
    add_to_cart(&app, "7", "1").await;

    let body = add_to_cart(&app, "9", "2").await.text().await.expect("body");
    assert!(body.contains("Cart total is too large"));
    assert!(!body.contains("Gold tee"));

    let body = add_to_cart(&app, "7", "5000").await.text().await.expect("body");
    assert!(body.contains("Quantity cannot be more than 1000"));

    let cart = app.get("/cart").await;
    assert_eq!(cart.status(), StatusCode::OK);
    let body = cart.text().await.expect("body");
    assert!(body.contains("R299.99"));

    let response = pay(&app, "CASH").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payments = app.backend.calls_to(&Method::POST, "/api/payments");
    assert_eq!(payments[0].body["amount"], 299.99);
}
