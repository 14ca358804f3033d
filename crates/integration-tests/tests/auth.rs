//! Sign-in, sign-out and route guarding.

use reqwest::{Method, StatusCode};
use teeforge_integration_tests::{ADMIN, CUSTOMER, PASSWORD, TestApp};

#[tokio::test]
async fn test_login_lands_customer_in_designer() {
    let app = TestApp::spawn().await;

    let response = app.login(CUSTOMER, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/designer");

    let body = response.text().await.expect("body");
    assert!(body.contains("Welcome, Thandi Nkosi!"));

    let logins = app.backend.calls_to(&Method::POST, "/auth/login");
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0].body["userName"], CUSTOMER);
    assert_eq!(logins[0].body["password"], PASSWORD);
}

#[tokio::test]
async fn test_login_lands_admin_in_console() {
    let app = TestApp::spawn().await;

    let response = app.login(ADMIN, PASSWORD).await;
    assert_eq!(response.url().path(), "/admin/customers");
    let body = response.text().await.expect("body");
    assert!(body.contains("Thandi Nkosi"));
    assert!(body.contains("Pieter Botha"));
}

#[tokio::test]
async fn test_failed_login_shows_backend_message() {
    let app = TestApp::spawn().await;

    let response = app.login(CUSTOMER, "wrong").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/auth/login");
    let body = response.text().await.expect("body");
    assert!(body.contains("Invalid username or password"));

    // Still signed out.
    let response = app.get("/designer").await;
    assert_eq!(response.url().path(), "/auth/login");
}

#[tokio::test]
async fn test_protected_routes_redirect_to_login() {
    let app = TestApp::spawn().await;

    for path in ["/designer", "/cart", "/checkout", "/account", "/admin/customers"] {
        let response = app.get(path).await;
        assert_eq!(response.url().path(), "/auth/login", "{path} was not guarded");
    }
}

#[tokio::test]
async fn test_backend_calls_carry_the_bearer_token() {
    let app = TestApp::spawn().await;
    app.login_customer().await;

    app.get("/account").await;

    let calls = app.backend.calls();
    assert!(!calls.is_empty());
    assert!(
        calls
            .iter()
            .all(|c| c.authorization.as_deref() == Some("Bearer token-thandi"))
    );
}

#[tokio::test]
async fn test_logout_forgets_the_user() {
    let app = TestApp::spawn().await;
    app.login_customer().await;

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(response.url().path(), "/auth/login");

    let response = app.get("/cart").await;
    assert_eq!(response.url().path(), "/auth/login");
}

#[tokio::test]
async fn test_registration_sends_profile_and_redirects_to_login() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("first_name", "Lerato"),
                ("last_name", "Mokoena"),
                ("user_name", "lerato"),
                ("password", "pw"),
                ("email", "lerato@example.com"),
                ("phone_number", "0831112222"),
                ("street", "4 Main Road"),
                ("municipality", "Durban"),
                ("province", "KwaZulu-Natal"),
                ("postal_code", "4001"),
                ("country", "South Africa"),
            ],
        )
        .await;

    assert_eq!(response.url().path(), "/auth/login");
    let body = response.text().await.expect("body");
    assert!(body.contains("Registration successful. Please log in."));

    let calls = app.backend.calls_to(&Method::POST, "/auth/register");
    assert_eq!(calls.len(), 1);
    let sent = &calls[0].body;
    assert_eq!(sent["userName"], "lerato");
    assert_eq!(sent["contact"]["email"], "lerato@example.com");
    assert_eq!(sent["contact"]["phoneNumber"], "0831112222");
}
