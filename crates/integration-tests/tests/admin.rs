//! Admin customer console.

use reqwest::{Method, StatusCode};
use teeforge_integration_tests::TestApp;

#[tokio::test]
async fn test_declined_delete_issues_no_backend_call() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let confirm = app.get("/admin/customers/2/delete").await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert!(confirm.text().await.expect("body").contains("Pieter Botha"));

    let response = app
        .post_form("/admin/customers/2/delete", &[("confirm", "no")])
        .await;
    assert_eq!(response.url().path(), "/admin/customers");
    let body = response.text().await.expect("body");
    assert!(body.contains("Delete cancelled"));
    assert!(body.contains("Pieter Botha"));

    assert!(
        app.backend
            .calls()
            .iter()
            .all(|c| c.method != Method::DELETE)
    );
    assert_eq!(app.backend.customer_ids(), [1, 2]);
}

#[tokio::test]
async fn test_confirmed_delete_removes_customer() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let response = app
        .post_form("/admin/customers/2/delete", &[("confirm", "yes")])
        .await;
    let body = response.text().await.expect("body");
    assert!(body.contains("Customer deleted"));
    assert!(!body.contains("Pieter Botha"));

    let deletes = app.backend.calls_to(&Method::DELETE, "/api/admin/customers/2");
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].authorization.as_deref(), Some("Bearer token-admin"));
    assert_eq!(app.backend.customer_ids(), [1]);
}

#[tokio::test]
async fn test_list_filter_and_backend_search() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let filtered = app.get("/admin/customers?filter=pieter").await;
    let body = filtered.text().await.expect("body");
    assert!(body.contains("Pieter Botha"));
    assert!(!body.contains("Thandi Nkosi"));

    let searched = app.get("/admin/customers/search?name=Thandi").await;
    let body = searched.text().await.expect("body");
    assert!(body.contains("Thandi Nkosi"));
    assert!(!body.contains("Pieter Botha"));

    let calls = app.backend.calls_to(&Method::GET, "/api/admin/customers/search");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query.as_deref(), Some("name=Thandi"));
}

#[tokio::test]
async fn test_deactivate_updates_backend() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let response = app.post_form("/admin/customers/1/deactivate", &[]).await;
    assert_eq!(response.url().path(), "/admin/customers/1");
    assert_eq!(
        app.backend
            .calls_to(&Method::PUT, "/api/admin/customers/1/deactivate")
            .len(),
        1
    );
}

#[tokio::test]
async fn test_customer_cannot_reach_console() {
    let app = TestApp::spawn().await;
    app.login_customer().await;

    let response = app.get("/admin/customers").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.text().await.expect("body").contains("Not allowed"));
    assert!(app.backend.calls().is_empty());
}
