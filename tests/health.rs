//! Health check and request identity handling.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, send};
use uuid::Uuid;

#[tokio::test]
async fn health_check_reports_store_state() {
    let app = build_test_app();
    let response = send(&app, Method::GET, "/health", None, None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store_healthy"], true);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app();
    let response = send(&app, Method::GET, "/nope", None, None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_tenant_header_is_rejected() {
    let app = build_test_app();
    let response = send(&app, Method::GET, "/api/rates", None, None, None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn portal_requires_customer_header() {
    let app = build_test_app();
    let response = send(
        &app,
        Method::GET,
        "/api/portal/entries",
        Some(Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
