#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use dairy_ledger::{api, AppConfig, MemoryStore};

/// Full router over a fresh in-memory store.
pub fn build_test_app() -> Router {
    let store = Arc::new(MemoryStore::default());
    api::router(api::AppState::new(store, AppConfig::default()))
}

/// Send one request. `dairy` and `customer` become the identity headers.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    dairy: Option<Uuid>,
    customer: Option<Uuid>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(dairy) = dairy {
        builder = builder.header("x-dairy-id", dairy.to_string());
    }
    if let Some(customer) = customer {
        builder = builder.header("x-customer-id", customer.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Send `body` verbatim as `application/json`.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    dairy: Option<Uuid>,
    body: &str,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(dairy) = dairy {
        builder = builder.header("x-dairy-id", dairy.to_string());
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Request that must succeed; returns the `data` member.
pub async fn expect_data(
    app: &Router,
    method: Method,
    uri: &str,
    dairy: Option<Uuid>,
    body: Option<Value>,
) -> Value {
    let response = send(app, method, uri, dairy, None, body).await;
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {json}");
    assert_eq!(json["success"], true);
    json["data"].clone()
}

/// Register an owner and return the new dairy id.
pub async fn create_dairy(app: &Router) -> Uuid {
    let profile = expect_data(
        app,
        Method::POST,
        "/api/accounts/owners",
        None,
        Some(json!({ "user_id": Uuid::new_v4(), "dairy_name": "Gokul Dairy" })),
    )
    .await;
    uuid_of(&profile["dairy_id"])
}

pub async fn create_customer(app: &Router, dairy: Uuid, name: &str) -> Uuid {
    let customer = expect_data(
        app,
        Method::POST,
        "/api/customers",
        Some(dairy),
        Some(json!({ "name": name })),
    )
    .await;
    uuid_of(&customer["id"])
}

pub async fn set_rate(app: &Router, dairy: Uuid, fat: &str, snf: &str, price: &str) {
    expect_data(
        app,
        Method::PUT,
        "/api/rates",
        Some(dairy),
        Some(json!({ "fat": fat, "snf": snf, "rate_per_liter": price })),
    )
    .await;
}

pub fn uuid_of(value: &Value) -> Uuid {
    Uuid::parse_str(value.as_str().unwrap()).unwrap()
}

/// Decimal JSON value (string or number) compared numerically.
pub fn decimal(value: &Value) -> bigdecimal::BigDecimal {
    use std::str::FromStr;
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    bigdecimal::BigDecimal::from_str(&raw).unwrap()
}

pub fn dec(s: &str) -> bigdecimal::BigDecimal {
    use std::str::FromStr;
    bigdecimal::BigDecimal::from_str(s).unwrap()
}
