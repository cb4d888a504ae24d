use crate::api::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Success body: `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// Body for operations with nothing to return
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub fn done(message: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        success: true,
        message: message.into(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store_healthy: bool,
}

/// Health check
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_healthy = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            false
        }
    };
    let status = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            status: if store_healthy { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            store_healthy,
        }),
    )
}
