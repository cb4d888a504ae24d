use crate::api::context::Tenant;
use crate::api::handlers::{ok, ApiResponse};
use crate::api::{ApiJson, AppState};
use crate::error::LedgerResult;
use crate::models::UserProfile;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterOwnerRequest {
    pub user_id: Uuid,
    pub dairy_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerLoginRequest {
    pub user_id: Uuid,
    pub customer_id: Uuid,
}

/// POST /api/accounts/owners
pub async fn register_owner(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterOwnerRequest>,
) -> LedgerResult<Json<ApiResponse<UserProfile>>> {
    Ok(ok(state
        .accounts
        .register_owner(req.user_id, &req.dairy_name)
        .await?))
}

/// PUT /api/accounts/customers
pub async fn register_customer_login(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiJson(req): ApiJson<CustomerLoginRequest>,
) -> LedgerResult<Json<ApiResponse<UserProfile>>> {
    Ok(ok(state
        .accounts
        .register_customer_login(dairy_id, req.user_id, req.customer_id)
        .await?))
}

/// GET /api/accounts/:user_id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> LedgerResult<Json<ApiResponse<UserProfile>>> {
    Ok(ok(state.accounts.profile(user_id).await?))
}
