use crate::api::context::Tenant;
use crate::api::handlers::{done, ok, ApiResponse, MessageResponse};
use crate::api::{ApiJson, ApiQuery, AppState};
use crate::error::LedgerResult;
use crate::models::{Customer, CustomerFilter, NewCustomer, UpdateCustomer};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiJson(input): ApiJson<NewCustomer>,
) -> LedgerResult<Json<ApiResponse<Customer>>> {
    Ok(ok(state.customers.create(dairy_id, &input).await?))
}

/// GET /api/customers?search=&limit=&offset=
pub async fn list_customers(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiQuery(filter): ApiQuery<CustomerFilter>,
) -> LedgerResult<Json<ApiResponse<Vec<Customer>>>> {
    Ok(ok(state.customers.list(dairy_id, &filter).await?))
}

/// GET /api/customers/search?q=
pub async fn search_customers(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> LedgerResult<Json<ApiResponse<Vec<Customer>>>> {
    Ok(ok(state.customers.search(dairy_id, &params.q).await?))
}

/// GET /api/customers/:id
pub async fn get_customer(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    Path(id): Path<Uuid>,
) -> LedgerResult<Json<ApiResponse<Customer>>> {
    Ok(ok(state.customers.get(dairy_id, id).await?))
}

/// PATCH /api/customers/:id
pub async fn update_customer(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    Path(id): Path<Uuid>,
    ApiJson(changes): ApiJson<UpdateCustomer>,
) -> LedgerResult<Json<ApiResponse<Customer>>> {
    Ok(ok(state.customers.update(dairy_id, id, &changes).await?))
}

/// DELETE /api/customers/:id
pub async fn delete_customer(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    Path(id): Path<Uuid>,
) -> LedgerResult<Json<MessageResponse>> {
    state.customers.delete(dairy_id, id).await?;
    Ok(done("Customer deleted"))
}
