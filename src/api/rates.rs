use crate::api::context::Tenant;
use crate::api::handlers::{done, ok, ApiResponse, MessageResponse};
use crate::api::{required, ApiJson, ApiQuery, AppState};
use crate::error::{FieldError, LedgerError, LedgerResult, ValidationErrors};
use crate::models::{Rate, ResolvedRate, SetRate};
use crate::service::validation::{self, codes};
use axum::{
    extract::{Path, State},
    Json,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub fat: Option<String>,
    pub snf: Option<String>,
}

fn decimal_param(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &Option<String>,
) -> Option<BigDecimal> {
    let value = match required(field, raw) {
        Ok(v) => v,
        Err(e) => {
            errors.0.extend(e.0);
            return None;
        }
    };
    match BigDecimal::from_str(value) {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push(FieldError::new(
                field,
                codes::INVALID_TYPE,
                format!("{} must be a number", field),
            ));
            None
        }
    }
}

/// GET /api/rates
pub async fn list_rates(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
) -> LedgerResult<Json<ApiResponse<Vec<Rate>>>> {
    Ok(ok(state.rates.list_rates(dairy_id).await?))
}

/// PUT /api/rates
pub async fn set_rate(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiJson(input): ApiJson<SetRate>,
) -> LedgerResult<Json<ApiResponse<Rate>>> {
    Ok(ok(state.rates.set_rate(dairy_id, &input).await?))
}

/// DELETE /api/rates/:id
pub async fn delete_rate(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    Path(id): Path<Uuid>,
) -> LedgerResult<Json<MessageResponse>> {
    state.rates.delete_rate(dairy_id, id).await?;
    Ok(done("Rate deleted"))
}

/// GET /api/rates/resolve?fat=&snf=
pub async fn resolve_rate(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiQuery(params): ApiQuery<ResolveParams>,
) -> LedgerResult<Json<ApiResponse<ResolvedRate>>> {
    let mut errors = ValidationErrors::default();
    let fat = decimal_param(&mut errors, "fat", &params.fat);
    let snf = decimal_param(&mut errors, "snf", &params.snf);
    let (Some(fat), Some(snf)) = (fat, snf) else {
        return Err(errors.into());
    };
    validation::validate_components(&fat, &snf)?;

    let resolved = state
        .rates
        .resolve(dairy_id, &fat, &snf)
        .await?
        .ok_or(LedgerError::NoRateConfigured { fat, snf })?;
    Ok(ok(resolved))
}
