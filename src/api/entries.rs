use crate::api::context::Tenant;
use crate::api::handlers::{done, ok, ApiResponse, MessageResponse};
use crate::api::{query_date, required, ApiJson, ApiQuery, AppState};
use crate::error::{FieldError, LedgerResult, ValidationErrors};
use crate::models::{MilkEntry, RecordEntryInput, UpdateEntryInput};
use crate::service::validation::codes;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

/// Either `date`, or `customer_id` with an optional `start`/`end` pair
#[derive(Debug, Default, Deserialize)]
pub struct ListEntriesParams {
    pub date: Option<String>,
    pub customer_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub customer_id: Option<String>,
}

fn customer_param(raw: &str) -> Result<Uuid, ValidationErrors> {
    Uuid::parse_str(raw).map_err(|_| {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new(
            "customer_id",
            codes::INVALID_TYPE,
            "customer_id must be a UUID",
        ));
        errors
    })
}

fn optional_range(
    start: &Option<String>,
    end: &Option<String>,
) -> Result<Option<(NaiveDate, NaiveDate)>, ValidationErrors> {
    match (start, end) {
        (None, None) => Ok(None),
        _ => {
            let start = query_date("start_date", required("start_date", start)?)?;
            let end = query_date("end_date", required("end_date", end)?)?;
            Ok(Some((start, end)))
        }
    }
}

/// POST /api/entries
pub async fn record_entry(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiJson(input): ApiJson<RecordEntryInput>,
) -> LedgerResult<Json<ApiResponse<MilkEntry>>> {
    Ok(ok(state.entries.record_entry(dairy_id, &input).await?))
}

/// GET /api/entries?date= | ?customer_id=&start=&end=
///
/// A day listing carries `customer_name` on each entry.
pub async fn list_entries(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiQuery(params): ApiQuery<ListEntriesParams>,
) -> LedgerResult<Response> {
    match (&params.date, &params.customer_id) {
        (Some(date), _) => {
            let date = query_date("date", date)?;
            let entries = state.entries.list_by_date(dairy_id, date).await?;
            Ok(ok(entries).into_response())
        }
        (None, Some(customer)) => {
            let customer_id = customer_param(customer)?;
            let range = optional_range(&params.start, &params.end)?;
            let entries = state
                .entries
                .list_by_customer(dairy_id, customer_id, range)
                .await?;
            Ok(ok(entries).into_response())
        }
        (None, None) => {
            let mut errors = ValidationErrors::default();
            errors.push(FieldError::new(
                "date",
                codes::REQUIRED,
                "Either date or customer_id is required",
            ));
            Err(errors.into())
        }
    }
}

/// GET /api/entries/:id
pub async fn get_entry(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    Path(id): Path<Uuid>,
) -> LedgerResult<Json<ApiResponse<MilkEntry>>> {
    Ok(ok(state.entries.get_entry(dairy_id, id).await?))
}

/// PATCH /api/entries/:id
pub async fn update_entry(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<UpdateEntryInput>,
) -> LedgerResult<Json<ApiResponse<MilkEntry>>> {
    Ok(ok(state.entries.update_entry(dairy_id, id, &input).await?))
}

/// DELETE /api/entries/:id
pub async fn delete_entry(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    Path(id): Path<Uuid>,
) -> LedgerResult<Json<MessageResponse>> {
    state.entries.delete_entry(dairy_id, id).await?;
    Ok(done("Entry deleted"))
}

/// GET /api/entries/export?start=&end=[&customer_id=] as text/csv
pub async fn export_entries(
    State(state): State<AppState>,
    Tenant(dairy_id): Tenant,
    ApiQuery(params): ApiQuery<ExportParams>,
) -> LedgerResult<impl IntoResponse> {
    let start = query_date("start_date", required("start_date", &params.start)?)?;
    let end = query_date("end_date", required("end_date", &params.end)?)?;
    let customer_id = match params.customer_id.as_deref() {
        Some(raw) => Some(customer_param(raw)?),
        None => None,
    };

    let csv = state
        .entries
        .export_csv(dairy_id, start, end, customer_id)
        .await?;
    let disposition = format!("attachment; filename=\"entries_{}_{}.csv\"", start, end);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
